// silo-http/src/demo.rs
// ============================================================================
// Module: Demo Console
// Description: Self-contained HTML console for exercising the API.
// Purpose: Let a browser create databases and submit SQL without tooling.
// Dependencies: axum
// ============================================================================

//! ## Overview
//! A single static page served at `/`. It lists known databases into a
//! selector, creates new ones, and submits SQL as a query or mutation,
//! rendering the JSON response inline. The page talks only to the public
//! endpoints; it has no privileged channel.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::response::Html;

// ============================================================================
// SECTION: Page
// ============================================================================

/// Static demo console markup.
const DEMO_PAGE: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Silo Console</title>
<style>
body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }
label { display: block; margin: 0.5rem 0; }
textarea { width: 100%; min-height: 6rem; }
pre { background: #f4f4f4; padding: 1rem; overflow-x: auto; }
</style>
</head>
<body>
<h1>Silo Console</h1>

<form id="create-form">
  <h2>Create database</h2>
  <label>Name <input name="name" required pattern="[A-Za-z0-9_-]+"></label>
  <button>Create</button>
</form>

<form id="sql-form">
  <h2>Run SQL</h2>
  <label>Database <select name="id" id="database-select" required></select></label>
  <label>Kind
    <select name="kind">
      <option value="query">query</option>
      <option value="mutation">mutation</option>
    </select>
  </label>
  <label>SQL <textarea name="sql" required></textarea></label>
  <label>Params (comma separated) <input name="params" placeholder="1,2,3"></label>
  <button>Run</button>
</form>

<pre id="output"></pre>

<script>
const output = document.querySelector("#output");
const select = document.querySelector("#database-select");

function addOption(record) {
  const option = document.createElement("option");
  option.textContent = record.name + " (#" + record.id + ")";
  option.value = record.id;
  select.appendChild(option);
}

async function readError(response) {
  const text = await response.text();
  try { return JSON.parse(text).error; } catch { return text; }
}

document.querySelector("#create-form").addEventListener("submit", async (event) => {
  event.preventDefault();
  const name = new FormData(event.target).get("name");
  const response = await fetch("/database", {
    method: "POST",
    headers: { "content-type": "application/json" },
    body: JSON.stringify({ name }),
  });
  if (!response.ok) {
    output.textContent = await readError(response);
    return;
  }
  const record = await response.json();
  addOption(record);
  output.textContent = JSON.stringify(record, undefined, 2);
});

document.querySelector("#sql-form").addEventListener("submit", async (event) => {
  event.preventDefault();
  const form = new FormData(event.target);
  const raw = form.get("params");
  const params = raw ? raw.split(",").map((item) => {
    const trimmed = item.trim();
    const number = Number(trimmed);
    return Number.isNaN(number) ? trimmed : number;
  }) : [];
  const target = "/database/" + form.get("id") + "/" + form.get("kind");
  const response = await fetch(target, {
    method: "POST",
    headers: { "content-type": "application/json" },
    body: JSON.stringify({ sql: form.get("sql"), params }),
  });
  output.textContent = response.ok
    ? JSON.stringify(await response.json(), undefined, 2)
    : await readError(response);
});

fetch("/database")
  .then((response) => response.ok ? response.json() : Promise.reject(response))
  .then((records) => records.forEach(addOption))
  .catch(async (response) => {
    output.textContent = await readError(response);
  });
</script>
</body>
</html>
"##;

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Serves the demo console.
pub async fn demo_page() -> Html<&'static str> {
    Html(DEMO_PAGE)
}
