// silo-http/src/server.rs
// ============================================================================
// Module: HTTP Server
// Description: REST endpoints over the tenant registry and SQL engine.
// Purpose: Map /database routes onto injected core components.
// Dependencies: silo-core, silo-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! The server wires the registry and execution engine (constructed once at
//! startup and injected through shared state) onto the REST surface:
//! create/list/get databases plus per-database query and mutation endpoints.
//! Every domain failure renders as `400` with a JSON error message; the
//! not-found case keeps its specific message so callers can distinguish it.
//! `SQLite` work is blocking, so handlers shift onto a blocking context
//! before touching the engine.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use silo_core::EngineError;
use silo_core::MutationOutcome;
use silo_core::RegistryError;
use silo_core::ResultSet;
use silo_core::SharedTenantRegistry;
use silo_core::SqlCommand;
use silo_core::TenantId;
use silo_core::TenantName;
use silo_core::TenantRecord;
use silo_core::TenantRegistry;
use silo_store_sqlite::ExecutionEngine;
use silo_store_sqlite::SqliteTenantRegistry;
use silo_store_sqlite::StoreLocator;

use crate::config::SiloConfig;
use crate::demo::demo_page;

// ============================================================================
// SECTION: Server
// ============================================================================

/// Silo HTTP server instance.
pub struct SiloServer {
    /// Server configuration.
    config: SiloConfig,
    /// Shared handler state.
    state: Arc<ServerState>,
}

impl SiloServer {
    /// Builds a server from configuration, bootstrapping the registry.
    ///
    /// This performs blocking store I/O; callers on an async runtime should
    /// shift it onto a blocking task.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid or the registry
    /// store cannot be opened.
    pub fn from_config(config: SiloConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let locator = StoreLocator::new(config.store.clone());
        let registry = SqliteTenantRegistry::open(locator.clone())
            .map_err(|err| ServerError::Init(err.to_string()))?;
        let registry = SharedTenantRegistry::from_registry(registry);
        let engine = ExecutionEngine::new(registry.clone(), locator);
        Ok(Self {
            config,
            state: Arc::new(ServerState {
                registry,
                engine,
            }),
        })
    }

    /// Returns the configured router, primarily for in-process testing.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.state), self.config.server.max_body_bytes)
    }

    /// Serves requests until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr = self.config.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let app = build_router(Arc::clone(&self.state), self.config.server.max_body_bytes);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|_| ServerError::Transport("http bind failed".to_string()))?;
        axum::serve(listener, app)
            .await
            .map_err(|_| ServerError::Transport("http server failed".to_string()))
    }
}

/// Shared state injected into every handler.
struct ServerState {
    /// Tenant registry, shared for the process lifetime.
    registry: SharedTenantRegistry,
    /// Execution engine over the same registry and locator.
    engine: ExecutionEngine<SharedTenantRegistry>,
}

/// Builds the REST router over shared state.
fn build_router(state: Arc<ServerState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(demo_page))
        .route("/database", post(create_database).get(list_databases))
        .route("/database/{id}", get(get_database))
        .route("/database/{id}/query", post(run_query))
        .route("/database/{id}/mutation", post(run_mutation))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

// ============================================================================
// SECTION: Request/Response Shapes
// ============================================================================

/// Request body for database creation.
#[derive(Debug, Deserialize)]
struct CreateDatabaseRequest {
    /// Requested database name.
    name: String,
}

/// Uniform JSON error body.
#[derive(Debug, Serialize, Deserialize)]
struct ErrorBody {
    /// Human-readable failure message.
    error: String,
}

/// Client-facing failure: status plus a readable message.
#[derive(Debug)]
struct ApiError {
    /// HTTP status for the failure.
    status: StatusCode,
    /// Human-readable failure message.
    message: String,
}

impl ApiError {
    /// Builds a 400 failure from any displayable error.
    fn bad_request(error: &impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: error.to_string(),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(error: RegistryError) -> Self {
        Self::bad_request(&error)
    }
}

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        Self::bad_request(&error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Creates a new database and returns its record.
async fn create_database(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<CreateDatabaseRequest>,
) -> Result<(StatusCode, Json<TenantRecord>), ApiError> {
    let name = TenantName::new(request.name).map_err(RegistryError::from)?;
    let record = run_blocking(|| state.registry.create(&name))?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Lists all known databases in insertion order.
async fn list_databases(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<TenantRecord>>, ApiError> {
    let records = run_blocking(|| state.registry.get_all())?;
    Ok(Json(records))
}

/// Returns one database record by id.
async fn get_database(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<i64>,
) -> Result<Json<TenantRecord>, ApiError> {
    let id = parse_id(id)?;
    let record = run_blocking(|| state.registry.get_by_id(id))?;
    Ok(Json(record))
}

/// Executes a row-returning statement against one database.
async fn run_query(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<i64>,
    Json(command): Json<SqlCommand>,
) -> Result<Json<ResultSet>, ApiError> {
    let id = parse_id(id)?;
    let set = run_blocking(|| state.engine.execute_query(id, &command))?;
    Ok(Json(set))
}

/// Executes a statement for effect against one database.
async fn run_mutation(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<i64>,
    Json(command): Json<SqlCommand>,
) -> Result<Json<MutationOutcome>, ApiError> {
    let id = parse_id(id)?;
    let outcome = run_blocking(|| state.engine.execute_mutation(id, &command))?;
    Ok(Json(outcome))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a raw path id, folding out-of-domain values into not-found.
fn parse_id(raw: i64) -> Result<TenantId, ApiError> {
    TenantId::from_raw(raw).ok_or_else(|| ApiError::from(RegistryError::NotFound(raw)))
}

/// Runs blocking store work, shifting contexts when on a multi-thread runtime.
fn run_blocking<T>(task: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(task)
        }
        _ => task(),
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// HTTP server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only handler assertions."
    )]

    use std::sync::Arc;

    use axum::Json;
    use axum::extract::Path;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use silo_core::SqlCommand;
    use silo_core::SqlValue;
    use tempfile::TempDir;

    use super::ApiError;
    use super::CreateDatabaseRequest;
    use super::ErrorBody;
    use super::ServerState;
    use super::SiloServer;
    use super::create_database;
    use super::get_database;
    use super::list_databases;
    use super::run_mutation;
    use super::run_query;
    use crate::config::SiloConfig;

    fn state_in(dir: &TempDir) -> Arc<ServerState> {
        let config = SiloConfig {
            store: silo_store_sqlite::StoreConfig {
                data_dir: dir.path().join("data"),
                ..silo_store_sqlite::StoreConfig::default()
            },
            ..SiloConfig::default()
        };
        let server = SiloServer::from_config(config).expect("server");
        Arc::clone(&server.state)
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("parse body")
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let dir = TempDir::new().expect("tempdir");
        let state = state_in(&dir);
        let (status, Json(record)) = create_database(
            State(Arc::clone(&state)),
            Json(CreateDatabaseRequest {
                name: "ledger".to_string(),
            }),
        )
        .await
        .expect("create");
        assert_eq!(status, StatusCode::CREATED);
        let Json(fetched) = get_database(State(Arc::clone(&state)), Path(record.id.get()))
            .await
            .expect("get");
        assert_eq!(fetched, record);
    }

    #[tokio::test]
    async fn create_reserved_name_is_bad_request() {
        let dir = TempDir::new().expect("tempdir");
        let state = state_in(&dir);
        let result = create_database(
            State(state),
            Json(CreateDatabaseRequest {
                name: "main".to_string(),
            }),
        )
        .await;
        let error = result.err().expect("reserved name rejected");
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert!(error.message.contains("reserved"));
    }

    #[tokio::test]
    async fn create_invalid_name_is_bad_request() {
        let dir = TempDir::new().expect("tempdir");
        let state = state_in(&dir);
        let result = create_database(
            State(state),
            Json(CreateDatabaseRequest {
                name: "../escape".to_string(),
            }),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn list_starts_empty() {
        let dir = TempDir::new().expect("tempdir");
        let state = state_in(&dir);
        let Json(records) = list_databases(State(state)).await.expect("list");
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn unknown_id_maps_to_specific_message() {
        let dir = TempDir::new().expect("tempdir");
        let state = state_in(&dir);
        let error = get_database(State(state), Path(12)).await.err().expect("unknown id");
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert!(error.message.contains("no database with id 12"));
    }

    #[tokio::test]
    async fn nonpositive_id_maps_to_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let state = state_in(&dir);
        let error = get_database(State(state), Path(0)).await.err().expect("invalid id");
        assert!(error.message.contains("no database with id 0"));
    }

    #[tokio::test]
    async fn query_and_mutation_flow_through_engine() {
        let dir = TempDir::new().expect("tempdir");
        let state = state_in(&dir);
        let (_, Json(record)) = create_database(
            State(Arc::clone(&state)),
            Json(CreateDatabaseRequest {
                name: "metrics".to_string(),
            }),
        )
        .await
        .expect("create");
        let raw = record.id.get();
        let _ = run_mutation(
            State(Arc::clone(&state)),
            Path(raw),
            Json(SqlCommand {
                sql: "CREATE TABLE points (v INTEGER)".to_string(),
                params: Vec::new(),
            }),
        )
        .await
        .expect("create table");
        let Json(outcome) = run_mutation(
            State(Arc::clone(&state)),
            Path(raw),
            Json(SqlCommand {
                sql: "INSERT INTO points VALUES (?1)".to_string(),
                params: vec![SqlValue::Integer(7)],
            }),
        )
        .await
        .expect("insert");
        assert_eq!(outcome.rows_affected, 1);
        let Json(set) = run_query(
            State(state),
            Path(raw),
            Json(SqlCommand {
                sql: "SELECT v FROM points".to_string(),
                params: Vec::new(),
            }),
        )
        .await
        .expect("select");
        assert_eq!(set.rows[0].get("v"), Some(&SqlValue::Integer(7)));
    }

    #[tokio::test]
    async fn api_error_renders_json_error_body() {
        let error = ApiError {
            status: StatusCode::BAD_REQUEST,
            message: "boom".to_string(),
        };
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = body_json(response).await;
        assert_eq!(body.error, "boom");
    }
}
