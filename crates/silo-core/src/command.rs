// silo-core/src/command.rs
// ============================================================================
// Module: SQL Command and Result Shapes
// Description: JSON-friendly SQL scalar values, commands, and result sets.
// Purpose: Carry caller-supplied SQL across the HTTP/engine boundary.
// Dependencies: base64, serde
// ============================================================================

//! ## Overview
//! Callers submit arbitrary SQL text plus positional scalar parameters; the
//! engine answers with either a schema-less row set or a mutation summary.
//! [`SqlValue`] is the single scalar type crossing that boundary in both
//! directions. Its JSON representation is untagged: `null`, booleans,
//! integers, floats, and strings map directly, and blob results serialize as
//! base64 text. Blob parameters are not expressible in JSON input; a base64
//! string arrives as [`SqlValue::Text`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Scalar Values
// ============================================================================

/// One scalar value crossing the JSON/SQL boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// Boolean parameter (bound as a SQLite integer).
    Boolean(bool),
    /// 64-bit integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Binary blob; serialized as base64 text.
    Blob(#[serde(with = "blob_base64")] Vec<u8>),
}

/// Base64 (de)serialization for blob payloads.
mod blob_base64 {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    /// Serializes blob bytes as a base64 string.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    /// Deserializes blob bytes from a base64 string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Caller-supplied SQL statement with positional parameters.
///
/// Parameter count and order must match the placeholders in `sql`; no
/// statement semantics are validated before execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlCommand {
    /// Statement text, passed to the engine verbatim.
    pub sql: String,
    /// Positional scalar parameters.
    #[serde(default)]
    pub params: Vec<SqlValue>,
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// One decoded row: column name to scalar value.
///
/// The mapping representation does not preserve column order or duplicate
/// names; [`ResultSet::columns`] carries the statement's column list.
pub type ResultRow = BTreeMap<String, SqlValue>;

/// Decoded, schema-less representation of a query's returned rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column names in statement order; duplicates possible.
    pub columns: Vec<String>,
    /// Decoded rows in cursor order.
    pub rows: Vec<ResultRow>,
}

/// Summary of a non-row-returning execution, reported verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// Rows affected by the statement.
    pub rows_affected: u64,
    /// Last insert rowid observed on the connection after execution.
    pub last_insert_id: i64,
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
        reason = "Test-only assertions."
    )]

    use super::SqlCommand;
    use super::SqlValue;

    #[test]
    fn scalar_values_deserialize_untagged() {
        let values: Vec<SqlValue> =
            serde_json::from_str(r#"[null, true, 42, 1.5, "abc"]"#).expect("scalar array");
        assert_eq!(
            values,
            vec![
                SqlValue::Null,
                SqlValue::Boolean(true),
                SqlValue::Integer(42),
                SqlValue::Real(1.5),
                SqlValue::Text("abc".to_string()),
            ]
        );
    }

    #[test]
    fn blob_serializes_as_base64_text() {
        let json = serde_json::to_string(&SqlValue::Blob(vec![1, 2, 3])).expect("blob json");
        assert_eq!(json, "\"AQID\"");
    }

    #[test]
    fn command_params_default_to_empty() {
        let command: SqlCommand =
            serde_json::from_str(r#"{"sql": "SELECT 1"}"#).expect("command without params");
        assert_eq!(command.sql, "SELECT 1");
        assert!(command.params.is_empty());
    }
}
