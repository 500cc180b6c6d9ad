// silo-store-sqlite/src/decode.rs
// ============================================================================
// Module: Generic Row Decoder
// Description: Shape unknown result cursors into JSON-friendly rows.
// Purpose: Decode heterogeneous columns without a priori schema knowledge.
// Dependencies: silo-core, rusqlite
// ============================================================================

//! ## Overview
//! Caller-supplied statements produce result sets of unknown shape. The
//! decoder captures the column name list once from statement metadata, then
//! reads each row into a fresh name-to-value mapping. Nulls decode to an
//! explicit null value, zero rows decode to an empty set, and any failure
//! partway through the scan discards the partial result and reports an
//! error instead of a short list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Rows;
use rusqlite::types::ValueRef;
use silo_core::EngineError;
use silo_core::ResultRow;
use silo_core::ResultSet;
use silo_core::SqlValue;

// ============================================================================
// SECTION: Decoder
// ============================================================================

/// Drains a cursor into a [`ResultSet`] under the given column list.
///
/// The cursor is fully exhausted before returning; on error the rows read so
/// far are discarded.
///
/// # Errors
///
/// Returns [`EngineError::Execute`] when stepping the cursor fails and
/// [`EngineError::Decode`] when a column value cannot be represented.
pub fn decode_rows(columns: Vec<String>, rows: &mut Rows<'_>) -> Result<ResultSet, EngineError> {
    let mut decoded = Vec::new();
    loop {
        let row = match rows.next() {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(err) => return Err(EngineError::Execute(err.to_string())),
        };
        let mut mapping = ResultRow::new();
        for (index, column) in columns.iter().enumerate() {
            let value = row.get_ref(index).map_err(|err| EngineError::Decode(err.to_string()))?;
            mapping.insert(column.clone(), decode_value(value)?);
        }
        decoded.push(mapping);
    }
    Ok(ResultSet {
        columns,
        rows: decoded,
    })
}

/// Converts one `SQLite` column value into a [`SqlValue`].
fn decode_value(value: ValueRef<'_>) -> Result<SqlValue, EngineError> {
    match value {
        ValueRef::Null => Ok(SqlValue::Null),
        ValueRef::Integer(value) => Ok(SqlValue::Integer(value)),
        ValueRef::Real(value) => Ok(SqlValue::Real(value)),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|err| EngineError::Decode(format!("text column is not utf-8: {err}")))?;
            Ok(SqlValue::Text(text.to_string()))
        }
        ValueRef::Blob(bytes) => Ok(SqlValue::Blob(bytes.to_vec())),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
