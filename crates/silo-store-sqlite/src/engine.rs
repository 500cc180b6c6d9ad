// silo-store-sqlite/src/engine.rs
// ============================================================================
// Module: Execution Engine
// Description: Run caller-supplied SQL against registered tenant stores.
// Purpose: Resolve id, open a scoped handle, bind, execute, shape, release.
// Dependencies: silo-core, rusqlite
// ============================================================================

//! ## Overview
//! The engine is the only path from a tenant id to statement execution. Both
//! operations share one primitive: resolve the id through the registry, open
//! a handle through the locator, prepare and bind the statement, then hand
//! off to a result-shaping step. Queries drain the cursor through the row
//! decoder; mutations drain it and report the connection's change counters.
//! The split is response shaping only; either path accepts arbitrary SQL.
//! An unknown id short-circuits before any tenant store is touched, and the
//! scoped handle is released on every path, error paths included.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;
use rusqlite::Statement;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use silo_core::EngineError;
use silo_core::MutationOutcome;
use silo_core::ResultSet;
use silo_core::SqlCommand;
use silo_core::SqlValue;
use silo_core::TenantId;
use silo_core::TenantRegistry;

use crate::decode::decode_rows;
use crate::locator::StoreLocator;

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Dynamic SQL execution engine over registered tenant stores.
#[derive(Clone)]
pub struct ExecutionEngine<R> {
    /// Registry resolving tenant ids to names.
    registry: R,
    /// Locator opening the resolved tenant's store.
    locator: StoreLocator,
}

impl<R: TenantRegistry> ExecutionEngine<R> {
    /// Creates an engine over an injected registry and locator.
    #[must_use]
    pub const fn new(registry: R, locator: StoreLocator) -> Self {
        Self {
            registry,
            locator,
        }
    }

    /// Executes a row-returning statement and decodes its result set.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for an unknown tenant id,
    /// [`EngineError::Prepare`] when the statement cannot be prepared or its
    /// parameter count mismatches, [`EngineError::Execute`] when execution
    /// fails, and [`EngineError::Decode`] when result shaping fails.
    pub fn execute_query(
        &self,
        id: TenantId,
        command: &SqlCommand,
    ) -> Result<ResultSet, EngineError> {
        self.with_store(id, |connection| {
            let mut statement = prepare(connection, command)?;
            let columns: Vec<String> =
                statement.column_names().iter().map(ToString::to_string).collect();
            let mut rows = statement
                .query(params_from_iter(bind_values(&command.params)))
                .map_err(|err| EngineError::Execute(err.to_string()))?;
            decode_rows(columns, &mut rows)
        })
    }

    /// Executes a statement for effect and reports the mutation summary.
    ///
    /// A row-returning statement sent through this path still executes; its
    /// rows are drained and discarded.
    ///
    /// # Errors
    ///
    /// Returns the same taxonomy as [`Self::execute_query`].
    pub fn execute_mutation(
        &self,
        id: TenantId,
        command: &SqlCommand,
    ) -> Result<MutationOutcome, EngineError> {
        self.with_store(id, |connection| {
            let mut statement = prepare(connection, command)?;
            let mut rows = statement
                .query(params_from_iter(bind_values(&command.params)))
                .map_err(|err| EngineError::Execute(err.to_string()))?;
            while rows
                .next()
                .map_err(|err| EngineError::Execute(err.to_string()))?
                .is_some()
            {}
            drop(rows);
            drop(statement);
            Ok(MutationOutcome {
                rows_affected: connection.changes(),
                last_insert_id: connection.last_insert_rowid(),
            })
        })
    }

    /// Resolves a tenant id and runs `shape` over a scoped store handle.
    ///
    /// The handle never outlives this call; resolution failures short-circuit
    /// before the tenant store is opened.
    fn with_store<T>(
        &self,
        id: TenantId,
        shape: impl FnOnce(&Connection) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let record = self.registry.get_by_id(id)?;
        let connection =
            self.locator.open(&record.name).map_err(|err| EngineError::Open(err.to_string()))?;
        shape(&connection)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Prepares a statement and checks the positional parameter count.
fn prepare<'c>(
    connection: &'c Connection,
    command: &SqlCommand,
) -> Result<Statement<'c>, EngineError> {
    let statement =
        connection.prepare(&command.sql).map_err(|err| EngineError::Prepare(err.to_string()))?;
    let expected = statement.parameter_count();
    let supplied = command.params.len();
    if expected != supplied {
        return Err(EngineError::Prepare(format!(
            "statement expects {expected} parameters, {supplied} supplied"
        )));
    }
    Ok(statement)
}

/// Lowers caller parameters into `SQLite` bind values.
///
/// Parameters are opaque scalars handed to the engine's native bind
/// mechanism; statement text is never inspected.
fn bind_values(params: &[SqlValue]) -> Vec<Value> {
    params
        .iter()
        .map(|param| match param {
            SqlValue::Null => Value::Null,
            SqlValue::Boolean(flag) => Value::Integer(i64::from(*flag)),
            SqlValue::Integer(value) => Value::Integer(*value),
            SqlValue::Real(value) => Value::Real(*value),
            SqlValue::Text(value) => Value::Text(value.clone()),
            SqlValue::Blob(value) => Value::Blob(value.clone()),
        })
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
