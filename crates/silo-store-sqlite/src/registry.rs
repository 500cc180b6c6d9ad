// silo-store-sqlite/src/registry.rs
// ============================================================================
// Module: SQLite Tenant Registry
// Description: Durable id-to-name directory stored in the reserved store.
// Purpose: Be the source of truth for which tenant databases exist.
// Dependencies: silo-core, rusqlite
// ============================================================================

//! ## Overview
//! The registry is a degenerate case of the store locator: it lives in the
//! store opened under the reserved name `main` and keeps that connection for
//! the process lifetime behind a mutex. Schema creation is idempotent, so a
//! second process start against existing data neither fails nor alters rows.
//! Tenant names are unique by schema; duplicate registration fails closed
//! rather than aliasing two ids onto one physical file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OptionalExtension;
use rusqlite::params;
use silo_core::RegistryError;
use silo_core::TenantId;
use silo_core::TenantName;
use silo_core::TenantRecord;
use silo_core::TenantRegistry;

use crate::locator::StoreLocator;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// `SQLite`-backed tenant registry over the reserved `main` store.
pub struct SqliteTenantRegistry {
    /// Process-lifetime registry connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
    /// Locator used to eagerly create stores for new tenants.
    locator: StoreLocator,
}

impl SqliteTenantRegistry {
    /// Opens the registry store and ensures its schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the reserved store cannot be opened or
    /// the schema cannot be created.
    pub fn open(locator: StoreLocator) -> Result<Self, RegistryError> {
        let connection = locator
            .open(&TenantName::reserved())
            .map_err(|err| RegistryError::Store(err.to_string()))?;
        initialize_schema(&connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            locator,
        })
    }

    /// Locks the shared registry connection.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, RegistryError> {
        self.connection.lock().map_err(|_| RegistryError::Store("mutex poisoned".to_string()))
    }
}

impl TenantRegistry for SqliteTenantRegistry {
    fn create(&self, name: &TenantName) -> Result<TenantRecord, RegistryError> {
        if name.is_reserved() {
            return Err(RegistryError::ReservedName(name.to_string()));
        }
        let assigned = {
            let guard = self.lock()?;
            guard
                .execute("INSERT INTO tenants (id, name) VALUES (NULL, ?1)", params![
                    name.as_str()
                ])
                .map_err(|err| classify_insert_error(name, &err))?;
            guard.last_insert_rowid()
        };
        let id = TenantId::from_raw(assigned)
            .ok_or_else(|| RegistryError::Store(format!("registry assigned invalid id {assigned}")))?;
        let handle = self
            .locator
            .open(name)
            .map_err(|err| RegistryError::Store(err.to_string()))?;
        drop(handle);
        Ok(TenantRecord {
            id,
            name: name.clone(),
        })
    }

    fn get_all(&self) -> Result<Vec<TenantRecord>, RegistryError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare("SELECT id, name FROM tenants ORDER BY id")
            .map_err(|err| RegistryError::Store(err.to_string()))?;
        let scanned = statement
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let name: String = row.get(1)?;
                Ok((id, name))
            })
            .map_err(|err| RegistryError::Store(err.to_string()))?;
        let mut records = Vec::new();
        for entry in scanned {
            let (id, name) = entry.map_err(|err| RegistryError::Store(err.to_string()))?;
            records.push(record_from_row(id, name)?);
        }
        Ok(records)
    }

    fn get_by_id(&self, id: TenantId) -> Result<TenantRecord, RegistryError> {
        let row = {
            let guard = self.lock()?;
            guard
                .query_row(
                    "SELECT id, name FROM tenants WHERE id = ?1",
                    params![id.get()],
                    |row| {
                        let id: i64 = row.get(0)?;
                        let name: String = row.get(1)?;
                        Ok((id, name))
                    },
                )
                .optional()
                .map_err(|err| RegistryError::Store(err.to_string()))?
        };
        let Some((assigned, name)) = row else {
            return Err(RegistryError::NotFound(id.get()));
        };
        record_from_row(assigned, name)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the registry schema exists.
fn initialize_schema(connection: &Connection) -> Result<(), RegistryError> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS tenants (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );",
        )
        .map_err(|err| RegistryError::Store(err.to_string()))
}

/// Rebuilds a validated record from stored registry columns.
///
/// Stored names were validated at registration; a name that no longer
/// validates means the store was tampered with, and the lookup fails closed.
fn record_from_row(id: i64, name: String) -> Result<TenantRecord, RegistryError> {
    let id = TenantId::from_raw(id)
        .ok_or_else(|| RegistryError::Store(format!("registry row has invalid id {id}")))?;
    let name = TenantName::new(name)
        .map_err(|err| RegistryError::Store(format!("registry row has invalid name: {err}")))?;
    Ok(TenantRecord {
        id,
        name,
    })
}

/// Maps an insert failure to the duplicate-name or store error.
fn classify_insert_error(name: &TenantName, error: &rusqlite::Error) -> RegistryError {
    match error {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RegistryError::DuplicateName(name.to_string())
        }
        other => RegistryError::Store(other.to_string()),
    }
}
