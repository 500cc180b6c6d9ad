// silo-store-sqlite/src/locator.rs
// ============================================================================
// Module: Store Locator
// Description: Resolve tenant names to physical SQLite stores.
// Purpose: Open (and create on demand) one file-backed store per tenant.
// Dependencies: silo-core, rusqlite, serde
// ============================================================================

//! ## Overview
//! The locator derives a tenant's physical location deterministically from
//! its validated name: `<data_dir>/<name>.db`. Every call opens a fresh
//! connection with the configured pragmas applied; there is no pooling or
//! reuse across calls. Opening may create the data directory and the backing
//! file as a side effect. Concurrent opens of the same store are tolerated;
//! `SQLite` serializes conflicting writers at the file level.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use serde::Deserialize;
use serde::Serialize;
use silo_core::TenantName;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File extension for tenant store files.
const STORE_FILE_EXTENSION: &str = "db";
/// Default data directory for tenant stores.
const DEFAULT_DATA_DIR: &str = "data";
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the tenant store layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one `<name>.db` file per tenant.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default data directory.
fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Store open errors.
#[derive(Debug, Error)]
pub enum OpenError {
    /// Data directory could not be created.
    #[error("store io error: {0}")]
    Io(String),
    /// `SQLite` engine rejected the open or a pragma.
    #[error("store db error: {0}")]
    Db(String),
}

// ============================================================================
// SECTION: Locator
// ============================================================================

/// Resolves tenant names to freshly opened `SQLite` connections.
#[derive(Debug, Clone)]
pub struct StoreLocator {
    /// Store layout configuration.
    config: StoreConfig,
}

impl StoreLocator {
    /// Creates a locator over the configured data directory.
    #[must_use]
    pub const fn new(config: StoreConfig) -> Self {
        Self {
            config,
        }
    }

    /// Returns the physical path backing a tenant's store.
    #[must_use]
    pub fn store_path(&self, name: &TenantName) -> PathBuf {
        let mut path = self.config.data_dir.join(name.as_str());
        path.set_extension(STORE_FILE_EXTENSION);
        path
    }

    /// Opens a fresh handle to a tenant's store, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`OpenError`] when the data directory cannot be created or
    /// the `SQLite` open/pragma setup fails.
    pub fn open(&self, name: &TenantName) -> Result<Connection, OpenError> {
        std::fs::create_dir_all(&self.config.data_dir)
            .map_err(|err| OpenError::Io(err.to_string()))?;
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let connection = Connection::open_with_flags(self.store_path(name), flags)
            .map_err(|err| OpenError::Db(err.to_string()))?;
        self.apply_pragmas(&connection)?;
        Ok(connection)
    }

    /// Applies configured `SQLite` pragmas to a fresh connection.
    fn apply_pragmas(&self, connection: &Connection) -> Result<(), OpenError> {
        connection
            .execute_batch(&format!(
                "PRAGMA journal_mode = {};",
                self.config.journal_mode.pragma_value()
            ))
            .map_err(|err| OpenError::Db(err.to_string()))?;
        connection
            .execute_batch(&format!(
                "PRAGMA synchronous = {};",
                self.config.sync_mode.pragma_value()
            ))
            .map_err(|err| OpenError::Db(err.to_string()))?;
        connection
            .busy_timeout(Duration::from_millis(self.config.busy_timeout_ms))
            .map_err(|err| OpenError::Db(err.to_string()))?;
        Ok(())
    }
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

    use silo_core::TenantName;
    use tempfile::TempDir;

    use super::SqliteJournalMode;
    use super::StoreConfig;
    use super::StoreLocator;

    fn locator_in(dir: &TempDir) -> StoreLocator {
        StoreLocator::new(StoreConfig {
            data_dir: dir.path().join("stores"),
            ..StoreConfig::default()
        })
    }

    #[test]
    fn store_path_is_name_plus_extension() {
        let dir = TempDir::new().expect("tempdir");
        let locator = locator_in(&dir);
        let name = TenantName::new("orders").expect("valid name");
        assert_eq!(locator.store_path(&name), dir.path().join("stores").join("orders.db"));
    }

    #[test]
    fn open_creates_directory_and_file() {
        let dir = TempDir::new().expect("tempdir");
        let locator = locator_in(&dir);
        let name = TenantName::new("fresh").expect("valid name");
        let connection = locator.open(&name).expect("open");
        drop(connection);
        assert!(locator.store_path(&name).exists());
    }

    #[test]
    fn open_tolerates_independent_handles() {
        let dir = TempDir::new().expect("tempdir");
        let locator = locator_in(&dir);
        let name = TenantName::new("shared").expect("valid name");
        let first = locator.open(&name).expect("first open");
        let second = locator.open(&name).expect("second open");
        first
            .execute_batch("CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (1);")
            .expect("write on first handle");
        let count: i64 = second
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .expect("read on second handle");
        assert_eq!(count, 1);
    }

    #[test]
    fn delete_journal_mode_is_accepted() {
        let dir = TempDir::new().expect("tempdir");
        let locator = StoreLocator::new(StoreConfig {
            data_dir: dir.path().join("stores"),
            journal_mode: SqliteJournalMode::Delete,
            ..StoreConfig::default()
        });
        let name = TenantName::new("legacy").expect("valid name");
        assert!(locator.open(&name).is_ok());
    }
}
