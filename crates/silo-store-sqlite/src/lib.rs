// silo-store-sqlite/src/lib.rs
// ============================================================================
// Module: Silo SQLite Store
// Description: SQLite-backed tenant registry and dynamic SQL engine.
// Purpose: Map tenant ids to physical stores and execute caller SQL safely.
// Dependencies: silo-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate implements the storage side of Silo over `SQLite`: the store
//! locator resolving a tenant name to a fresh file-backed connection, the
//! durable tenant registry living in the reserved `main` store, the execution
//! engine running caller-supplied SQL against any registered tenant, and the
//! generic row decoder shaping unknown result sets into JSON-friendly rows.
//! Every engine call opens its own handle and releases it before returning;
//! only the registry's connection lives for the process lifetime.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod decode;
pub mod engine;
pub mod locator;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use decode::decode_rows;
pub use engine::ExecutionEngine;
pub use locator::OpenError;
pub use locator::SqliteJournalMode;
pub use locator::SqliteSyncMode;
pub use locator::StoreConfig;
pub use locator::StoreLocator;
pub use registry::SqliteTenantRegistry;
