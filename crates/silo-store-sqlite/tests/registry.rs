// silo-store-sqlite/tests/registry.rs
// ============================================================================
// Module: Tenant Registry Tests
// Description: Validate SQLite tenant registry behavior.
// Purpose: Ensure durable registration, lookups, and reserved-name policy.
// Dependencies: silo-store-sqlite, silo-core, tempfile
// ============================================================================

//! ## Overview
//! Conformance tests for the SQLite-backed tenant registry: id assignment,
//! eager store creation, reserved and duplicate name rejection, and
//! idempotent bootstrap against existing data.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use silo_core::RegistryError;
use silo_core::TenantId;
use silo_core::TenantName;
use silo_core::TenantRegistry;
use silo_store_sqlite::SqliteTenantRegistry;
use silo_store_sqlite::StoreConfig;
use silo_store_sqlite::StoreLocator;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn locator_for(dir: &TempDir) -> StoreLocator {
    StoreLocator::new(StoreConfig {
        data_dir: dir.path().join("data"),
        ..StoreConfig::default()
    })
}

fn name(raw: &str) -> TenantName {
    TenantName::new(raw).expect("valid tenant name")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn create_assigns_id_and_creates_store_file() {
    let dir = TempDir::new().expect("tempdir");
    let locator = locator_for(&dir);
    let registry = SqliteTenantRegistry::open(locator.clone()).expect("registry");
    let record = registry.create(&name("invoices")).expect("create");
    assert_eq!(record.name.as_str(), "invoices");
    assert!(locator.store_path(&record.name).exists());
    let fetched = registry.get_by_id(record.id).expect("get_by_id");
    assert_eq!(fetched, record);
}

#[test]
fn create_reserved_name_fails_without_side_effect() {
    let dir = TempDir::new().expect("tempdir");
    let locator = locator_for(&dir);
    let registry = SqliteTenantRegistry::open(locator.clone()).expect("registry");
    let result = registry.create(&name("main"));
    assert!(matches!(result, Err(RegistryError::ReservedName(_))));
    assert!(registry.get_all().expect("get_all").is_empty());
}

#[test]
fn create_rejects_duplicate_names() {
    let dir = TempDir::new().expect("tempdir");
    let registry = SqliteTenantRegistry::open(locator_for(&dir)).expect("registry");
    registry.create(&name("twice")).expect("first create");
    let result = registry.create(&name("twice"));
    assert!(matches!(result, Err(RegistryError::DuplicateName(_))));
    assert_eq!(registry.get_all().expect("get_all").len(), 1);
}

#[test]
fn get_by_id_unknown_is_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let registry = SqliteTenantRegistry::open(locator_for(&dir)).expect("registry");
    let id = TenantId::from_raw(99).expect("valid id");
    let result = registry.get_by_id(id);
    assert!(matches!(result, Err(RegistryError::NotFound(99))));
}

#[test]
fn get_all_on_empty_registry_returns_empty() {
    let dir = TempDir::new().expect("tempdir");
    let registry = SqliteTenantRegistry::open(locator_for(&dir)).expect("registry");
    assert!(registry.get_all().expect("get_all").is_empty());
}

#[test]
fn get_all_returns_insertion_order() {
    let dir = TempDir::new().expect("tempdir");
    let registry = SqliteTenantRegistry::open(locator_for(&dir)).expect("registry");
    let first = registry.create(&name("alpha")).expect("create alpha");
    let second = registry.create(&name("beta")).expect("create beta");
    let all = registry.get_all().expect("get_all");
    assert_eq!(all, vec![first.clone(), second]);
    assert!(all[0].id < all[1].id);
    assert_eq!(first.id.get(), all[0].id.get());
}

#[test]
fn reopen_preserves_existing_records() {
    let dir = TempDir::new().expect("tempdir");
    let locator = locator_for(&dir);
    let created = {
        let registry = SqliteTenantRegistry::open(locator.clone()).expect("first boot");
        registry.create(&name("durable")).expect("create")
    };
    let registry = SqliteTenantRegistry::open(locator).expect("second boot");
    let all = registry.get_all().expect("get_all");
    assert_eq!(all, vec![created]);
}
