// silo-core/src/interfaces.rs
// ============================================================================
// Module: Core Interfaces
// Description: Registry interface and the error taxonomy at the seams.
// Purpose: Decouple the HTTP surface from the storage backend.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The registry owns the durable id-to-name directory of tenants. Storage
//! backends implement [`TenantRegistry`]; consumers receive an explicitly
//! constructed [`SharedTenantRegistry`] at startup rather than reaching for
//! process-global state. [`EngineError`] is the execution engine's caller
//! contract: unknown-tenant failures stay distinguishable from store faults
//! so callers can render a specific "no such database" response.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::tenant::TenantId;
use crate::tenant::TenantName;
use crate::tenant::TenantNameError;
use crate::tenant::TenantRecord;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Tenant registry errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Attempted use of the reserved registry store name.
    #[error("{0} is a reserved database name")]
    ReservedName(String),
    /// Name failed validation.
    #[error("invalid database name: {0}")]
    InvalidName(String),
    /// Name is already registered.
    #[error("database name already registered: {0}")]
    DuplicateName(String),
    /// No tenant with the requested identifier.
    #[error("no database with id {0}")]
    NotFound(i64),
    /// Registry store reported an error.
    #[error("registry store error: {0}")]
    Store(String),
}

impl From<TenantNameError> for RegistryError {
    fn from(error: TenantNameError) -> Self {
        Self::InvalidName(error.to_string())
    }
}

/// Durable directory of registered tenant databases.
pub trait TenantRegistry {
    /// Registers a new tenant and returns its record with the assigned id.
    ///
    /// The tenant's physical store exists by the time this returns.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the name is reserved or already
    /// registered, or when the registry or tenant store fails.
    fn create(&self, name: &TenantName) -> Result<TenantRecord, RegistryError>;

    /// Returns all registered tenants in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the registry store fails.
    fn get_all(&self) -> Result<Vec<TenantRecord>, RegistryError>;

    /// Looks up one tenant by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when no such tenant exists, or
    /// another [`RegistryError`] when the registry store fails.
    fn get_by_id(&self, id: TenantId) -> Result<TenantRecord, RegistryError>;
}

// ============================================================================
// SECTION: Shared Registry Wrapper
// ============================================================================

/// Shared tenant registry backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedTenantRegistry {
    /// Inner registry implementation.
    inner: Arc<dyn TenantRegistry + Send + Sync>,
}

impl SharedTenantRegistry {
    /// Wraps a registry in a shared, clonable wrapper.
    #[must_use]
    pub fn from_registry(registry: impl TenantRegistry + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(registry),
        }
    }

    /// Wraps an existing shared registry.
    #[must_use]
    pub const fn new(registry: Arc<dyn TenantRegistry + Send + Sync>) -> Self {
        Self {
            inner: registry,
        }
    }
}

impl TenantRegistry for SharedTenantRegistry {
    fn create(&self, name: &TenantName) -> Result<TenantRecord, RegistryError> {
        self.inner.create(name)
    }

    fn get_all(&self) -> Result<Vec<TenantRecord>, RegistryError> {
        self.inner.get_all()
    }

    fn get_by_id(&self, id: TenantId) -> Result<TenantRecord, RegistryError> {
        self.inner.get_by_id(id)
    }
}

// ============================================================================
// SECTION: Execution Engine Errors
// ============================================================================

/// Execution engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No tenant with the requested identifier.
    #[error("no database with id {0}")]
    NotFound(i64),
    /// Registry lookup failed for a reason other than absence.
    #[error("registry lookup failed: {0}")]
    Registry(String),
    /// Tenant store could not be opened or created.
    #[error("database open failed: {0}")]
    Open(String),
    /// Statement could not be prepared or its parameters bound.
    #[error("statement prepare failed: {0}")]
    Prepare(String),
    /// Engine rejected or failed the bound statement.
    #[error("statement execution failed: {0}")]
    Execute(String),
    /// Result shaping failed after a successful execution.
    #[error("result decode failed: {0}")]
    Decode(String),
}

impl From<RegistryError> for EngineError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::NotFound(id) => Self::NotFound(id),
            other => Self::Registry(other.to_string()),
        }
    }
}
