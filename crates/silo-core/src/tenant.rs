// silo-core/src/tenant.rs
// ============================================================================
// Module: Tenant Directory Types
// Description: Identifiers and records for registered tenant databases.
// Purpose: Give the registry a validated, serializable tenant vocabulary.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A tenant is one independently addressable named database. The registry
//! assigns each tenant a numeric identifier and maps it to a validated name;
//! the name doubles as the tenant's physical file stem, so validation fails
//! closed on anything that is not a plain file-name-safe token.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroI64;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Reserved name of the registry's own backing store.
pub const RESERVED_TENANT_NAME: &str = "main";
/// Maximum tenant name length in bytes.
pub const MAX_TENANT_NAME_LENGTH: usize = 128;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Tenant identifier assigned by the registry.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based, registry-assigned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(NonZeroI64);

impl TenantId {
    /// Creates a tenant identifier from a raw value (returns `None` if < 1).
    #[must_use]
    pub fn from_raw(raw: i64) -> Option<Self> {
        if raw < 1 {
            return None;
        }
        NonZeroI64::new(raw).map(Self)
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0.get()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

// ============================================================================
// SECTION: Tenant Names
// ============================================================================

/// Tenant name validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TenantNameError {
    /// Name was empty.
    #[error("database name must not be empty")]
    Empty,
    /// Name exceeded the length limit.
    #[error("database name exceeds {MAX_TENANT_NAME_LENGTH} bytes")]
    TooLong,
    /// Name contained a character outside the file-name-safe charset.
    #[error("database name may only contain ASCII letters, digits, '-' and '_'")]
    InvalidCharacter,
}

/// Validated tenant name.
///
/// # Invariants
/// - Non-empty, at most [`MAX_TENANT_NAME_LENGTH`] bytes.
/// - Restricted to `[A-Za-z0-9_-]` so the name maps to a safe file name.
///
/// The reserved literal [`RESERVED_TENANT_NAME`] passes validation (the
/// registry itself opens its store under it) but is rejected as a tenant
/// name by [`crate::TenantRegistry::create`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct TenantName(String);

impl TenantName {
    /// Creates a validated tenant name.
    ///
    /// # Errors
    ///
    /// Returns [`TenantNameError`] when the name is empty, too long, or
    /// contains a character outside `[A-Za-z0-9_-]`.
    pub fn new(raw: impl Into<String>) -> Result<Self, TenantNameError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(TenantNameError::Empty);
        }
        if raw.len() > MAX_TENANT_NAME_LENGTH {
            return Err(TenantNameError::TooLong);
        }
        if !raw.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_') {
            return Err(TenantNameError::InvalidCharacter);
        }
        Ok(Self(raw))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the reserved name of the registry's own backing store.
    #[must_use]
    pub fn reserved() -> Self {
        Self(RESERVED_TENANT_NAME.to_string())
    }

    /// Returns true when the name is the reserved registry store name.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.0 == RESERVED_TENANT_NAME
    }
}

impl TryFrom<String> for TenantName {
    type Error = TenantNameError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl fmt::Display for TenantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// One registry entry mapping a tenant identifier to its name.
///
/// Created by [`crate::TenantRegistry::create`]; never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    /// Registry-assigned identifier.
    pub id: TenantId,
    /// Validated tenant name.
    pub name: TenantName,
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

    use super::MAX_TENANT_NAME_LENGTH;
    use super::TenantId;
    use super::TenantName;
    use super::TenantNameError;

    #[test]
    fn tenant_id_rejects_zero_and_negative() {
        assert!(TenantId::from_raw(0).is_none());
        assert!(TenantId::from_raw(-3).is_none());
        assert_eq!(TenantId::from_raw(7).expect("valid id").get(), 7);
    }

    #[test]
    fn tenant_name_accepts_file_safe_tokens() {
        let name = TenantName::new("orders_2024-eu").expect("valid name");
        assert_eq!(name.as_str(), "orders_2024-eu");
        assert!(!name.is_reserved());
    }

    #[test]
    fn tenant_name_rejects_empty() {
        assert_eq!(TenantName::new(""), Err(TenantNameError::Empty));
    }

    #[test]
    fn tenant_name_rejects_path_characters() {
        assert_eq!(TenantName::new("../escape"), Err(TenantNameError::InvalidCharacter));
        assert_eq!(TenantName::new("a b"), Err(TenantNameError::InvalidCharacter));
        assert_eq!(TenantName::new("a/b"), Err(TenantNameError::InvalidCharacter));
    }

    #[test]
    fn tenant_name_rejects_overlong() {
        let raw = "x".repeat(MAX_TENANT_NAME_LENGTH + 1);
        assert_eq!(TenantName::new(raw), Err(TenantNameError::TooLong));
    }

    #[test]
    fn reserved_name_is_flagged() {
        let name = TenantName::new("main").expect("charset-valid name");
        assert!(name.is_reserved());
    }

    #[test]
    fn tenant_name_deserializes_with_validation() {
        let ok: Result<TenantName, _> = serde_json::from_str("\"invoices\"");
        assert!(ok.is_ok());
        let bad: Result<TenantName, _> = serde_json::from_str("\"../invoices\"");
        assert!(bad.is_err());
    }
}
