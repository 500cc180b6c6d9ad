// silo-cli/src/serve_policy.rs
// ============================================================================
// Module: Serve Policy
// Description: Network exposure policy checks for the server launcher.
// Purpose: Enforce safe-by-default bind behavior with explicit opt-in.
// Dependencies: silo-http, std
// ============================================================================

//! ## Overview
//! Silo has no authentication, so the launcher is fail-closed about network
//! exposure: loopback binds are always allowed, and anything else requires
//! an explicit opt-in through a flag or environment variable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::net::SocketAddr;

use silo_http::SiloConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable enabling non-loopback server binds.
pub const ALLOW_NON_LOOPBACK_ENV: &str = "SILO_ALLOW_NON_LOOPBACK";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Bind outcome metadata for launch warnings.
#[derive(Debug, Clone, Copy)]
pub struct BindOutcome {
    /// Bound socket address.
    pub bind_addr: SocketAddr,
    /// True when the server is bound to a non-loopback address.
    pub network_exposed: bool,
}

/// Serve policy failures for bind safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServePolicyError {
    /// Environment variable was set to an invalid value.
    InvalidEnv {
        /// Raw environment value.
        value: String,
    },
    /// Bind string failed to parse.
    InvalidBind {
        /// Parse error message.
        error: String,
    },
    /// Non-loopback binding requires explicit opt-in.
    NonLoopbackOptInRequired {
        /// Bind address.
        bind: String,
    },
}

impl std::fmt::Display for ServePolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEnv {
                value,
            } => {
                write!(f, "{ALLOW_NON_LOOPBACK_ENV} must be a boolean value, got {value}")
            }
            Self::InvalidBind {
                error,
            } => write!(f, "bind address rejected: {error}"),
            Self::NonLoopbackOptInRequired {
                bind,
            } => write!(
                f,
                "refusing to bind {bind}: non-loopback binds require --allow-non-loopback or \
                 {ALLOW_NON_LOOPBACK_ENV}=1"
            ),
        }
    }
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Resolves the non-loopback opt-in flag from CLI and environment.
///
/// # Errors
///
/// Returns [`ServePolicyError::InvalidEnv`] when the environment value is
/// invalid.
pub fn resolve_allow_non_loopback(flag: bool) -> Result<bool, ServePolicyError> {
    if flag {
        return Ok(true);
    }
    let Some(value) = env::var_os(ALLOW_NON_LOOPBACK_ENV) else {
        return Ok(false);
    };
    parse_allow_value(&value.to_string_lossy())
}

/// Enforces loopback-only binds unless explicitly opted out.
///
/// # Errors
///
/// Returns [`ServePolicyError`] when the bind address does not parse or
/// network exposure lacks the explicit opt-in.
pub fn enforce_local_only(
    config: &SiloConfig,
    allow_non_loopback: bool,
) -> Result<BindOutcome, ServePolicyError> {
    let addr = config.bind_addr().map_err(|err| ServePolicyError::InvalidBind {
        error: err.to_string(),
    })?;
    if addr.ip().is_loopback() {
        return Ok(BindOutcome {
            bind_addr: addr,
            network_exposed: false,
        });
    }
    if !allow_non_loopback {
        return Err(ServePolicyError::NonLoopbackOptInRequired {
            bind: addr.to_string(),
        });
    }
    Ok(BindOutcome {
        bind_addr: addr,
        network_exposed: true,
    })
}

/// Parses a boolean opt-in environment value.
fn parse_allow_value(value: &str) -> Result<bool, ServePolicyError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ServePolicyError::InvalidEnv {
            value: other.to_string(),
        }),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
