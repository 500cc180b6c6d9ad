// silo-http/src/lib.rs
// ============================================================================
// Module: Silo HTTP Library
// Description: HTTP surface, configuration, and demo console for Silo.
// Purpose: Expose the registry and execution engine over REST endpoints.
// Dependencies: silo-core, silo-store-sqlite, axum
// ============================================================================

//! ## Overview
//! This crate owns everything between the wire and the core: the TOML
//! configuration model, the axum router mapping `/database` endpoints onto
//! the injected registry and execution engine, the uniform failure shape
//! (`400` with a JSON error message), and the static demo console. The core
//! crates never see HTTP types.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod demo;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::ServerConfig;
pub use config::SiloConfig;
pub use server::ServerError;
pub use server::SiloServer;
