// silo-cli/src/main.rs
// ============================================================================
// Module: Silo CLI Entry Point
// Description: Command dispatcher for the Silo server and config tooling.
// Purpose: Provide a safe, localized launcher for the multi-tenant service.
// Dependencies: clap, silo-http, tokio
// ============================================================================

//! ## Overview
//! The Silo CLI launches the HTTP server over a loaded configuration and
//! echoes the effective configuration for inspection. Binding beyond
//! loopback requires explicit opt-in because the service carries no
//! authentication. Errors exit non-zero with a single-line message.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod serve_policy;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use silo_http::SiloConfig;
use silo_http::SiloServer;
use thiserror::Error;

use crate::serve_policy::BindOutcome;
use crate::serve_policy::enforce_local_only;
use crate::serve_policy::resolve_allow_non_loopback;

// ============================================================================
// SECTION: CLI Model
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "silo", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Silo HTTP server.
    Serve(ServeCommand),
    /// Print the effective configuration as TOML.
    Config(ConfigCommand),
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Path to the configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override the configured bind address.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
    /// Allow binding to non-loopback addresses.
    #[arg(long, action = ArgAction::SetTrue)]
    allow_non_loopback: bool,
}

/// Configuration for the `config` command.
#[derive(Args, Debug)]
struct ConfigCommand {
    /// Path to the configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failure carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable failure message.
    message: String,
}

impl CliError {
    /// Builds a CLI error from a message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result alias for CLI command handlers.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Parses arguments and dispatches the selected command.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        emit_line(&format!("silo {}", env!("CARGO_PKG_VERSION")));
        return Ok(ExitCode::SUCCESS);
    }
    match cli.command {
        Some(Commands::Serve(command)) => command_serve(command).await,
        Some(Commands::Config(command)) => command_config(&command),
        None => {
            Cli::command()
                .print_long_help()
                .map_err(|err| CliError::new(format!("help output failed: {err}")))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let mut config = SiloConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    if let Some(bind) = command.bind {
        config.server.bind = bind;
    }
    let allow_non_loopback = resolve_allow_non_loopback(command.allow_non_loopback)
        .map_err(|err| CliError::new(err.to_string()))?;
    let outcome = enforce_local_only(&config, allow_non_loopback)
        .map_err(|err| CliError::new(err.to_string()))?;
    emit_exposure_warning(&outcome);
    let server = tokio::task::spawn_blocking(move || SiloServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("init join failed: {err}")))?
        .map_err(|err| CliError::new(err.to_string()))?;
    server.serve().await.map_err(|err| CliError::new(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `config` command.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    let config = SiloConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let rendered = config.to_toml().map_err(|err| CliError::new(err.to_string()))?;
    emit_line(&rendered);
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Emits serve-time exposure warnings.
#[allow(clippy::print_stderr, reason = "User-facing launch warning.")]
fn emit_exposure_warning(outcome: &BindOutcome) {
    if outcome.network_exposed {
        eprintln!(
            "silo: WARNING: serving without authentication on non-loopback address {}",
            outcome.bind_addr
        );
    }
}

/// Emits a line to stdout.
#[allow(clippy::print_stdout, reason = "User-facing command output.")]
fn emit_line(line: &str) {
    println!("{line}");
}

/// Emits a failure message and returns a failing exit code.
#[allow(clippy::print_stderr, reason = "User-facing error output.")]
fn emit_error(message: &str) -> ExitCode {
    eprintln!("silo: error: {message}");
    ExitCode::FAILURE
}
