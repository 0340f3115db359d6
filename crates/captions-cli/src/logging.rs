// crates/captions-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging Bootstrap
// Description: Installs the global tracing subscriber for CLI runs.
// Purpose: Route library diagnostics to stderr with a configurable filter.
// Dependencies: captions-config, thiserror, tracing-subscriber
// ============================================================================

//! ## Overview
//! The libraries emit `tracing` events for cache decisions and absorbed
//! failures. The CLI installs one `fmt` subscriber writing to stderr so that
//! stdout carries only command output. The filter comes from `RUST_LOG`, then
//! `[logging].filter`, then the built-in default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use captions_config::LogFormat;
use captions_config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable carrying filter directives.
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Logging bootstrap failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Filter directives failed to parse.
    #[error("invalid log filter {filter}: {error}")]
    Filter {
        /// Offending directives.
        filter: String,
        /// Parser message.
        error: String,
    },
    /// A global subscriber was already installed.
    #[error("logging initialization failed: {0}")]
    Init(String),
}

// ============================================================================
// SECTION: Bootstrap
// ============================================================================

/// Picks the effective filter directives.
///
/// A non-blank environment value wins over the configured filter.
#[must_use]
pub fn resolve_filter(env_value: Option<&str>, logging: &LoggingConfig) -> String {
    match env_value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => logging.filter_or_default().to_string(),
    }
}

/// Parses filter directives.
///
/// # Errors
///
/// Returns [`LoggingError::Filter`] when the directives are invalid.
pub fn build_filter(directives: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directives).map_err(|err| LoggingError::Filter {
        filter: directives.to_string(),
        error: err.to_string(),
    })
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_logging(directives: &str, format: LogFormat) -> Result<(), LoggingError> {
    let filter = build_filter(directives)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);
    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|err| LoggingError::Init(err.to_string()))
}
