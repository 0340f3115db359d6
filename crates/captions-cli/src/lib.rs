// crates/captions-cli/src/lib.rs
// ============================================================================
// Module: Captions CLI Library
// Description: Shared helpers for the Captions command-line interface.
// Purpose: Provide reusable components for the CLI binary and its tests.
// Dependencies: captions-config, captions-core, captions-providers, captions-store-sqlite
// ============================================================================

//! ## Overview
//! This library houses the pieces of the `captions` binary that are worth
//! testing in isolation: the CLI message catalog, the logging bootstrap, and
//! the assembly of a locale state container from configuration. The binary
//! entry point (`src/main.rs`) owns argument parsing and output.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Internationalization helpers and message catalog.
pub mod i18n;
/// Tracing subscriber bootstrap.
pub mod logging;
/// Container assembly from configuration.
pub mod setup;
