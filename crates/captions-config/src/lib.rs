// crates/captions-config/src/lib.rs
// ============================================================================
// Module: Captions Config Library
// Description: Canonical config model, validation, and example output.
// Purpose: Single source of truth for captions.toml semantics.
// Dependencies: captions-core, captions-providers, captions-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `captions-config` defines the configuration model for Captions: the
//! content origin, supported locales, the persistent store, and logging. It
//! provides strict, fail-closed validation and a canonical example file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
