// crates/captions-core/src/lib.rs
// ============================================================================
// Module: Captions Core Library
// Description: Public API surface for the Captions core.
// Purpose: Expose content types, collaborator interfaces, and runtime pieces.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Captions delivers localized text incrementally. The core resolves lookup
//! keys to display strings for the active locale, loads only the sections that
//! are needed, keeps the most recently fetched locale in a single-slot cache,
//! and falls back to bundled default content when keys are missing.
//!
//! Transport, storage, and device probing live behind the traits in
//! [`interfaces`]; concrete adapters ship in sibling crates.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::CacheError;
pub use interfaces::ContentCache;
pub use interfaces::ContentSource;
pub use interfaces::LocaleProbe;
pub use interfaces::PreferenceError;
pub use interfaces::PreferenceStore;
pub use interfaces::ProbeError;
pub use interfaces::SourceError;
pub use runtime::CaptionArg;
pub use runtime::CaptionResolver;
pub use runtime::ContainerConfig;
pub use runtime::ContentLoader;
pub use runtime::InMemoryContentCache;
pub use runtime::InMemoryPreferenceStore;
pub use runtime::LocaleStateContainer;
