// crates/captions-core/src/runtime/mod.rs
// ============================================================================
// Module: Captions Runtime
// Description: Content loader, locale state container, resolver, and stores.
// Purpose: Implement loading, section selection, and key resolution.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the behavior behind the interfaces: cache-first
//! loading, the owned locale state, fallback-chain resolution, and in-memory
//! collaborators for tests and demos.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod container;
pub mod loader;
pub mod resolver;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use container::ContainerConfig;
pub use container::DEFAULT_BASELINE_SECTIONS;
pub use container::LocaleStateContainer;
pub use container::default_baseline_sections;
pub use loader::ContentLoader;
pub use resolver::CaptionArg;
pub use resolver::CaptionResolver;
pub use resolver::interpolate;
pub use store::InMemoryContentCache;
pub use store::InMemoryPreferenceStore;
