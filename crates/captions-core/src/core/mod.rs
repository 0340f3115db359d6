// crates/captions-core/src/core/mod.rs
// ============================================================================
// Module: Captions Core Types
// Description: Identifiers, content model, and state/report types.
// Purpose: Group the data model shared by every Captions crate.
// Dependencies: crate::core::{content, identifiers, state}
// ============================================================================

//! ## Overview
//! Core types are plain data: they hold no collaborators and perform no I/O.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod content;
pub mod identifiers;
pub mod state;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use content::ContentDocument;
pub use content::ContentNode;
pub use content::DocumentError;
pub use content::KEY_SEPARATOR;
pub use content::Section;
pub use identifiers::IdentifierError;
pub use identifiers::LocaleCode;
pub use identifiers::SectionName;
pub use identifiers::SupportedLocales;
pub use state::ActivationReport;
pub use state::CacheDescriptor;
pub use state::CacheEntry;
pub use state::InitSource;
pub use state::InitStatus;
pub use state::LoadFailure;
pub use state::LoadOrigin;
pub use state::LoadResult;
pub use state::LoaderDiagnostics;
pub use state::LocaleState;
pub use state::ResolutionStats;
pub use state::SectionLoad;
