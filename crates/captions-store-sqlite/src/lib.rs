// crates/captions-store-sqlite/src/lib.rs
// ============================================================================
// Module: Captions SQLite Store
// Description: Durable content cache and preference store using SQLite.
// Purpose: Persist the most recently fetched locale across process restarts.
// Dependencies: captions-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`ContentCache`] and [`PreferenceStore`]
//! sharing one database file. The cache holds a single slot keyed `current`
//! whose locale marker guards every read; the preference table holds the
//! user's chosen locale.
//!
//! [`ContentCache`]: captions_core::ContentCache
//! [`PreferenceStore`]: captions_core::PreferenceStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_DOCUMENT_BYTES;
pub use store::SqliteCaptionStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
