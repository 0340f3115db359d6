// crates/captions-core/src/interfaces/mod.rs
// ============================================================================
// Module: Captions Interfaces
// Description: Collaborator contracts for content sources, caches, and probes.
// Purpose: Keep the loader and container independent of transport and storage.
// Dependencies: async-trait, thiserror, crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how Captions reaches its external collaborators: the
//! remote content origin, the persistent single-slot cache, the preference
//! store, and the device language probe. Implementations report failures as
//! typed errors; the runtime decides which failures degrade and which surface.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;

use crate::core::CacheDescriptor;
use crate::core::ContentDocument;
use crate::core::LocaleCode;

// ============================================================================
// SECTION: Content Source
// ============================================================================

/// Content source errors.
///
/// # Invariants
/// - Messages never embed document payloads.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport failure (connect, timeout, read).
    #[error("content source network error: {0}")]
    Network(String),
    /// Origin answered with a non-success status.
    #[error("content source returned status {status} for {locale}")]
    Status {
        /// HTTP-like status code.
        status: u16,
        /// Requested locale.
        locale: String,
    },
    /// Origin has no document for the locale.
    #[error("content source has no document: {0}")]
    NotFound(String),
    /// Local read failure for file-backed sources.
    #[error("content source io error: {0}")]
    Io(String),
    /// Response exceeded the configured size limit.
    #[error("content source response too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Observed size in bytes.
        actual_bytes: usize,
    },
    /// Source configuration or request is invalid.
    #[error("content source invalid request: {0}")]
    Invalid(String),
}

/// Remote origin of content documents, one per locale.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches the raw document bytes for `locale`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the document cannot be retrieved.
    async fn fetch(&self, locale: &LocaleCode) -> Result<Vec<u8>, SourceError>;
}

// ============================================================================
// SECTION: Content Cache
// ============================================================================

/// Content cache errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Cache I/O error.
    #[error("content cache io error: {0}")]
    Io(String),
    /// Cache data is corrupted.
    #[error("content cache corruption: {0}")]
    Corrupt(String),
    /// Cache data version is incompatible.
    #[error("content cache version mismatch: {0}")]
    VersionMismatch(String),
    /// Cache data or request is invalid.
    #[error("content cache invalid data: {0}")]
    Invalid(String),
    /// Cache backend reported an error.
    #[error("content cache error: {0}")]
    Store(String),
}

/// Persistent single-slot cache for the most recently fetched document.
///
/// # Invariants
/// - At most one entry exists.
/// - `get` returns a document only when the stored locale marker equals the
///   descriptor's locale.
/// - `set` for a different locale clears the prior entry atomically with the
///   write.
#[async_trait]
pub trait ContentCache: Send + Sync {
    /// Returns the cached document for `descriptor`, if the marker matches.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend cannot be read.
    async fn get(
        &self,
        descriptor: &CacheDescriptor,
    ) -> Result<Option<ContentDocument>, CacheError>;

    /// Stores `document` under `descriptor`, evicting any other locale.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend cannot be written.
    async fn set(
        &self,
        descriptor: &CacheDescriptor,
        document: &ContentDocument,
    ) -> Result<(), CacheError>;

    /// Removes any stored document.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend cannot be written.
    async fn clear(&self) -> Result<(), CacheError>;

    /// Returns the locale marker of the stored entry, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend cannot be read.
    async fn cached_locale(&self) -> Result<Option<LocaleCode>, CacheError>;
}

// ============================================================================
// SECTION: Preference Store
// ============================================================================

/// Preference store errors.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Store I/O error.
    #[error("preference store io error: {0}")]
    Io(String),
    /// Stored value is invalid.
    #[error("preference store invalid data: {0}")]
    Invalid(String),
    /// Store backend reported an error.
    #[error("preference store error: {0}")]
    Store(String),
}

/// Persists the user's chosen locale between sessions.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Loads the persisted locale string, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError`] when the backend cannot be read.
    async fn load_locale(&self) -> Result<Option<String>, PreferenceError>;

    /// Persists `locale` as the preferred locale.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError`] when the backend cannot be written.
    async fn save_locale(&self, locale: &LocaleCode) -> Result<(), PreferenceError>;
}

// ============================================================================
// SECTION: Locale Probe
// ============================================================================

/// Device language detection errors.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The platform did not report a language.
    #[error("device locale unavailable")]
    Unavailable,
    /// The platform reported a value that is not a locale code.
    #[error("device locale unsupported: {0}")]
    Unsupported(String),
}

/// Reports the device's preferred language.
pub trait LocaleProbe: Send + Sync {
    /// Detects the device locale.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] when no usable locale is reported.
    fn detect(&self) -> Result<LocaleCode, ProbeError>;
}
