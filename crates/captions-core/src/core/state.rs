// crates/captions-core/src/core/state.rs
// ============================================================================
// Module: Captions State Types
// Description: Locale state snapshots, cache descriptors, and load reports.
// Purpose: Describe the observable outcomes of loading and resolving content.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! These types carry state and outcomes between the loader, the locale state
//! container, and callers. Absorbed failures never surface as errors; they are
//! described here so callers can observe degraded results instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::core::content::ContentDocument;
use crate::core::identifiers::LocaleCode;

// ============================================================================
// SECTION: Cache Descriptor
// ============================================================================

/// Identifies the cache slot a caller expects to read or write.
///
/// # Invariants
/// - `locale` is compared with the stored marker on every cache access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheDescriptor {
    /// Locale the cached document belongs to.
    pub locale: LocaleCode,
}

impl CacheDescriptor {
    /// Creates a descriptor for `locale`.
    #[must_use]
    pub const fn new(locale: LocaleCode) -> Self {
        Self {
            locale,
        }
    }
}

/// The single cached document together with its locale marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Locale marker for the stored document.
    pub locale: LocaleCode,
    /// Stored document.
    pub document: ContentDocument,
}

// ============================================================================
// SECTION: Locale State
// ============================================================================

/// Point-in-time view of the locale state container.
///
/// # Invariants
/// - `loaded_content` only holds sections returned by the loader for
///   `active_locale`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleState {
    /// Locale whose content is loaded.
    pub active_locale: LocaleCode,
    /// Sections loaded for the active locale.
    pub loaded_content: Arc<ContentDocument>,
    /// True while any load is in progress.
    pub busy: bool,
}

// ============================================================================
// SECTION: Load Outcomes
// ============================================================================

/// Failure absorbed by the content loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailure {
    /// The content source was unreachable or answered with a non-success status.
    Network,
    /// The content source answered with a body that is not a content document.
    MalformedDocument,
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => f.write_str("network"),
            Self::MalformedDocument => f.write_str("malformed_document"),
        }
    }
}

/// Where a loaded document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "origin", content = "failure")]
pub enum LoadOrigin {
    /// Default locale; content is bundled and nothing was fetched.
    Bundled,
    /// Served from the local cache.
    Cache,
    /// Fetched from the content source.
    Network,
    /// Loading failed and an empty document was returned.
    Failed(LoadFailure),
}

impl LoadOrigin {
    /// Returns the absorbed failure, if any.
    #[must_use]
    pub const fn failure(self) -> Option<LoadFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            Self::Bundled | Self::Cache | Self::Network => None,
        }
    }
}

impl fmt::Display for LoadOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bundled => f.write_str("bundled"),
            Self::Cache => f.write_str("cache"),
            Self::Network => f.write_str("network"),
            Self::Failed(failure) => write!(f, "failed ({failure})"),
        }
    }
}

/// Document returned by the loader along with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    /// Loaded document; empty on failure or for the default locale.
    pub document: ContentDocument,
    /// Where the document came from.
    pub origin: LoadOrigin,
}

// ============================================================================
// SECTION: Container Reports
// ============================================================================

/// Outcome of a locale activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    /// Locale the caller asked for.
    pub requested: LocaleCode,
    /// Locale actually activated, matched against the supported set (the
    /// default when `requested` is unsupported).
    pub locale: LocaleCode,
    /// Where the content came from.
    pub origin: LoadOrigin,
    /// Sections retained in the loaded content.
    pub sections: Vec<String>,
    /// True when a newer activation was issued and this result was discarded.
    pub superseded: bool,
    /// True when the preference store accepted the new locale.
    pub preference_saved: bool,
}

impl ActivationReport {
    /// Returns true when the activated locale differs from `requested`.
    #[must_use]
    pub fn coerced(&self) -> bool {
        self.requested != self.locale
    }
}

/// Outcome of an incremental section load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionLoad {
    /// The active locale is the default; nothing was loaded.
    Skipped,
    /// The section was merged into the loaded content.
    Merged {
        /// Where the document came from.
        origin: LoadOrigin,
    },
    /// The loaded document does not contain the section.
    Missing {
        /// Where the document came from.
        origin: LoadOrigin,
    },
    /// An activation was issued while loading; the result was discarded.
    Superseded,
}

/// How the starting locale was chosen during initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitSource {
    /// Persisted user preference.
    Preference,
    /// Device language probe.
    Device,
    /// Default locale.
    Default,
}

impl fmt::Display for InitSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preference => f.write_str("preference"),
            Self::Device => f.write_str("device"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// Initialization status of the locale state container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitStatus {
    /// `initialize` has not completed yet.
    Pending,
    /// Content for the starting locale is loaded.
    Ready {
        /// Activated locale.
        locale: LocaleCode,
        /// How the locale was chosen.
        source: InitSource,
    },
    /// Content for a non-default starting locale failed to load; retrying
    /// `initialize` is safe.
    Failed {
        /// Activated locale (its loaded content is empty).
        locale: LocaleCode,
        /// How the locale was chosen.
        source: InitSource,
        /// Absorbed loader failure.
        failure: LoadFailure,
    },
}

impl InitStatus {
    /// Returns true when initialization failed and a retry may help.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

// ============================================================================
// SECTION: Statistics
// ============================================================================

/// Resolution counters for one resolver instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    /// Keys answered from the loaded content.
    pub store_hits: u64,
    /// Keys answered from the bundled default document.
    pub fallback_hits: u64,
    /// Keys answered with the caller fallback or the key itself.
    pub missing_keys: u64,
}

/// Loader counters, including every absorbed failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderDiagnostics {
    /// Loads short-circuited for the default locale.
    pub bundled: u64,
    /// Loads answered by the cache.
    pub cache_hits: u64,
    /// Cache lookups that found nothing for the requested locale.
    pub cache_misses: u64,
    /// Successful network fetches.
    pub network_fetches: u64,
    /// Fetches that failed at the transport or status level.
    pub network_failures: u64,
    /// Fetched bodies that were not valid content documents.
    pub malformed_documents: u64,
    /// Cache reads, writes, or clears that failed.
    pub storage_failures: u64,
}
