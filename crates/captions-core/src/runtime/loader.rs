// crates/captions-core/src/runtime/loader.rs
// ============================================================================
// Module: Captions Content Loader
// Description: Cache-first content loading with network fallback.
// Purpose: Return a locale's full document without ever failing the caller.
// Dependencies: tracing, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`ContentLoader::load`] answers the default locale with an empty document
//! (its content is bundled), then consults the single-slot cache, then the
//! content source. Network and decoding failures yield an empty document.
//! Storage failures degrade to network-only operation. Every absorbed failure
//! is logged and counted in [`LoaderDiagnostics`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use tracing::debug;
use tracing::warn;

use crate::core::CacheDescriptor;
use crate::core::ContentDocument;
use crate::core::LoadFailure;
use crate::core::LoadOrigin;
use crate::core::LoadResult;
use crate::core::LoaderDiagnostics;
use crate::core::LocaleCode;
use crate::interfaces::CacheError;
use crate::interfaces::ContentCache;
use crate::interfaces::ContentSource;

// ============================================================================
// SECTION: Counters
// ============================================================================

/// Atomic loader counters backing [`LoaderDiagnostics`].
#[derive(Debug, Default)]
struct LoaderCounters {
    /// Default-locale short circuits.
    bundled: AtomicU64,
    /// Cache hits.
    cache_hits: AtomicU64,
    /// Cache misses.
    cache_misses: AtomicU64,
    /// Successful fetches.
    network_fetches: AtomicU64,
    /// Failed fetches.
    network_failures: AtomicU64,
    /// Undecodable bodies.
    malformed_documents: AtomicU64,
    /// Cache backend failures.
    storage_failures: AtomicU64,
}

impl LoaderCounters {
    /// Increments a counter.
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a snapshot of all counters.
    fn snapshot(&self) -> LoaderDiagnostics {
        LoaderDiagnostics {
            bundled: self.bundled.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            network_fetches: self.network_fetches.load(Ordering::Relaxed),
            network_failures: self.network_failures.load(Ordering::Relaxed),
            malformed_documents: self.malformed_documents.load(Ordering::Relaxed),
            storage_failures: self.storage_failures.load(Ordering::Relaxed),
        }
    }
}

// ============================================================================
// SECTION: Content Loader
// ============================================================================

/// Loads full content documents, cache first.
///
/// # Invariants
/// - The default locale never touches the cache or the source.
/// - A cache hit never touches the source.
/// - `load` never fails; failures are observable via [`Self::diagnostics`].
#[derive(Clone)]
pub struct ContentLoader {
    /// Remote content origin.
    source: Arc<dyn ContentSource>,
    /// Single-slot document cache.
    cache: Arc<dyn ContentCache>,
    /// Locale whose content is bundled.
    default_locale: LocaleCode,
    /// Shared counters.
    counters: Arc<LoaderCounters>,
}

impl ContentLoader {
    /// Creates a loader over `source` and `cache`.
    #[must_use]
    pub fn new(
        source: Arc<dyn ContentSource>,
        cache: Arc<dyn ContentCache>,
        default_locale: LocaleCode,
    ) -> Self {
        Self {
            source,
            cache,
            default_locale,
            counters: Arc::new(LoaderCounters::default()),
        }
    }

    /// Returns the locale whose content is bundled.
    #[must_use]
    pub const fn default_locale(&self) -> &LocaleCode {
        &self.default_locale
    }

    /// Returns the full document for `locale`, or an empty document on failure.
    pub async fn load(&self, locale: &LocaleCode) -> ContentDocument {
        self.load_with_outcome(locale).await.document
    }

    /// Returns the full document for `locale` together with its origin.
    pub async fn load_with_outcome(&self, locale: &LocaleCode) -> LoadResult {
        if *locale == self.default_locale {
            LoaderCounters::bump(&self.counters.bundled);
            return LoadResult {
                document: ContentDocument::new(),
                origin: LoadOrigin::Bundled,
            };
        }

        let descriptor = CacheDescriptor::new(locale.clone());
        match self.cache.get(&descriptor).await {
            Ok(Some(document)) => {
                LoaderCounters::bump(&self.counters.cache_hits);
                debug!(locale = %locale, "content cache hit");
                return LoadResult {
                    document,
                    origin: LoadOrigin::Cache,
                };
            }
            Ok(None) => {
                LoaderCounters::bump(&self.counters.cache_misses);
                debug!(locale = %locale, "content cache miss");
            }
            Err(err) => self.record_storage_failure(locale, "get", &err),
        }

        let bytes = match self.source.fetch(locale).await {
            Ok(bytes) => bytes,
            Err(err) => {
                LoaderCounters::bump(&self.counters.network_failures);
                warn!(
                    locale = %locale,
                    kind = %LoadFailure::Network,
                    error = %err,
                    "content fetch failed; serving empty document"
                );
                return failed(LoadFailure::Network);
            }
        };
        let document = match ContentDocument::from_json_slice(&bytes) {
            Ok(document) => document,
            Err(err) => {
                LoaderCounters::bump(&self.counters.malformed_documents);
                warn!(
                    locale = %locale,
                    kind = %LoadFailure::MalformedDocument,
                    error = %err,
                    "content document rejected; serving empty document"
                );
                return failed(LoadFailure::MalformedDocument);
            }
        };
        LoaderCounters::bump(&self.counters.network_fetches);
        debug!(locale = %locale, sections = document.len(), "content fetched");

        if let Err(err) = self.cache.set(&descriptor, &document).await {
            self.record_storage_failure(locale, "set", &err);
        }
        LoadResult {
            document,
            origin: LoadOrigin::Network,
        }
    }

    /// Clears the cache.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the cache backend fails; the failure is
    /// also counted.
    pub async fn clear_cache(&self) -> Result<(), CacheError> {
        self.cache.clear().await.inspect_err(|_| {
            LoaderCounters::bump(&self.counters.storage_failures);
        })
    }

    /// Returns the locale marker of the cached entry, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the cache backend fails.
    pub async fn cached_locale(&self) -> Result<Option<LocaleCode>, CacheError> {
        self.cache.cached_locale().await
    }

    /// Returns a snapshot of the loader counters.
    #[must_use]
    pub fn diagnostics(&self) -> LoaderDiagnostics {
        self.counters.snapshot()
    }

    /// Logs and counts a cache failure that degrades to network-only loading.
    fn record_storage_failure(&self, locale: &LocaleCode, operation: &str, err: &CacheError) {
        LoaderCounters::bump(&self.counters.storage_failures);
        warn!(
            locale = %locale,
            operation,
            error = %err,
            "content cache unavailable; continuing without cache"
        );
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the empty result returned for an absorbed failure.
fn failed(failure: LoadFailure) -> LoadResult {
    LoadResult {
        document: ContentDocument::new(),
        origin: LoadOrigin::Failed(failure),
    }
}
