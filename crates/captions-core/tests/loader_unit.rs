// crates/captions-core/tests/loader_unit.rs
// ============================================================================
// Module: Content Loader Unit Tests
// Description: Cache-first loading, write-back, and failure absorption.
// Purpose: Validate that loading never fails and never over-fetches.
// ============================================================================

//! ## Overview
//! Unit-level tests for [`ContentLoader`]:
//! - Default locale short-circuits without cache or network access
//! - Cache hits avoid the network; misses fetch and write back
//! - Network, status, and malformed failures yield empty documents
//! - Storage failures degrade to network-only operation

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;

use captions_core::CacheDescriptor;
use captions_core::CacheEntry;
use captions_core::ContentCache;
use captions_core::ContentLoader;
use captions_core::InMemoryContentCache;
use captions_core::LoadFailure;
use captions_core::LoadOrigin;

use crate::common::BrokenCache;
use crate::common::ES_DOCUMENT;
use crate::common::FR_DOCUMENT;
use crate::common::ScriptedSource;
use crate::common::document;
use crate::common::locale;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn loader(source: &Arc<ScriptedSource>, cache: &InMemoryContentCache) -> ContentLoader {
    ContentLoader::new(source.clone(), Arc::new(cache.clone()), locale("en"))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn default_locale_returns_empty_without_io() {
    let source = Arc::new(ScriptedSource::new().with_body("en", ES_DOCUMENT));
    let cache = InMemoryContentCache::new();
    let loader = loader(&source, &cache);

    let result = loader.load_with_outcome(&locale("en")).await;

    assert!(result.document.is_empty());
    assert_eq!(result.origin, LoadOrigin::Bundled);
    assert_eq!(source.total_fetches(), 0);
    assert!(cache.entry().unwrap().is_none());
    assert_eq!(loader.diagnostics().bundled, 1);
}

#[tokio::test]
async fn network_fetch_writes_back_and_second_load_hits_cache() {
    let source = Arc::new(ScriptedSource::new().with_body("es", ES_DOCUMENT));
    let cache = InMemoryContentCache::new();
    let loader = loader(&source, &cache);

    let first = loader.load_with_outcome(&locale("es")).await;
    let second = loader.load_with_outcome(&locale("es")).await;

    assert_eq!(first.origin, LoadOrigin::Network);
    assert_eq!(second.origin, LoadOrigin::Cache);
    assert_eq!(first.document, second.document);
    assert_eq!(source.fetch_count("es"), 1);
    assert_eq!(cache.entry().unwrap().unwrap().locale, locale("es"));
    let diagnostics = loader.diagnostics();
    assert_eq!(diagnostics.cache_misses, 1);
    assert_eq!(diagnostics.cache_hits, 1);
    assert_eq!(diagnostics.network_fetches, 1);
}

#[tokio::test]
async fn switching_locale_evicts_previous_entry() {
    let source =
        Arc::new(ScriptedSource::new().with_body("es", ES_DOCUMENT).with_body("fr", FR_DOCUMENT));
    let cache = InMemoryContentCache::new();
    let loader = loader(&source, &cache);

    loader.load(&locale("es")).await;
    loader.load(&locale("fr")).await;

    assert_eq!(cache.cached_locale().await.unwrap(), Some(locale("fr")));
    assert!(cache.get(&CacheDescriptor::new(locale("es"))).await.unwrap().is_none());
    loader.load(&locale("es")).await;
    assert_eq!(source.fetch_count("es"), 2);
}

#[tokio::test]
async fn mismatched_marker_is_a_miss() {
    let source = Arc::new(ScriptedSource::new().with_body("es", ES_DOCUMENT));
    let cache = InMemoryContentCache::with_entry(CacheEntry {
        locale: locale("fr"),
        document: document(FR_DOCUMENT),
    });
    let loader = loader(&source, &cache);

    let result = loader.load_with_outcome(&locale("es")).await;

    assert_eq!(result.origin, LoadOrigin::Network);
    assert_eq!(result.document, document(ES_DOCUMENT));
    assert_eq!(source.fetch_count("es"), 1);
}

#[tokio::test]
async fn network_failure_returns_empty_document() {
    let source = Arc::new(ScriptedSource::new());
    let cache = InMemoryContentCache::new();
    let loader = loader(&source, &cache);

    let result = loader.load_with_outcome(&locale("es")).await;

    assert!(result.document.is_empty());
    assert_eq!(result.origin, LoadOrigin::Failed(LoadFailure::Network));
    assert!(cache.entry().unwrap().is_none());
    assert_eq!(loader.diagnostics().network_failures, 1);
}

#[tokio::test]
async fn non_success_status_is_a_network_failure() {
    let source = Arc::new(ScriptedSource::new().with_status("es", 404));
    let cache = InMemoryContentCache::new();
    let loader = loader(&source, &cache);

    let result = loader.load_with_outcome(&locale("es")).await;

    assert_eq!(result.origin, LoadOrigin::Failed(LoadFailure::Network));
    assert!(result.document.is_empty());
}

#[tokio::test]
async fn malformed_body_returns_empty_and_is_not_cached() {
    let source = Arc::new(ScriptedSource::new().with_body("es", "{\"common\": \"flat\"}"));
    let cache = InMemoryContentCache::new();
    let loader = loader(&source, &cache);

    let result = loader.load_with_outcome(&locale("es")).await;

    assert_eq!(result.origin, LoadOrigin::Failed(LoadFailure::MalformedDocument));
    assert!(result.document.is_empty());
    assert!(cache.entry().unwrap().is_none());
    assert_eq!(loader.diagnostics().malformed_documents, 1);
}

#[tokio::test]
async fn failures_are_retried_on_next_load() {
    let source = Arc::new(ScriptedSource::new().with_status("es", 503));
    let cache = InMemoryContentCache::new();
    let loader = loader(&source, &cache);

    assert!(loader.load(&locale("es")).await.is_empty());
    source.respond("es", common::Scripted::Body(ES_DOCUMENT.as_bytes().to_vec()));
    let recovered = loader.load_with_outcome(&locale("es")).await;

    assert_eq!(recovered.origin, LoadOrigin::Network);
    assert_eq!(source.fetch_count("es"), 2);
}

#[tokio::test]
async fn broken_cache_degrades_to_network_only() {
    let source = Arc::new(ScriptedSource::new().with_body("es", ES_DOCUMENT));
    let loader = ContentLoader::new(source.clone(), Arc::new(BrokenCache), locale("en"));

    let first = loader.load_with_outcome(&locale("es")).await;
    let second = loader.load_with_outcome(&locale("es")).await;

    assert_eq!(first.origin, LoadOrigin::Network);
    assert_eq!(second.origin, LoadOrigin::Network);
    assert_eq!(first.document, document(ES_DOCUMENT));
    assert_eq!(source.fetch_count("es"), 2);
    assert_eq!(loader.diagnostics().storage_failures, 4);
    assert!(loader.clear_cache().await.is_err());
}
