// crates/captions-core/src/runtime/store.rs
// ============================================================================
// Module: Captions In-Memory Stores
// Description: In-memory content cache and preference store.
// Purpose: Provide deterministic collaborators for tests and local demos.
// Dependencies: async-trait, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! In-memory implementations of [`ContentCache`] and [`PreferenceStore`]. They
//! honor the same marker and eviction rules as the persistent backends but do
//! not survive the process. Clones share the same storage.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::CacheDescriptor;
use crate::core::CacheEntry;
use crate::core::ContentDocument;
use crate::core::LocaleCode;
use crate::interfaces::CacheError;
use crate::interfaces::ContentCache;
use crate::interfaces::PreferenceError;
use crate::interfaces::PreferenceStore;

// ============================================================================
// SECTION: In-Memory Content Cache
// ============================================================================

/// In-memory single-slot content cache.
#[derive(Debug, Default, Clone)]
pub struct InMemoryContentCache {
    /// Stored entry protected by a mutex.
    slot: Arc<Mutex<Option<CacheEntry>>>,
}

impl InMemoryContentCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache pre-populated with `entry`.
    #[must_use]
    pub fn with_entry(entry: CacheEntry) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(entry))),
        }
    }

    /// Returns a copy of the stored entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Store`] when the mutex is poisoned.
    pub fn entry(&self) -> Result<Option<CacheEntry>, CacheError> {
        let guard = self
            .slot
            .lock()
            .map_err(|_| CacheError::Store("content cache mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl ContentCache for InMemoryContentCache {
    async fn get(
        &self,
        descriptor: &CacheDescriptor,
    ) -> Result<Option<ContentDocument>, CacheError> {
        let guard = self
            .slot
            .lock()
            .map_err(|_| CacheError::Store("content cache mutex poisoned".to_string()))?;
        Ok(guard
            .as_ref()
            .filter(|entry| entry.locale == descriptor.locale)
            .map(|entry| entry.document.clone()))
    }

    async fn set(
        &self,
        descriptor: &CacheDescriptor,
        document: &ContentDocument,
    ) -> Result<(), CacheError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| CacheError::Store("content cache mutex poisoned".to_string()))?;
        *guard = Some(CacheEntry {
            locale: descriptor.locale.clone(),
            document: document.clone(),
        });
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.slot
            .lock()
            .map_err(|_| CacheError::Store("content cache mutex poisoned".to_string()))?
            .take();
        Ok(())
    }

    async fn cached_locale(&self) -> Result<Option<LocaleCode>, CacheError> {
        let guard = self
            .slot
            .lock()
            .map_err(|_| CacheError::Store("content cache mutex poisoned".to_string()))?;
        Ok(guard.as_ref().map(|entry| entry.locale.clone()))
    }
}

// ============================================================================
// SECTION: In-Memory Preference Store
// ============================================================================

/// In-memory preferred-locale store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPreferenceStore {
    /// Stored locale string protected by a mutex.
    locale: Arc<Mutex<Option<String>>>,
}

impl InMemoryPreferenceStore {
    /// Creates an empty preference store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `locale` verbatim.
    #[must_use]
    pub fn with_locale(locale: impl Into<String>) -> Self {
        Self {
            locale: Arc::new(Mutex::new(Some(locale.into()))),
        }
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn load_locale(&self) -> Result<Option<String>, PreferenceError> {
        let guard = self
            .locale
            .lock()
            .map_err(|_| PreferenceError::Store("preference store mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }

    async fn save_locale(&self, locale: &LocaleCode) -> Result<(), PreferenceError> {
        *self
            .locale
            .lock()
            .map_err(|_| PreferenceError::Store("preference store mutex poisoned".to_string()))? =
            Some(locale.as_str().to_string());
        Ok(())
    }
}
