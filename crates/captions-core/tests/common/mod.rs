// crates/captions-core/tests/common/mod.rs
// ============================================================================
// Module: Captions Core Test Support
// Description: Scripted collaborators shared by core integration tests.
// Purpose: Count fetches, inject failures, and gate fetches for race tests.
// Dependencies: captions-core, tokio
// ============================================================================

//! ## Overview
//! Test doubles for [`ContentSource`], [`ContentCache`], [`PreferenceStore`],
//! and [`LocaleProbe`].

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers.")]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use captions_core::CacheDescriptor;
use captions_core::CacheError;
use captions_core::ContentCache;
use captions_core::ContentDocument;
use captions_core::ContentSource;
use captions_core::LocaleCode;
use captions_core::LocaleProbe;
use captions_core::PreferenceError;
use captions_core::PreferenceStore;
use captions_core::ProbeError;
use captions_core::SourceError;
use tokio::sync::Notify;

// ============================================================================
// SECTION: Documents
// ============================================================================

/// Spanish document used across tests.
pub const ES_DOCUMENT: &str = r#"{
    "common": {"save": "Guardar", "greeting": "Hola, {name}!"},
    "error": {"generic": "Algo salió mal"},
    "footer": {"copyright": "Todos los derechos reservados"},
    "dashboard": {"title": "Panel"},
    "settings": {"title": "Ajustes"}
}"#;

/// French document used across tests.
pub const FR_DOCUMENT: &str = r#"{
    "common": {"save": "Enregistrer"},
    "dashboard": {"title": "Tableau de bord"}
}"#;

/// Bundled English defaults used across tests.
pub const EN_DEFAULTS: &str = r#"{
    "common": {"save": "Save", "cancel": "Cancel"},
    "home": {"welcome": "Welcome back, {name}!"}
}"#;

pub fn locale(code: &str) -> LocaleCode {
    LocaleCode::parse(code).unwrap()
}

pub fn document(json: &str) -> ContentDocument {
    ContentDocument::from_json_slice(json.as_bytes()).unwrap()
}

// ============================================================================
// SECTION: Content Source
// ============================================================================

/// Scripted response for one locale.
#[derive(Clone)]
pub enum Scripted {
    Body(Vec<u8>),
    Status(u16),
}

/// Source answering from a script and counting fetches per locale.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<BTreeMap<String, Scripted>>,
    fetches: Mutex<BTreeMap<String, usize>>,
    gates: Mutex<BTreeMap<String, Arc<Notify>>>,
    total: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, locale: &str, body: &str) -> Self {
        self.respond(locale, Scripted::Body(body.as_bytes().to_vec()));
        self
    }

    pub fn with_status(self, locale: &str, status: u16) -> Self {
        self.respond(locale, Scripted::Status(status));
        self
    }

    pub fn respond(&self, locale: &str, response: Scripted) {
        self.responses.lock().unwrap().insert(locale.to_string(), response);
    }

    /// Holds fetches for `locale` until the returned notifier fires.
    pub fn gate(&self, locale: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(locale.to_string(), Arc::clone(&notify));
        notify
    }

    pub fn fetch_count(&self, locale: &str) -> usize {
        self.fetches.lock().unwrap().get(locale).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for ScriptedSource {
    async fn fetch(&self, locale: &LocaleCode) -> Result<Vec<u8>, SourceError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.fetches.lock().unwrap().entry(locale.to_string()).or_insert(0) += 1;
        let gate = self.gates.lock().unwrap().get(locale.as_str()).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let response = self.responses.lock().unwrap().get(locale.as_str()).cloned();
        match response {
            Some(Scripted::Body(bytes)) => Ok(bytes),
            Some(Scripted::Status(status)) => Err(SourceError::Status {
                status,
                locale: locale.to_string(),
            }),
            None => Err(SourceError::Network("connection refused".to_string())),
        }
    }
}

// ============================================================================
// SECTION: Failing Collaborators
// ============================================================================

/// Cache whose backend always fails.
pub struct BrokenCache;

#[async_trait]
impl ContentCache for BrokenCache {
    async fn get(
        &self,
        _descriptor: &CacheDescriptor,
    ) -> Result<Option<ContentDocument>, CacheError> {
        Err(CacheError::Io("disk unavailable".to_string()))
    }

    async fn set(
        &self,
        _descriptor: &CacheDescriptor,
        _document: &ContentDocument,
    ) -> Result<(), CacheError> {
        Err(CacheError::Io("disk unavailable".to_string()))
    }

    async fn clear(&self) -> Result<(), CacheError> {
        Err(CacheError::Io("disk unavailable".to_string()))
    }

    async fn cached_locale(&self) -> Result<Option<LocaleCode>, CacheError> {
        Err(CacheError::Io("disk unavailable".to_string()))
    }
}

/// Preference store whose backend always fails.
pub struct BrokenPreferences;

#[async_trait]
impl PreferenceStore for BrokenPreferences {
    async fn load_locale(&self) -> Result<Option<String>, PreferenceError> {
        Err(PreferenceError::Io("disk unavailable".to_string()))
    }

    async fn save_locale(&self, _locale: &LocaleCode) -> Result<(), PreferenceError> {
        Err(PreferenceError::Io("disk unavailable".to_string()))
    }
}

/// Probe reporting a fixed answer.
pub struct FixedProbe(pub Option<&'static str>);

impl LocaleProbe for FixedProbe {
    fn detect(&self) -> Result<LocaleCode, ProbeError> {
        let raw = self.0.ok_or(ProbeError::Unavailable)?;
        LocaleCode::parse(raw).map_err(|_| ProbeError::Unsupported(raw.to_string()))
    }
}
