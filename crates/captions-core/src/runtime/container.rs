// crates/captions-core/src/runtime/container.rs
// ============================================================================
// Module: Captions Locale State Container
// Description: Owned locale state with activation, lazy sections, and init.
// Purpose: Decide which sections to keep from each load and publish snapshots.
// Dependencies: tracing, crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! [`LocaleStateContainer`] owns the active locale and the loaded content tree.
//! [`LocaleStateContainer::activate`] replaces the loaded content with the
//! baseline sections plus one requested section; [`LocaleStateContainer::load_section`]
//! merges one more section in. Resolvers are built from immutable snapshots, so
//! lookups never observe a half-applied load.
//!
//! ## Invariants
//! - State is guarded by a lock that is never held across an `.await`.
//! - Every activation takes a monotonically increasing token; only the most
//!   recently issued activation may publish its result.
//! - Section loads started before a newer activation are discarded.
//! - `busy` is true while any load is in flight, including failed ones.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::core::ActivationReport;
use crate::core::ContentDocument;
use crate::core::InitSource;
use crate::core::InitStatus;
use crate::core::LoaderDiagnostics;
use crate::core::LocaleCode;
use crate::core::LocaleState;
use crate::core::SectionLoad;
use crate::core::SectionName;
use crate::core::SupportedLocales;
use crate::interfaces::CacheError;
use crate::interfaces::ContentCache;
use crate::interfaces::ContentSource;
use crate::interfaces::LocaleProbe;
use crate::interfaces::PreferenceStore;
use crate::runtime::loader::ContentLoader;
use crate::runtime::resolver::CaptionResolver;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sections kept on every activation unless configured otherwise.
pub const DEFAULT_BASELINE_SECTIONS: [&str; 3] = ["common", "error", "footer"];

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Locale state container configuration.
///
/// # Invariants
/// - `supported` is non-empty; its first entry is the default locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Supported locales; the first is the default.
    pub supported: SupportedLocales,
    /// Sections retained on every activation.
    pub baseline_sections: Vec<SectionName>,
}

impl ContainerConfig {
    /// Creates a configuration with the default baseline sections.
    #[must_use]
    pub fn new(supported: SupportedLocales) -> Self {
        Self {
            supported,
            baseline_sections: default_baseline_sections(),
        }
    }

    /// Replaces the baseline sections.
    #[must_use]
    pub fn with_baseline_sections(mut self, sections: Vec<SectionName>) -> Self {
        self.baseline_sections = sections;
        self
    }
}

/// Returns the default baseline sections (`common`, `error`, `footer`).
#[must_use]
pub fn default_baseline_sections() -> Vec<SectionName> {
    DEFAULT_BASELINE_SECTIONS.iter().filter_map(|name| SectionName::parse(name).ok()).collect()
}

// ============================================================================
// SECTION: Busy Tracking
// ============================================================================

/// Marks a load as in flight for the guard's lifetime.
struct BusyGuard<'a> {
    /// Shared in-flight counter.
    in_flight: &'a AtomicUsize,
}

impl<'a> BusyGuard<'a> {
    /// Increments the in-flight counter.
    fn enter(in_flight: &'a AtomicUsize) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self {
            in_flight,
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

// ============================================================================
// SECTION: Container
// ============================================================================

/// Mutable container state.
struct ContainerState {
    /// Locale whose content is loaded.
    active_locale: LocaleCode,
    /// Loaded sections, shared with resolvers.
    loaded_content: Arc<ContentDocument>,
    /// Outcome of the most recent `initialize`.
    init_status: InitStatus,
}

/// Owns the locale state and mediates every load.
pub struct LocaleStateContainer {
    /// Container configuration.
    config: ContainerConfig,
    /// Cache-first content loader.
    loader: ContentLoader,
    /// Preferred-locale persistence.
    preferences: Arc<dyn PreferenceStore>,
    /// Optional device language probe.
    probe: Option<Arc<dyn LocaleProbe>>,
    /// Bundled default-locale document.
    defaults: Arc<ContentDocument>,
    /// Guarded state.
    state: RwLock<ContainerState>,
    /// Number of loads in flight.
    in_flight: AtomicUsize,
    /// Token of the most recently issued activation.
    latest_activation: AtomicU64,
}

impl LocaleStateContainer {
    /// Creates a container on the default locale with no loaded content.
    #[must_use]
    pub fn new(
        config: ContainerConfig,
        source: Arc<dyn ContentSource>,
        cache: Arc<dyn ContentCache>,
        preferences: Arc<dyn PreferenceStore>,
        defaults: ContentDocument,
    ) -> Self {
        let default_locale = config.supported.default_locale().clone();
        let loader = ContentLoader::new(source, cache, default_locale.clone());
        Self {
            config,
            loader,
            preferences,
            probe: None,
            defaults: Arc::new(defaults),
            state: RwLock::new(ContainerState {
                active_locale: default_locale,
                loaded_content: Arc::new(ContentDocument::new()),
                init_status: InitStatus::Pending,
            }),
            in_flight: AtomicUsize::new(0),
            latest_activation: AtomicU64::new(0),
        }
    }

    /// Attaches a device language probe consulted by [`Self::initialize`].
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn LocaleProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Chooses the starting locale and activates it. Never fails.
    ///
    /// Order: persisted preference, detected device locale, default locale.
    /// Candidates outside the supported set are skipped. Calling this again
    /// after [`InitStatus::Failed`] retries the load.
    pub async fn initialize(&self) -> InitStatus {
        let (locale, source) = self.starting_locale().await;
        let report = self.activate(&locale, None).await;
        let status = match report.origin.failure() {
            Some(failure) => InitStatus::Failed {
                locale: report.locale,
                source,
                failure,
            },
            None => InitStatus::Ready {
                locale: report.locale,
                source,
            },
        };
        info!(
            locale = %locale,
            source = %source,
            origin = %report.origin,
            "locale state initialized"
        );
        self.write_state().init_status = status.clone();
        status
    }

    /// Activates `locale`, keeping the baseline sections plus `section`.
    ///
    /// Unsupported locales fall back to the default locale. Loaded content is
    /// replaced, not merged. The locale is persisted as the user preference
    /// unless a newer activation superseded this one.
    pub async fn activate(
        &self,
        locale: &LocaleCode,
        section: Option<&SectionName>,
    ) -> ActivationReport {
        let token = self.latest_activation.fetch_add(1, Ordering::SeqCst) + 1;
        let _busy = BusyGuard::enter(&self.in_flight);
        let target = self.coerce(locale);
        let loaded = self.loader.load_with_outcome(&target).await;

        let mut required: Vec<&str> =
            self.config.baseline_sections.iter().map(SectionName::as_str).collect();
        if let Some(section) = section {
            required.push(section.as_str());
        }
        let retained = loaded.document.retain_sections(required);
        let sections: Vec<String> = retained.section_names().map(str::to_string).collect();

        let applied = {
            let mut state = self.write_state();
            if self.latest_activation.load(Ordering::SeqCst) == token {
                state.active_locale = target.clone();
                state.loaded_content = Arc::new(retained);
                true
            } else {
                false
            }
        };
        if !applied {
            debug!(locale = %target, token, "activation superseded; result discarded");
            return ActivationReport {
                requested: locale.clone(),
                locale: target,
                origin: loaded.origin,
                sections,
                superseded: true,
                preference_saved: false,
            };
        }

        let preference_saved = self.persist_preference(&target, token).await;
        debug!(locale = %target, origin = %loaded.origin, sections = ?sections, "locale activated");
        ActivationReport {
            requested: locale.clone(),
            locale: target,
            origin: loaded.origin,
            sections,
            superseded: false,
            preference_saved,
        }
    }

    /// Loads `section` for the active locale and merges it into the content.
    ///
    /// A no-op for the default locale: its content is bundled, so neither the
    /// cache nor the source is consulted.
    pub async fn load_section(&self, section: &SectionName) -> SectionLoad {
        let issued = self.latest_activation.load(Ordering::SeqCst);
        let locale = self.read_state().active_locale.clone();
        if self.config.supported.is_default(&locale) {
            return SectionLoad::Skipped;
        }
        let _busy = BusyGuard::enter(&self.in_flight);
        let loaded = self.loader.load_with_outcome(&locale).await;
        let Some(content) = loaded.document.section(section.as_str()) else {
            debug!(locale = %locale, section = %section, "section not present in document");
            return SectionLoad::Missing {
                origin: loaded.origin,
            };
        };

        let mut state = self.write_state();
        // An activation issued before this call may have landed meanwhile.
        if self.latest_activation.load(Ordering::SeqCst) != issued
            || state.active_locale != locale
        {
            debug!(locale = %locale, section = %section, "section load superseded");
            return SectionLoad::Superseded;
        }
        Arc::make_mut(&mut state.loaded_content).insert_section(section.as_str(), content.clone());
        SectionLoad::Merged {
            origin: loaded.origin,
        }
    }

    /// Returns true when `section` is present in the loaded content.
    #[must_use]
    pub fn is_section_loaded(&self, section: &str) -> bool {
        self.read_state().loaded_content.contains_section(section)
    }

    /// Clears the persistent content cache.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the cache backend fails.
    pub async fn clear_cache(&self) -> Result<(), CacheError> {
        self.loader.clear_cache().await.inspect_err(|err| {
            warn!(error = %err, "content cache clear failed");
        })
    }

    /// Returns the locale marker of the cached entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the cache backend fails.
    pub async fn cached_locale(&self) -> Result<Option<LocaleCode>, CacheError> {
        self.loader.cached_locale().await
    }

    /// Returns the active locale.
    #[must_use]
    pub fn active_locale(&self) -> LocaleCode {
        self.read_state().active_locale.clone()
    }

    /// Returns true while any load is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Returns the loaded section names in sorted order.
    #[must_use]
    pub fn loaded_sections(&self) -> Vec<String> {
        self.read_state().loaded_content.section_names().map(str::to_string).collect()
    }

    /// Returns a point-in-time snapshot of the locale state.
    #[must_use]
    pub fn snapshot(&self) -> LocaleState {
        let state = self.read_state();
        LocaleState {
            active_locale: state.active_locale.clone(),
            loaded_content: Arc::clone(&state.loaded_content),
            busy: self.is_busy(),
        }
    }

    /// Builds a resolver over the current content snapshot and the bundled
    /// defaults. Each resolver starts with zeroed statistics.
    #[must_use]
    pub fn resolver(&self) -> CaptionResolver {
        let content = Arc::clone(&self.read_state().loaded_content);
        CaptionResolver::new(content, Arc::clone(&self.defaults))
    }

    /// Returns the outcome of the most recent `initialize`.
    #[must_use]
    pub fn init_status(&self) -> InitStatus {
        self.read_state().init_status.clone()
    }

    /// Returns the loader counters.
    #[must_use]
    pub fn loader_diagnostics(&self) -> LoaderDiagnostics {
        self.loader.diagnostics()
    }

    /// Returns the supported locale set.
    #[must_use]
    pub const fn supported_locales(&self) -> &SupportedLocales {
        &self.config.supported
    }

    /// Returns the bundled default document.
    #[must_use]
    pub fn defaults(&self) -> &ContentDocument {
        &self.defaults
    }

    /// Maps `requested` onto the supported set, falling back to the default.
    fn coerce(&self, requested: &LocaleCode) -> LocaleCode {
        if let Some(matched) = self.config.supported.match_locale(requested) {
            return matched.clone();
        }
        let default_locale = self.config.supported.default_locale();
        warn!(
            requested = %requested,
            default = %default_locale,
            "unsupported locale requested; activating default"
        );
        default_locale.clone()
    }

    /// Picks the starting locale for `initialize`.
    async fn starting_locale(&self) -> (LocaleCode, InitSource) {
        match self.preferences.load_locale().await {
            Ok(Some(raw)) => match LocaleCode::parse(&raw) {
                Ok(code) => {
                    if let Some(matched) = self.config.supported.match_locale(&code) {
                        return (matched.clone(), InitSource::Preference);
                    }
                    debug!(preference = %code, "persisted locale is not supported; ignoring");
                }
                Err(err) => warn!(error = %err, "persisted locale is invalid; ignoring"),
            },
            Ok(None) => {}
            Err(err) => warn!(error = %err, "preference store unavailable; ignoring"),
        }
        if let Some(probe) = &self.probe {
            match probe.detect() {
                Ok(code) => {
                    if let Some(matched) = self.config.supported.match_locale(&code) {
                        return (matched.clone(), InitSource::Device);
                    }
                    debug!(device = %code, "device locale is not supported; ignoring");
                }
                Err(err) => warn!(error = %err, "device locale detection failed; ignoring"),
            }
        }
        (self.config.supported.default_locale().clone(), InitSource::Default)
    }

    /// Persists `locale` unless a newer activation was issued. Returns true
    /// when the store accepted the value.
    async fn persist_preference(&self, locale: &LocaleCode, token: u64) -> bool {
        if self.latest_activation.load(Ordering::SeqCst) != token {
            return false;
        }
        match self.preferences.save_locale(locale).await {
            Ok(()) => true,
            Err(err) => {
                warn!(locale = %locale, error = %err, "preferred locale not persisted");
                false
            }
        }
    }

    /// Acquires the state for reading, recovering from poisoning.
    fn read_state(&self) -> RwLockReadGuard<'_, ContainerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires the state for writing, recovering from poisoning.
    fn write_state(&self) -> RwLockWriteGuard<'_, ContainerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
