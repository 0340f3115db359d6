// crates/captions-config/src/config.rs
// ============================================================================
// Module: Captions Configuration
// Description: Configuration loading and validation for Captions.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: captions-core, captions-providers, captions-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicitly requested file (argument or environment) must exist; when the
//! default `captions.toml` is absent, built-in defaults apply. Invalid
//! configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use captions_core::ContainerConfig;
use captions_core::SectionName;
use captions_core::SupportedLocales;
use captions_core::runtime::DEFAULT_BASELINE_SECTIONS;
use captions_providers::DEFAULT_DOCUMENT_FILE;
use captions_providers::HttpSourceConfig;
use captions_providers::validate_document_file;
use captions_store_sqlite::SqliteStoreConfig;
use captions_store_sqlite::SqliteStoreMode;
use captions_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "captions.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CAPTIONS_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of supported locales.
pub(crate) const MAX_SUPPORTED_LOCALES: usize = 256;
/// Maximum number of baseline sections.
pub(crate) const MAX_BASELINE_SECTIONS: usize = 64;
/// Maximum length of a log filter directive string.
pub(crate) const MAX_LOG_FILTER_LENGTH: usize = 1024;
/// Default database file name.
const DEFAULT_STORE_PATH: &str = "captions.db";
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default cached document size limit.
const DEFAULT_MAX_DOCUMENT_BYTES: usize = 4 * 1024 * 1024;
/// Default log filter.
pub const DEFAULT_LOG_FILTER: &str = "warn";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Where the configuration path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Path passed explicitly by the caller.
    Explicit,
    /// Path read from [`CONFIG_ENV_VAR`].
    Environment,
    /// Default file name in the working directory.
    Default,
}

/// Root Captions configuration.
///
/// # Invariants
/// - At most one of `remote` and `directory` is set.
/// - `locales.supported` parses into a non-empty, duplicate-free set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptionsConfig {
    /// Remote HTTP content origin.
    #[serde(default)]
    pub remote: Option<HttpSourceConfig>,
    /// Local directory content origin.
    #[serde(default)]
    pub directory: Option<DirectoryConfig>,
    /// Supported locales and baseline sections.
    #[serde(default)]
    pub locales: LocalesConfig,
    /// Persistent cache and preference store.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Optional override for the bundled default-locale document.
    #[serde(default)]
    pub default_document: Option<PathBuf>,
}

impl CaptionsConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, origin) = resolve_path(path)?;
        Self::load_resolved(&resolved, origin)
    }

    /// Loads configuration from an already resolved path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_resolved(path: &Path, origin: ConfigOrigin) -> Result<Self, ConfigError> {
        validate_path(path)?;
        if origin == ConfigOrigin::Default && !path.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.is_some() && self.directory.is_some() {
            return Err(ConfigError::Invalid(
                "remote and directory content sources are mutually exclusive".to_string(),
            ));
        }
        if let Some(remote) = &self.remote {
            remote.validate().map_err(|err| ConfigError::Invalid(format!("remote: {err}")))?;
        }
        if let Some(directory) = &self.directory {
            directory.validate()?;
        }
        self.locales.validate()?;
        self.store.validate()?;
        self.logging.validate()?;
        if let Some(path) = &self.default_document {
            validate_path_string("default_document", &path.to_string_lossy())?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Content Sources
// ============================================================================

/// Local directory content origin (`[directory]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Root directory holding one subdirectory per locale.
    pub root: PathBuf,
    /// Document file name.
    #[serde(default = "default_document_file")]
    pub document_file: String,
}

impl DirectoryConfig {
    /// Validates directory settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("directory.root", &self.root.to_string_lossy())?;
        validate_document_file(&self.document_file)
            .map_err(|err| ConfigError::Invalid(format!("directory: {err}")))
    }
}

/// Returns the default document file name.
fn default_document_file() -> String {
    DEFAULT_DOCUMENT_FILE.to_string()
}

// ============================================================================
// SECTION: Locales
// ============================================================================

/// Supported locales and baseline sections (`[locales]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalesConfig {
    /// Supported locale codes; the first is the default.
    #[serde(default = "default_supported_locales")]
    pub supported: Vec<String>,
    /// Sections kept on every activation.
    #[serde(default = "default_baseline_sections")]
    pub baseline_sections: Vec<String>,
}

impl Default for LocalesConfig {
    fn default() -> Self {
        Self {
            supported: default_supported_locales(),
            baseline_sections: default_baseline_sections(),
        }
    }
}

impl LocalesConfig {
    /// Parses the supported locale set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the set is empty, duplicated, or
    /// contains invalid codes.
    pub fn supported_locales(&self) -> Result<SupportedLocales, ConfigError> {
        SupportedLocales::parse(&self.supported)
            .map_err(|err| ConfigError::Invalid(format!("locales.supported: {err}")))
    }

    /// Parses the baseline sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a section name is invalid.
    pub fn baseline(&self) -> Result<Vec<SectionName>, ConfigError> {
        self.baseline_sections
            .iter()
            .map(|name| {
                SectionName::parse(name).map_err(|err| {
                    ConfigError::Invalid(format!("locales.baseline_sections: {err}"))
                })
            })
            .collect()
    }

    /// Builds the container configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when locales or sections are invalid.
    pub fn container_config(&self) -> Result<ContainerConfig, ConfigError> {
        Ok(ContainerConfig::new(self.supported_locales()?).with_baseline_sections(self.baseline()?))
    }

    /// Validates locale settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.supported.len() > MAX_SUPPORTED_LOCALES {
            return Err(ConfigError::Invalid("too many supported locales".to_string()));
        }
        if self.baseline_sections.len() > MAX_BASELINE_SECTIONS {
            return Err(ConfigError::Invalid("too many baseline sections".to_string()));
        }
        let sections = self.baseline()?;
        for (index, section) in sections.iter().enumerate() {
            if sections[.. index].contains(section) {
                return Err(ConfigError::Invalid(format!(
                    "locales.baseline_sections: duplicate section {section}"
                )));
            }
        }
        self.supported_locales().map(|_| ())
    }
}

/// Returns the default supported locales.
fn default_supported_locales() -> Vec<String> {
    vec!["en".to_string()]
}

/// Returns the default baseline sections.
fn default_baseline_sections() -> Vec<String> {
    DEFAULT_BASELINE_SECTIONS.iter().map(|name| (*name).to_string()).collect()
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Persistent cache and preference store (`[store]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// `SQLite` database path.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Maximum cached document size in bytes.
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            max_document_bytes: default_max_document_bytes(),
        }
    }
}

impl StoreConfig {
    /// Builds the `SQLite` store configuration.
    #[must_use]
    pub fn to_sqlite_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
            max_document_bytes: self.max_document_bytes,
        }
    }

    /// Validates store settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("store.path", &self.path.to_string_lossy())?;
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store.busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        self.to_sqlite_config()
            .validate()
            .map_err(|err| ConfigError::Invalid(format!("store: {err}")))
    }
}

/// Returns the default store path.
fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

/// Returns the default busy timeout in milliseconds.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default cached document size limit.
const fn default_max_document_bytes() -> usize {
    DEFAULT_MAX_DOCUMENT_BYTES
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging settings (`[logging]`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directives used when `RUST_LOG` is unset.
    #[serde(default)]
    pub filter: Option<String>,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Returns the configured filter or the default.
    #[must_use]
    pub fn filter_or_default(&self) -> &str {
        self.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Validates logging settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(filter) = &self.filter {
            if filter.trim().is_empty() {
                return Err(ConfigError::Invalid("logging.filter must be non-empty".to_string()));
            }
            if filter.len() > MAX_LOG_FILTER_LENGTH {
                return Err(ConfigError::Invalid("logging.filter exceeds max length".to_string()));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the environment path is too long.
pub fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, ConfigOrigin), ConfigError> {
    resolve_path_from(path, env::var(CONFIG_ENV_VAR).ok())
}

/// Resolves the config path from an explicit path and an environment value.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the environment path is too long.
pub fn resolve_path_from(
    path: Option<&Path>,
    env_path: Option<String>,
) -> Result<(PathBuf, ConfigOrigin), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), ConfigOrigin::Explicit));
    }
    if let Some(env_path) = env_path.filter(|value| !value.trim().is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), ConfigOrigin::Environment));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), ConfigOrigin::Default))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
