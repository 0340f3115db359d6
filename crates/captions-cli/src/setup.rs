// crates/captions-cli/src/setup.rs
// ============================================================================
// Module: CLI Runtime Setup
// Description: Builds a locale state container from a loaded configuration.
// Purpose: Wire the content origin, SQLite store, probe, and default document.
// Dependencies: captions-config, captions-core, captions-providers, captions-store-sqlite
// ============================================================================

//! ## Overview
//! Each CLI invocation assembles one [`LocaleStateContainer`]. The SQLite
//! store backs both the content cache and the preferred-locale record, so a
//! locale activated by one invocation is the starting locale of the next.
//! The default-locale document is bundled into the binary unless the config
//! points at a replacement file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use captions_config::CaptionsConfig;
use captions_config::DirectoryConfig;
use captions_core::ContentDocument;
use captions_core::ContentSource;
use captions_core::LocaleCode;
use captions_core::LocaleStateContainer;
use captions_core::SourceError;
use captions_providers::DEFAULT_DOCUMENT_FILE;
use captions_providers::DirectoryContentSource;
use captions_providers::HttpContentSource;
use captions_providers::SystemLocaleProbe;
use captions_store_sqlite::SqliteCaptionStore;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default-locale document compiled into the binary.
pub const BUNDLED_DEFAULT_DOCUMENT: &[u8] = include_bytes!("../assets/en.json");
/// Size limit for a default document read from disk.
pub const MAX_DEFAULT_DOCUMENT_BYTES: usize = 4 * 1024 * 1024;
/// Label used when the bundled document is reported in errors.
const BUNDLED_LABEL: &str = "<bundled>";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while assembling the runtime.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Locale settings could not be turned into a container configuration.
    #[error("invalid locale settings: {0}")]
    Locales(String),
    /// The content origin could not be constructed.
    #[error("invalid content source: {0}")]
    Source(String),
    /// Several locales are supported but no origin is configured.
    #[error("no content origin is configured")]
    NoSource,
    /// The SQLite store failed to open.
    #[error("failed to open content store at {path}: {error}")]
    Store {
        /// Store path.
        path: PathBuf,
        /// Store error message.
        error: String,
    },
    /// The default document could not be read.
    #[error("failed to read default document at {path}: {error}")]
    DefaultsRead {
        /// Document path.
        path: String,
        /// I/O error message.
        error: String,
    },
    /// The default document exceeds the size limit.
    #[error("default document at {path} is {size} bytes (limit {limit})")]
    DefaultsTooLarge {
        /// Document path.
        path: String,
        /// Observed size in bytes.
        size: u64,
        /// Allowed size in bytes.
        limit: usize,
    },
    /// The default document is not a content document.
    #[error("failed to parse default document {path}: {error}")]
    DefaultsParse {
        /// Document path.
        path: String,
        /// Decoder message.
        error: String,
    },
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Invocation-level overrides layered over the config file.
#[derive(Debug, Clone, Default)]
pub struct SetupOptions {
    /// Directory origin that replaces any configured origin.
    pub content_dir: Option<PathBuf>,
    /// Skip device language detection during initialization.
    pub skip_device_probe: bool,
}

// ============================================================================
// SECTION: Assembly
// ============================================================================

/// Builds a container for `config`.
///
/// # Errors
///
/// Returns [`SetupError`] when any collaborator cannot be constructed.
pub fn build_container(
    config: &CaptionsConfig,
    options: &SetupOptions,
) -> Result<LocaleStateContainer, SetupError> {
    let container_config =
        config.locales.container_config().map_err(|err| SetupError::Locales(err.to_string()))?;
    let source = select_source(config, options, container_config.supported.len())?;
    let store_config = config.store.to_sqlite_config();
    let store = SqliteCaptionStore::open(store_config.clone()).map_err(|err| {
        SetupError::Store {
            path: store_config.path,
            error: err.to_string(),
        }
    })?;
    let defaults = load_default_document(config.default_document.as_deref())?;
    let container = LocaleStateContainer::new(
        container_config,
        source,
        Arc::new(store.clone()),
        Arc::new(store),
        defaults,
    );
    if options.skip_device_probe {
        return Ok(container);
    }
    Ok(container.with_probe(Arc::new(SystemLocaleProbe::new())))
}

/// Chooses the content origin.
///
/// Precedence: the `--content-dir` override, then `[remote]`, then
/// `[directory]`. Without any origin only a single supported locale is
/// allowed, since the default locale never fetches.
///
/// # Errors
///
/// Returns [`SetupError`] when the origin is invalid or missing.
pub fn select_source(
    config: &CaptionsConfig,
    options: &SetupOptions,
    supported_count: usize,
) -> Result<Arc<dyn ContentSource>, SetupError> {
    if let Some(dir) = &options.content_dir {
        let document_file = config
            .directory
            .as_ref()
            .map_or(DEFAULT_DOCUMENT_FILE, |directory| directory.document_file.as_str());
        let source = DirectoryContentSource::new(dir.clone())
            .with_document_file(document_file)
            .map_err(|err| SetupError::Source(err.to_string()))?;
        return Ok(Arc::new(source));
    }
    if let Some(remote) = &config.remote {
        let source = HttpContentSource::new(remote.clone())
            .map_err(|err| SetupError::Source(err.to_string()))?;
        return Ok(Arc::new(source));
    }
    if let Some(directory) = &config.directory {
        return directory_source(directory).map(|source| Arc::new(source) as Arc<dyn ContentSource>);
    }
    if supported_count > 1 {
        return Err(SetupError::NoSource);
    }
    Ok(Arc::new(UnconfiguredSource))
}

/// Builds a directory source from `[directory]`.
fn directory_source(directory: &DirectoryConfig) -> Result<DirectoryContentSource, SetupError> {
    DirectoryContentSource::new(directory.root.clone())
        .with_document_file(directory.document_file.as_str())
        .map_err(|err| SetupError::Source(err.to_string()))
}

// ============================================================================
// SECTION: Default Document
// ============================================================================

/// Loads the default-locale document from `path` or the bundled asset.
///
/// # Errors
///
/// Returns [`SetupError`] when the file cannot be read or decoded.
pub fn load_default_document(path: Option<&Path>) -> Result<ContentDocument, SetupError> {
    let Some(path) = path else {
        return ContentDocument::from_json_slice(BUNDLED_DEFAULT_DOCUMENT).map_err(|err| {
            SetupError::DefaultsParse {
                path: BUNDLED_LABEL.to_string(),
                error: err.to_string(),
            }
        });
    };
    let label = path.display().to_string();
    let bytes = read_bytes_with_limit(path, MAX_DEFAULT_DOCUMENT_BYTES, &label)?;
    ContentDocument::from_json_slice(&bytes).map_err(|err| SetupError::DefaultsParse {
        path: label,
        error: err.to_string(),
    })
}

/// Reads a file while enforcing a hard size limit.
fn read_bytes_with_limit(
    path: &Path,
    max_bytes: usize,
    label: &str,
) -> Result<Vec<u8>, SetupError> {
    let read_error = |err: std::io::Error| SetupError::DefaultsRead {
        path: label.to_string(),
        error: err.to_string(),
    };
    let file = File::open(path).map_err(read_error)?;
    let size = file.metadata().map_err(read_error)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(SetupError::DefaultsTooLarge {
            path: label.to_string(),
            size,
            limit: max_bytes,
        });
    }
    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(read_error)?;
    if bytes.len() > max_bytes {
        return Err(SetupError::DefaultsTooLarge {
            path: label.to_string(),
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Unconfigured Source
// ============================================================================

/// Origin used when only the default locale is supported.
///
/// The loader never fetches the default locale, so this is reached only if
/// that invariant is broken; it fails every fetch.
struct UnconfiguredSource;

#[async_trait]
impl ContentSource for UnconfiguredSource {
    async fn fetch(&self, locale: &LocaleCode) -> Result<Vec<u8>, SourceError> {
        Err(SourceError::Invalid(format!("no content origin configured for locale {locale}")))
    }
}
