// crates/captions-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Caption Store
// Description: Single-slot content cache and preference store on SQLite.
// Purpose: Persist one locale's document and the preferred locale durably.
// Dependencies: captions-core, rusqlite, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`SqliteCaptionStore`] keeps at most one cached document in the
//! `content_cache` table under the fixed slot `current`, tagged with the locale
//! it belongs to. Writing a different locale clears the slot and writes the new
//! document inside one transaction, so concurrent switches never leave a mixed
//! slot behind. Reads return nothing when the stored marker differs from the
//! requested locale. Stored data is untrusted: markers and documents are
//! re-validated on load and fail closed as corruption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use captions_core::CacheDescriptor;
use captions_core::CacheEntry;
use captions_core::CacheError;
use captions_core::ContentCache;
use captions_core::ContentDocument;
use captions_core::LocaleCode;
use captions_core::PreferenceError;
use captions_core::PreferenceStore;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Key of the single cache slot.
const CACHE_SLOT: &str = "current";
/// Preference name holding the preferred locale.
const LOCALE_PREFERENCE: &str = "locale";
/// Hard upper bound for cached document size.
pub const MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;
/// Default cached document size limit.
const DEFAULT_MAX_DOCUMENT_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode.
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` caption store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
/// - `max_document_bytes` is greater than zero and at most [`MAX_DOCUMENT_BYTES`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Maximum encoded size of a cached document.
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
}

impl SqliteStoreConfig {
    /// Creates a configuration for `path` with default settings.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Invalid`] when the path or limits are invalid.
    pub fn validate(&self) -> Result<(), SqliteStoreError> {
        validate_store_path(&self.path)?;
        if self.max_document_bytes == 0 || self.max_document_bytes > MAX_DOCUMENT_BYTES {
            return Err(SqliteStoreError::Invalid(format!(
                "max_document_bytes out of range: {} (max {MAX_DOCUMENT_BYTES})",
                self.max_document_bytes
            )));
        }
        Ok(())
    }
}

/// Returns the default busy timeout in milliseconds.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default cached document size limit.
const fn default_max_document_bytes() -> usize {
    DEFAULT_MAX_DOCUMENT_BYTES
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw document payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored data failed validation.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store configuration or input.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Document exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for CacheError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "document_json exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

impl From<SqliteStoreError> for PreferenceError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Corrupt(message) | SqliteStoreError::Invalid(message) => {
                Self::Invalid(message)
            }
            other @ (SqliteStoreError::Db(_)
            | SqliteStoreError::VersionMismatch(_)
            | SqliteStoreError::TooLarge {
                ..
            }) => Self::Store(other.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed content cache and preference store.
///
/// # Invariants
/// - At most one row exists in `content_cache`, under slot `current`.
/// - Clones share one connection.
#[derive(Clone)]
pub struct SqliteCaptionStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteCaptionStore {
    /// Opens (or creates) the store at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is invalid, the database
    /// cannot be opened, or the schema version is unsupported.
    pub fn open(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        config.validate()?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        debug!(path = %config.path.display(), "sqlite caption store opened");
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Loads the cached entry regardless of locale.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the read fails or stored data is corrupt.
    pub fn load_entry(&self) -> Result<Option<CacheEntry>, SqliteStoreError> {
        let Some((raw_locale, bytes)) = self.load_row()? else {
            return Ok(None);
        };
        let locale = parse_marker(&raw_locale)?;
        let document = self.decode_document(&bytes)?;
        Ok(Some(CacheEntry {
            locale,
            document,
        }))
    }

    /// Loads the cached document when its marker equals `locale`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the read fails or stored data is corrupt.
    pub fn load_document(
        &self,
        locale: &LocaleCode,
    ) -> Result<Option<ContentDocument>, SqliteStoreError> {
        let Some((raw_locale, bytes)) = self.load_row()? else {
            return Ok(None);
        };
        let stored = parse_marker(&raw_locale)?;
        if stored != *locale {
            debug!(requested = %locale, stored = %stored, "cache marker mismatch");
            return Ok(None);
        }
        self.decode_document(&bytes).map(Some)
    }

    /// Loads the locale marker of the cached entry.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the read fails or the marker is corrupt.
    pub fn load_marker(&self) -> Result<Option<LocaleCode>, SqliteStoreError> {
        let guard = self.lock()?;
        let raw: Option<String> = guard
            .query_row(
                "SELECT locale FROM content_cache WHERE slot = ?1",
                params![CACHE_SLOT],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        raw.as_deref().map(parse_marker).transpose()
    }

    /// Stores `document` for `locale`, clearing any other locale first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when encoding or the write fails.
    pub fn store_document(
        &self,
        locale: &LocaleCode,
        document: &ContentDocument,
    ) -> Result<(), SqliteStoreError> {
        let bytes =
            document.to_json_vec().map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        if bytes.len() > self.config.max_document_bytes {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: self.config.max_document_bytes,
                actual_bytes: bytes.len(),
            });
        }
        let stored_at = unix_seconds()?;
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let previous: Option<String> = tx
            .query_row(
                "SELECT locale FROM content_cache WHERE slot = ?1",
                params![CACHE_SLOT],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        if let Some(previous) = previous.filter(|previous| previous != locale.as_str()) {
            debug!(previous = %previous, locale = %locale, "evicting cached locale");
            tx.execute("DELETE FROM content_cache", params![])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        tx.execute(
            "INSERT INTO content_cache (slot, locale, document_json, stored_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(slot) DO UPDATE SET
                locale = excluded.locale,
                document_json = excluded.document_json,
                stored_at = excluded.stored_at",
            params![CACHE_SLOT, locale.as_str(), bytes, stored_at],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Removes any cached document.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn clear_documents(&self) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .execute("DELETE FROM content_cache", params![])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Loads a named preference value.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the read fails.
    pub fn load_preference(&self, name: &str) -> Result<Option<String>, SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .query_row("SELECT value FROM preferences WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))
    }

    /// Saves a named preference value.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn save_preference(&self, name: &str, value: &str) -> Result<(), SqliteStoreError> {
        let updated_at = unix_seconds()?;
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO preferences (name, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at",
                params![name, value, updated_at],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Reads the raw cache row.
    fn load_row(&self) -> Result<Option<(String, Vec<u8>)>, SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT locale, document_json FROM content_cache WHERE slot = ?1",
                params![CACHE_SLOT],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))
    }

    /// Decodes a stored document, enforcing the size limit.
    fn decode_document(&self, bytes: &[u8]) -> Result<ContentDocument, SqliteStoreError> {
        if bytes.len() > self.config.max_document_bytes {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: self.config.max_document_bytes,
                actual_bytes: bytes.len(),
            });
        }
        ContentDocument::from_json_slice(bytes)
            .map_err(|err| SqliteStoreError::Corrupt(err.to_string()))
    }

    /// Acquires the connection.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("sqlite connection mutex poisoned".to_string()))
    }
}

#[async_trait]
impl ContentCache for SqliteCaptionStore {
    async fn get(
        &self,
        descriptor: &CacheDescriptor,
    ) -> Result<Option<ContentDocument>, CacheError> {
        Ok(self.load_document(&descriptor.locale)?)
    }

    async fn set(
        &self,
        descriptor: &CacheDescriptor,
        document: &ContentDocument,
    ) -> Result<(), CacheError> {
        Ok(self.store_document(&descriptor.locale, document)?)
    }

    async fn clear(&self) -> Result<(), CacheError> {
        Ok(self.clear_documents()?)
    }

    async fn cached_locale(&self) -> Result<Option<LocaleCode>, CacheError> {
        Ok(self.load_marker()?)
    }
}

#[async_trait]
impl PreferenceStore for SqliteCaptionStore {
    async fn load_locale(&self) -> Result<Option<String>, PreferenceError> {
        Ok(self.load_preference(LOCALE_PREFERENCE)?)
    }

    async fn save_locale(&self, locale: &LocaleCode) -> Result<(), PreferenceError> {
        Ok(self.save_preference(LOCALE_PREFERENCE, locale.as_str())?)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a stored locale marker.
fn parse_marker(raw: &str) -> Result<LocaleCode, SqliteStoreError> {
    LocaleCode::parse(raw).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))
}

/// Returns the current unix time in seconds.
fn unix_seconds() -> Result<i64, SqliteStoreError> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| SqliteStoreError::Io(err.to_string()))?;
    Ok(i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}

/// Ensures the parent directory exists for the store path.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS content_cache (
                    slot TEXT PRIMARY KEY CHECK (slot = 'current'),
                    locale TEXT NOT NULL,
                    document_json BLOB NOT NULL,
                    stored_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS preferences (
                    name TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(SCHEMA_VERSION) => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
