// crates/captions-providers/src/directory.rs
// ============================================================================
// Module: Directory Content Source
// Description: Content source reading per-locale documents from disk.
// Purpose: Serve content offline with the same layout as the HTTP origin.
// Dependencies: captions-core, tokio, tracing
// ============================================================================

//! ## Overview
//! [`DirectoryContentSource`] reads `{root}/{locale}/{document_file}`. The
//! resolved path must stay inside the canonical root, so symlinks cannot
//! escape it. Reads are capped at `max_bytes`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use captions_core::ContentSource;
use captions_core::LocaleCode;
use captions_core::SourceError;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::http::DEFAULT_DOCUMENT_FILE;
use crate::http::MAX_RESPONSE_BYTES;
use crate::http::validate_document_file;

// ============================================================================
// SECTION: Directory Source
// ============================================================================

/// File-backed content source rooted at a directory.
#[derive(Debug, Clone)]
pub struct DirectoryContentSource {
    /// Root directory holding one subdirectory per locale.
    root: PathBuf,
    /// Document file name inside each locale directory.
    document_file: String,
    /// Maximum document size in bytes.
    max_bytes: usize,
}

impl DirectoryContentSource {
    /// Creates a source rooted at `root` using the default document file.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            document_file: DEFAULT_DOCUMENT_FILE.to_string(),
            max_bytes: MAX_RESPONSE_BYTES,
        }
    }

    /// Overrides the document file name.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Invalid`] when the name is not a single segment.
    pub fn with_document_file(
        mut self,
        document_file: impl Into<String>,
    ) -> Result<Self, SourceError> {
        let document_file = document_file.into();
        validate_document_file(&document_file)?;
        self.document_file = document_file;
        Ok(self)
    }

    /// Overrides the maximum document size.
    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves the document path for `locale` and checks it stays under root.
    async fn resolve_path(&self, locale: &LocaleCode) -> Result<PathBuf, SourceError> {
        let root = tokio::fs::canonicalize(&self.root)
            .await
            .map_err(|err| SourceError::Io(err.to_string()))?;
        let candidate = root.join(locale.as_str()).join(&self.document_file);
        let resolved = tokio::fs::canonicalize(&candidate).await.map_err(map_io_error)?;
        if !resolved.starts_with(&root) {
            return Err(SourceError::Invalid("document path escapes configured root".to_string()));
        }
        Ok(resolved)
    }

    /// Reads a file while enforcing the size limit.
    async fn read_with_limit(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        let file = tokio::fs::File::open(path).await.map_err(map_io_error)?;
        let limit = u64::try_from(self.max_bytes).unwrap_or(u64::MAX).saturating_add(1);
        let mut limited = file.take(limit);
        let mut bytes = Vec::new();
        limited.read_to_end(&mut bytes).await.map_err(|err| SourceError::Io(err.to_string()))?;
        if bytes.len() > self.max_bytes {
            return Err(SourceError::TooLarge {
                max_bytes: self.max_bytes,
                actual_bytes: bytes.len(),
            });
        }
        Ok(bytes)
    }
}

#[async_trait]
impl ContentSource for DirectoryContentSource {
    async fn fetch(&self, locale: &LocaleCode) -> Result<Vec<u8>, SourceError> {
        let path = self.resolve_path(locale).await?;
        debug!(locale = %locale, path = %path.display(), "reading content document");
        self.read_with_limit(&path).await
    }
}

/// Maps file errors, separating missing documents from other failures.
fn map_io_error(err: std::io::Error) -> SourceError {
    if err.kind() == ErrorKind::NotFound {
        SourceError::NotFound(err.to_string())
    } else {
        SourceError::Io(err.to_string())
    }
}
