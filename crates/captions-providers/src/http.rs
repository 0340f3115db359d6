// crates/captions-providers/src/http.rs
// ============================================================================
// Module: HTTP Content Source
// Description: Content source fetching per-locale documents over HTTP.
// Purpose: Retrieve remote content with bounded time and response size.
// Dependencies: captions-core, reqwest, serde, tracing, url
// ============================================================================

//! ## Overview
//! [`HttpContentSource`] issues `GET {base_url}/{locale}/{document_file}` and
//! returns the raw body. Redirects are not followed, non-success statuses fail,
//! and bodies larger than `max_response_bytes` are rejected before they are
//! fully buffered. Every request carries a timeout so a hung origin cannot keep
//! a load in flight indefinitely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use captions_core::ContentSource;
use captions_core::LocaleCode;
use captions_core::SourceError;
use reqwest::Client;
use reqwest::Response;
use reqwest::StatusCode;
use reqwest::redirect::Policy;
use serde::Deserialize;
use tracing::debug;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default document file name appended to every request path.
pub const DEFAULT_DOCUMENT_FILE: &str = "en.json";
/// Default request timeout (ms).
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Upper bound for request timeouts (ms).
pub const MAX_TIMEOUT_MS: u64 = 120_000;
/// Default response size limit.
const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;
/// Upper bound for the response size limit.
pub const MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// Default user agent.
const DEFAULT_USER_AGENT: &str = "captions/0.1";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP content source.
///
/// # Invariants
/// - `base_url` is an absolute `https` URL (`http` only with `allow_http`).
/// - `document_file` is a single path segment.
/// - `timeout_ms` applies to the full request lifecycle.
/// - `max_response_bytes` is a hard upper bound on response bodies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSourceConfig {
    /// Base URL of the content origin.
    pub base_url: String,
    /// Document file requested under each locale directory.
    #[serde(default = "default_document_file")]
    pub document_file: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Allow cleartext HTTP (disabled by default).
    #[serde(default)]
    pub allow_http: bool,
}

impl HttpSourceConfig {
    /// Creates a configuration for `base_url` with default settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            document_file: default_document_file(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: default_user_agent(),
            allow_http: false,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Invalid`] when any field violates its invariant.
    pub fn validate(&self) -> Result<(), SourceError> {
        self.parse_base_url()?;
        validate_document_file(&self.document_file)?;
        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(SourceError::Invalid(format!(
                "timeout_ms must be between 1 and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES {
            return Err(SourceError::Invalid(format!(
                "max_response_bytes must be between 1 and {MAX_RESPONSE_BYTES}"
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(SourceError::Invalid("user_agent must be non-empty".to_string()));
        }
        Ok(())
    }

    /// Parses and checks the base URL.
    fn parse_base_url(&self) -> Result<Url, SourceError> {
        let url = Url::parse(&self.base_url)
            .map_err(|err| SourceError::Invalid(format!("invalid base_url: {err}")))?;
        match url.scheme() {
            "https" => {}
            "http" if self.allow_http => {}
            "http" => {
                return Err(SourceError::Invalid(
                    "base_url uses http but allow_http is false".to_string(),
                ));
            }
            scheme => {
                return Err(SourceError::Invalid(format!("unsupported base_url scheme: {scheme}")));
            }
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(SourceError::Invalid("base_url credentials are not allowed".to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(SourceError::Invalid(
                "base_url must not carry a query or fragment".to_string(),
            ));
        }
        Ok(url)
    }
}

/// Returns the default document file name.
fn default_document_file() -> String {
    DEFAULT_DOCUMENT_FILE.to_string()
}

/// Returns the default request timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Returns the default response size limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Returns the default user agent.
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Ensures a document file name is one plain path segment.
///
/// # Errors
///
/// Returns [`SourceError::Invalid`] when the name is empty, a dot entry, or
/// contains separators.
pub fn validate_document_file(name: &str) -> Result<(), SourceError> {
    if name.is_empty() {
        return Err(SourceError::Invalid("document_file must be non-empty".to_string()));
    }
    if name == "." || name == ".." {
        return Err(SourceError::Invalid("document_file must name a file".to_string()));
    }
    if name.chars().any(|ch| matches!(ch, '/' | '\\' | '?' | '#') || ch.is_control()) {
        return Err(SourceError::Invalid(
            "document_file must be a single path segment".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// SECTION: Source
// ============================================================================

/// Content source backed by an HTTP origin.
///
/// # Invariants
/// - `base_url` carries no trailing `/`.
/// - Redirects are rejected as non-success statuses.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    /// Validated configuration.
    config: HttpSourceConfig,
    /// Base URL with trailing separators removed.
    base_url: String,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl HttpContentSource {
    /// Builds an HTTP content source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        config.validate()?;
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| SourceError::Invalid(format!("http client build failed: {err}")))?;
        let mut base_url = config.base_url.clone();
        let trimmed_len = base_url.trim_end_matches('/').len();
        base_url.truncate(trimmed_len);
        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Returns the source configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    /// Returns the request URL for `locale`.
    #[must_use]
    pub fn document_url(&self, locale: &LocaleCode) -> String {
        format!("{}/{}/{}", self.base_url, locale, self.config.document_file)
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch(&self, locale: &LocaleCode) -> Result<Vec<u8>, SourceError> {
        let url = self.document_url(locale);
        debug!(locale = %locale, url = %url, "fetching content document");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| SourceError::Network(err.to_string()))?;
        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(SourceError::NotFound(format!("no document for locale {locale}")));
            }
            status => {
                return Err(SourceError::Status {
                    status: status.as_u16(),
                    locale: locale.to_string(),
                });
            }
        }
        read_response_limited(response, self.config.max_response_bytes).await
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the response body while enforcing a byte limit.
async fn read_response_limited(
    mut response: Response,
    max_bytes: usize,
) -> Result<Vec<u8>, SourceError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| SourceError::Invalid("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(SourceError::TooLarge {
            max_bytes,
            actual_bytes: usize::try_from(expected).unwrap_or(usize::MAX),
        });
    }
    let mut body = Vec::new();
    while let Some(chunk) =
        response.chunk().await.map_err(|err| SourceError::Network(err.to_string()))?
    {
        let actual_bytes = body.len().saturating_add(chunk.len());
        if actual_bytes > max_bytes {
            return Err(SourceError::TooLarge {
                max_bytes,
                actual_bytes,
            });
        }
        body.extend_from_slice(&chunk);
    }
    if let Some(expected) = expected_len {
        let received = u64::try_from(body.len()).unwrap_or(u64::MAX);
        if received < expected {
            return Err(SourceError::Network("http response truncated".to_string()));
        }
    }
    Ok(body)
}
