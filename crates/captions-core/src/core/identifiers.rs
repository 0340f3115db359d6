// crates/captions-core/src/core/identifiers.rs
// ============================================================================
// Module: Captions Identifiers
// Description: Locale codes, section names, and the supported-locale set.
// Purpose: Provide validated, serializable identifiers with stable wire forms.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Identifiers are opaque strings validated at construction boundaries. Locale
//! codes are normalized to lowercase with `-` separators so `es_MX`, `ES-mx`,
//! and `es-mx` compare equal. Both locale codes and section names are used to
//! build request paths and cache markers, so only a conservative character set
//! is accepted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a locale code.
pub const MAX_LOCALE_CODE_LENGTH: usize = 35;
/// Maximum length of a section name.
pub const MAX_SECTION_NAME_LENGTH: usize = 128;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Locale code failed validation.
    #[error("invalid locale code: {0}")]
    InvalidLocale(String),
    /// Section name failed validation.
    #[error("invalid section name: {0}")]
    InvalidSection(String),
    /// Supported locale set failed validation.
    #[error("invalid supported locales: {0}")]
    InvalidSupportedLocales(String),
}

// ============================================================================
// SECTION: Locale Code
// ============================================================================

/// Short code identifying a language or language/region pair.
///
/// # Invariants
/// - Non-empty, at most [`MAX_LOCALE_CODE_LENGTH`] bytes.
/// - Lowercase ASCII alphanumerics separated by single `-` characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocaleCode(String);

impl LocaleCode {
    /// Parses and normalizes a locale code.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidLocale`] when the value is empty,
    /// too long, or contains characters outside `[A-Za-z0-9_-]`.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::InvalidLocale("locale code must be non-empty".to_string()));
        }
        if trimmed.len() > MAX_LOCALE_CODE_LENGTH {
            return Err(IdentifierError::InvalidLocale(format!(
                "locale code exceeds {MAX_LOCALE_CODE_LENGTH} bytes"
            )));
        }
        let normalized = trimmed.replace('_', "-").to_ascii_lowercase();
        for subtag in normalized.split('-') {
            if subtag.is_empty() {
                return Err(IdentifierError::InvalidLocale(format!(
                    "locale code has an empty subtag: {trimmed}"
                )));
            }
            if !subtag.bytes().all(|byte| byte.is_ascii_alphanumeric()) {
                return Err(IdentifierError::InvalidLocale(format!(
                    "locale code contains unsupported characters: {trimmed}"
                )));
            }
        }
        Ok(Self(normalized))
    }

    /// Returns the normalized code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the primary language subtag (`"es"` for `"es-mx"`).
    #[must_use]
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LocaleCode {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LocaleCode> for String {
    fn from(value: LocaleCode) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Section Name
// ============================================================================

/// Name of a top-level content group (for example `common` or `dashboard`).
///
/// # Invariants
/// - Non-empty, at most [`MAX_SECTION_NAME_LENGTH`] bytes.
/// - Never contains `.`, which separates key path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SectionName(String);

impl SectionName {
    /// Parses a section name.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidSection`] when the value is empty,
    /// too long, or contains `.` or whitespace.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::InvalidSection(
                "section name must be non-empty".to_string(),
            ));
        }
        if trimmed.len() > MAX_SECTION_NAME_LENGTH {
            return Err(IdentifierError::InvalidSection(format!(
                "section name exceeds {MAX_SECTION_NAME_LENGTH} bytes"
            )));
        }
        if trimmed.chars().any(|ch| ch == '.' || ch.is_whitespace() || ch.is_control()) {
            return Err(IdentifierError::InvalidSection(format!(
                "section name contains unsupported characters: {trimmed}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the section name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SectionName {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SectionName> for String {
    fn from(value: SectionName) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Supported Locales
// ============================================================================

/// Ordered set of locales the application ships content for.
///
/// # Invariants
/// - Non-empty and duplicate-free.
/// - The first element is the default locale; its content is bundled and
///   never fetched remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedLocales {
    /// Locales in declaration order.
    locales: Vec<LocaleCode>,
}

impl SupportedLocales {
    /// Builds a supported locale set. The first entry becomes the default.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidSupportedLocales`] when the list is
    /// empty or contains duplicates.
    pub fn new(locales: Vec<LocaleCode>) -> Result<Self, IdentifierError> {
        if locales.is_empty() {
            return Err(IdentifierError::InvalidSupportedLocales(
                "at least one locale is required".to_string(),
            ));
        }
        for (index, locale) in locales.iter().enumerate() {
            if locales[.. index].contains(locale) {
                return Err(IdentifierError::InvalidSupportedLocales(format!(
                    "duplicate locale: {locale}"
                )));
            }
        }
        Ok(Self {
            locales,
        })
    }

    /// Parses a supported locale set from raw codes.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when any code is invalid or the set is
    /// empty or duplicated.
    pub fn parse<S: AsRef<str>>(codes: &[S]) -> Result<Self, IdentifierError> {
        let locales =
            codes.iter().map(|code| LocaleCode::parse(code.as_ref())).collect::<Result<_, _>>()?;
        Self::new(locales)
    }

    /// Returns the default locale.
    #[must_use]
    pub fn default_locale(&self) -> &LocaleCode {
        &self.locales[0]
    }

    /// Returns true when `locale` is the default locale.
    #[must_use]
    pub fn is_default(&self, locale: &LocaleCode) -> bool {
        self.default_locale() == locale
    }

    /// Returns true when `locale` is supported exactly.
    #[must_use]
    pub fn contains(&self, locale: &LocaleCode) -> bool {
        self.locales.contains(locale)
    }

    /// Matches a candidate against the supported set.
    ///
    /// Exact matches win; otherwise the candidate's primary language subtag is
    /// compared against each supported code, so `es-mx` selects `es`.
    #[must_use]
    pub fn match_locale(&self, candidate: &LocaleCode) -> Option<&LocaleCode> {
        if let Some(exact) = self.locales.iter().find(|locale| *locale == candidate) {
            return Some(exact);
        }
        self.locales.iter().find(|locale| locale.as_str() == candidate.language())
    }

    /// Iterates the supported locales in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &LocaleCode> {
        self.locales.iter()
    }

    /// Returns the number of supported locales.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locales.len()
    }

    /// Always false; the set is non-empty by construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
