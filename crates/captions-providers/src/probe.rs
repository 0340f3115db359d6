// crates/captions-providers/src/probe.rs
// ============================================================================
// Module: System Locale Probe
// Description: Device language detection via the operating system.
// Purpose: Supply the initial locale when no preference is stored.
// Dependencies: captions-core, sys-locale
// ============================================================================

//! ## Overview
//! [`SystemLocaleProbe`] asks the platform for its preferred locale and keeps
//! only the primary language subtag. POSIX-style values such as
//! `es_MX.UTF-8@euro` are reduced to `es`; `C` and `POSIX` report nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use captions_core::LocaleCode;
use captions_core::LocaleProbe;
use captions_core::ProbeError;

// ============================================================================
// SECTION: Probe
// ============================================================================

/// Locale probe backed by `sys-locale`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLocaleProbe;

impl SystemLocaleProbe {
    /// Creates a system locale probe.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LocaleProbe for SystemLocaleProbe {
    fn detect(&self) -> Result<LocaleCode, ProbeError> {
        let raw = sys_locale::get_locale().ok_or(ProbeError::Unavailable)?;
        language_from_platform(&raw)
    }
}

/// Reduces a platform locale string to its language subtag.
///
/// # Errors
///
/// Returns [`ProbeError::Unavailable`] for the `C`/`POSIX` locales and
/// [`ProbeError::Unsupported`] when no language subtag can be parsed.
pub fn language_from_platform(raw: &str) -> Result<LocaleCode, ProbeError> {
    let without_modifier = raw.split('@').next().unwrap_or(raw);
    let without_encoding = without_modifier.split('.').next().unwrap_or(without_modifier);
    let trimmed = without_encoding.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("c")
        || trimmed.eq_ignore_ascii_case("posix")
    {
        return Err(ProbeError::Unavailable);
    }
    let language = trimmed.split(['-', '_']).next().unwrap_or(trimmed);
    if language.len() < 2
        || language.len() > 3
        || !language.bytes().all(|b| b.is_ascii_alphabetic())
    {
        return Err(ProbeError::Unsupported(raw.to_string()));
    }
    LocaleCode::parse(language).map_err(|_| ProbeError::Unsupported(raw.to_string()))
}
