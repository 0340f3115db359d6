// crates/captions-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalogs and translation utilities for the CLI.
// Purpose: Keep every user-facing CLI string in one place per output language.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The Captions CLI stores its own user-facing strings in a small translation
//! catalog. These messages describe CLI outcomes; they are unrelated to the
//! content documents the CLI resolves. All runtime output should be routed
//! through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - Catalogs are initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI output languages.
///
/// # Invariants
/// - Variants are stable for CLI parsing and catalog lookup.
/// - [`Locale::En`] is the default fallback locale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Spanish.
    Es,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }

    /// Attempts to parse a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let normalized = value.to_ascii_lowercase();
        let lang = normalized.split(['-', '_']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            _ => None,
        }
    }
}

/// Ordered list of supported CLI locales.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Es];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `path`).
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "captions {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.json_failed", "Failed to serialize output: {error}"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'es'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English CLI output is machine translated and may be inaccurate.",
    ),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("logging.filter_invalid", "Invalid log filter {filter}: {error}"),
    ("logging.init_failed", "Failed to initialize logging: {error}"),
    ("setup.locales_invalid", "Invalid locale settings: {error}"),
    ("setup.source_invalid", "Invalid content source: {error}"),
    ("setup.store_failed", "Failed to open content store at {path}: {error}"),
    ("setup.defaults.read_failed", "Failed to read default document at {path}: {error}"),
    (
        "setup.defaults.too_large",
        "Refusing to read default document at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("setup.defaults.parse_failed", "Failed to parse default document {path}: {error}"),
    ("setup.no_source", "No content origin is configured; set [remote] or [directory]."),
    ("args.locale_invalid", "Invalid locale {value}: {error}"),
    ("args.section_invalid", "Invalid section name {value}: {error}"),
    ("args.param_invalid", "Invalid parameter {value}; expected NAME=VALUE."),
    (
        "init.failed",
        "Content for {locale} failed to load ({failure}); falling back to default content.",
    ),
    ("resolve.entry", "{key} = {value}"),
    ("activate.ok", "Active locale: {locale} (origin: {origin})"),
    ("activate.coerced", "Locale {requested} is not supported; activated {locale} instead."),
    ("activate.failed", "Content for {locale} failed to load (origin: {origin})."),
    ("activate.superseded", "Activation of {locale} was superseded."),
    ("activate.sections", "Loaded sections: {sections}"),
    ("activate.preference_unsaved", "Warning: the preferred locale could not be saved."),
    ("section.merged", "Section {section} loaded for {locale} (origin: {origin})."),
    ("section.skipped", "{locale} is the default locale; section {section} is bundled."),
    ("section.missing", "Section {section} is not available for {locale} (origin: {origin})."),
    ("section.superseded", "Loading section {section} was superseded."),
    ("status.locale", "Active locale: {locale}"),
    ("status.init.ready", "Initialized from: {source}"),
    ("status.init.failed", "Initialized from: {source} (load failed: {failure})"),
    ("status.init.pending", "Initialization pending."),
    ("status.supported", "Supported locales: {locales}"),
    ("status.cached", "Cached locale: {locale}"),
    ("status.cached.failed", "Cached locale: unavailable ({error})"),
    ("status.sections", "Loaded sections: {sections}"),
    (
        "status.loader",
        "Loader: bundled={bundled} cache_hits={cache_hits} cache_misses={cache_misses} \
         network_fetches={network_fetches} network_failures={network_failures} \
         malformed_documents={malformed_documents} storage_failures={storage_failures}",
    ),
    ("status.none", "none"),
    ("cache.clear.ok", "Content cache cleared."),
    ("cache.clear.failed", "Failed to clear content cache: {error}"),
];

/// Static Spanish catalog entries.
const CATALOG_ES: &[(&str, &str)] = &[
    ("main.version", "captions {version}"),
    ("output.stream.stdout", "salida estándar"),
    ("output.stream.stderr", "salida de errores"),
    ("output.stream.unknown", "salida"),
    ("output.write_failed", "No se pudo escribir en {stream}: {error}"),
    ("output.json_failed", "No se pudo serializar la salida: {error}"),
    ("i18n.lang.invalid_env", "Valor no válido para {env}: {value}. Se esperaba 'en' o 'es'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la salida de la CLI que no está en inglés es una traducción automática y puede \
         ser inexacta.",
    ),
    ("config.load_failed", "No se pudo cargar la configuración: {error}"),
    ("config.validate.ok", "Configuración válida."),
    ("logging.filter_invalid", "Filtro de registro no válido {filter}: {error}"),
    ("logging.init_failed", "No se pudo inicializar el registro: {error}"),
    ("setup.locales_invalid", "Configuración de idiomas no válida: {error}"),
    ("setup.source_invalid", "Origen de contenido no válido: {error}"),
    ("setup.store_failed", "No se pudo abrir el almacén de contenido en {path}: {error}"),
    (
        "setup.defaults.read_failed",
        "No se pudo leer el documento predeterminado en {path}: {error}",
    ),
    (
        "setup.defaults.too_large",
        "Se rechaza leer el documento predeterminado en {path} porque ocupa {size} bytes \
         (límite {limit}).",
    ),
    (
        "setup.defaults.parse_failed",
        "No se pudo analizar el documento predeterminado {path}: {error}",
    ),
    (
        "setup.no_source",
        "No hay ningún origen de contenido configurado; defina [remote] o [directory].",
    ),
    ("args.locale_invalid", "Idioma no válido {value}: {error}"),
    ("args.section_invalid", "Nombre de sección no válido {value}: {error}"),
    ("args.param_invalid", "Parámetro no válido {value}; se esperaba NOMBRE=VALOR."),
    (
        "init.failed",
        "No se pudo cargar el contenido de {locale} ({failure}); se usa el contenido \
         predeterminado.",
    ),
    ("resolve.entry", "{key} = {value}"),
    ("activate.ok", "Idioma activo: {locale} (origen: {origin})"),
    ("activate.coerced", "El idioma {requested} no es compatible; se activó {locale}."),
    ("activate.failed", "No se pudo cargar el contenido de {locale} (origen: {origin})."),
    ("activate.superseded", "La activación de {locale} fue reemplazada."),
    ("activate.sections", "Secciones cargadas: {sections}"),
    ("activate.preference_unsaved", "Aviso: no se pudo guardar el idioma preferido."),
    ("section.merged", "Sección {section} cargada para {locale} (origen: {origin})."),
    (
        "section.skipped",
        "{locale} es el idioma predeterminado; la sección {section} viene incluida.",
    ),
    (
        "section.missing",
        "La sección {section} no está disponible para {locale} (origen: {origin}).",
    ),
    ("section.superseded", "La carga de la sección {section} fue reemplazada."),
    ("status.locale", "Idioma activo: {locale}"),
    ("status.init.ready", "Inicializado desde: {source}"),
    ("status.init.failed", "Inicializado desde: {source} (fallo de carga: {failure})"),
    ("status.init.pending", "Inicialización pendiente."),
    ("status.supported", "Idiomas compatibles: {locales}"),
    ("status.cached", "Idioma en caché: {locale}"),
    ("status.cached.failed", "Idioma en caché: no disponible ({error})"),
    ("status.sections", "Secciones cargadas: {sections}"),
    (
        "status.loader",
        "Cargador: bundled={bundled} cache_hits={cache_hits} cache_misses={cache_misses} \
         network_fetches={network_fetches} network_failures={network_failures} \
         malformed_documents={malformed_documents} storage_failures={storage_failures}",
    ),
    ("status.none", "ninguna"),
    ("cache.clear.ok", "Caché de contenido vaciada."),
    ("cache.clear.failed", "No se pudo vaciar la caché de contenido: {error}"),
];

/// Returns the raw catalog entries for `locale`.
pub(crate) const fn catalog_entries_for(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::En => CATALOG_EN,
        Locale::Es => CATALOG_ES,
    }
}

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_ES_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    let map = match locale {
        Locale::En => &CATALOG_EN_MAP,
        Locale::Es => &CATALOG_ES_MAP,
    };
    map.get_or_init(|| catalog_entries_for(locale).iter().copied().collect())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let locale = current_locale();
    let template = catalog_for(locale)
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A localized [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
