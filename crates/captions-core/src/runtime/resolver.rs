// crates/captions-core/src/runtime/resolver.rs
// ============================================================================
// Module: Captions Resolver
// Description: Fallback-chain key resolution with placeholder interpolation.
// Purpose: Turn lookup keys into display strings without ever failing.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! A [`CaptionResolver`] resolves dotted keys against the loaded content, then
//! the bundled default document, then a caller fallback, then the key itself.
//! Placeholders of the form `{name}` are replaced literally, one parameter at a
//! time in the order given. Unmatched placeholders are left as written.
//!
//! ## Invariants
//! - Resolution is pure with respect to the content snapshot it holds.
//! - Exactly one counter is incremented per resolution.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::core::ContentDocument;
use crate::core::ResolutionStats;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Named interpolation parameter.
///
/// # Invariants
/// - `name` matches a placeholder name without braces (for example `name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionArg {
    /// Placeholder name.
    pub name: String,
    /// Stringified substitution value.
    pub value: String,
}

impl CaptionArg {
    /// Creates an argument from a name and displayable value.
    pub fn new(name: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

/// Tier of the fallback chain that answered a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    /// Loaded content.
    Store,
    /// Bundled default document.
    Fallback,
    /// Caller fallback or the key itself.
    Missing,
}

/// Atomic counters backing [`ResolutionStats`].
#[derive(Debug, Default)]
struct StatsCounters {
    /// Store hits.
    store_hits: AtomicU64,
    /// Default-document hits.
    fallback_hits: AtomicU64,
    /// Misses.
    missing_keys: AtomicU64,
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves keys over a snapshot of loaded content and the bundled defaults.
#[derive(Debug)]
pub struct CaptionResolver {
    /// Loaded content for the active locale.
    content: Arc<ContentDocument>,
    /// Bundled default-locale document.
    defaults: Arc<ContentDocument>,
    /// Per-resolver statistics.
    stats: StatsCounters,
}

impl CaptionResolver {
    /// Creates a resolver with fresh statistics.
    #[must_use]
    pub fn new(content: Arc<ContentDocument>, defaults: Arc<ContentDocument>) -> Self {
        Self {
            content,
            defaults,
            stats: StatsCounters::default(),
        }
    }

    /// Resolves `key`, applying `params` to whichever template answered.
    ///
    /// Order: loaded content, bundled defaults, `fallback`, then `key`.
    #[must_use]
    pub fn resolve(&self, key: &str, fallback: Option<&str>, params: &[CaptionArg]) -> String {
        let (template, tier) = self.lookup(key, fallback);
        let counter = match tier {
            Tier::Store => &self.stats.store_hits,
            Tier::Fallback => &self.stats.fallback_hits,
            Tier::Missing => &self.stats.missing_keys,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        interpolate(template, params)
    }

    /// Returns true when `key` resolves in the loaded content. Does not touch
    /// statistics.
    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.content.lookup(key).is_some()
    }

    /// Resolves each key independently without parameters.
    #[must_use]
    pub fn resolve_many<'a, I>(&self, keys: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter().map(|key| (key.to_string(), self.resolve(key, None, &[]))).collect()
    }

    /// Returns a snapshot of this resolver's statistics.
    #[must_use]
    pub fn stats(&self) -> ResolutionStats {
        ResolutionStats {
            store_hits: self.stats.store_hits.load(Ordering::Relaxed),
            fallback_hits: self.stats.fallback_hits.load(Ordering::Relaxed),
            missing_keys: self.stats.missing_keys.load(Ordering::Relaxed),
        }
    }

    /// Walks the fallback chain and reports which tier answered.
    fn lookup<'a>(&'a self, key: &'a str, fallback: Option<&'a str>) -> (&'a str, Tier) {
        if let Some(text) = self.content.lookup(key) {
            return (text, Tier::Store);
        }
        if let Some(text) = self.defaults.lookup(key) {
            return (text, Tier::Fallback);
        }
        (fallback.unwrap_or(key), Tier::Missing)
    }
}

// ============================================================================
// SECTION: Interpolation
// ============================================================================

/// Replaces `{name}` with each argument's value, in argument order.
#[must_use]
pub fn interpolate(template: &str, params: &[CaptionArg]) -> String {
    let mut result = template.to_string();
    for param in params {
        let placeholder = format!("{{{}}}", param.name);
        result = result.replace(&placeholder, &param.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Resolves a key with named arguments.
///
/// ```
/// use std::sync::Arc;
///
/// use captions_core::ContentDocument;
/// use captions_core::caption;
/// use captions_core::runtime::CaptionResolver;
///
/// let defaults = ContentDocument::from_json_slice(br#"{"home":{"hi":"Hi {name}"}}"#).unwrap();
/// let resolver = CaptionResolver::new(Arc::new(ContentDocument::new()), Arc::new(defaults));
/// assert_eq!(caption!(resolver, "home.hi", name = "Ana"), "Hi Ana");
/// assert_eq!(caption!(resolver, "home.bye", fallback: "Bye"), "Bye");
/// ```
#[macro_export]
macro_rules! caption {
    (
        $resolver:expr,
        $key:expr,
        fallback: $fallback:expr
        $(, $name:ident = $value:expr )* $(,)?
    ) => {{
        let args: ::std::vec::Vec<$crate::runtime::CaptionArg> = ::std::vec![
            $(
                $crate::runtime::CaptionArg::new(stringify!($name), &$value),
            )*
        ];
        $resolver.resolve($key, ::std::option::Option::Some($fallback), &args)
    }};
    ($resolver:expr, $key:expr $(, $name:ident = $value:expr )* $(,)?) => {{
        let args: ::std::vec::Vec<$crate::runtime::CaptionArg> = ::std::vec![
            $(
                $crate::runtime::CaptionArg::new(stringify!($name), &$value),
            )*
        ];
        $resolver.resolve($key, ::std::option::Option::None, &args)
    }};
}

// ============================================================================
// SECTION: Tests
// ============================================================================
