// crates/captions-cli/src/tests/logging.rs
// ============================================================================
// Module: CLI Logging Tests
// Description: Unit tests for filter selection and subscriber installation.
// Purpose: Ensure the environment filter wins and bad directives fail closed.
// Dependencies: captions-cli logging module
// ============================================================================

//! ## Overview
//! Exercises filter precedence, directive parsing, and the single global
//! subscriber installation.

use captions_config::LogFormat;
use captions_config::LoggingConfig;

use crate::logging::LoggingError;
use crate::logging::build_filter;
use crate::logging::init_logging;
use crate::logging::resolve_filter;

fn configured(filter: Option<&str>) -> LoggingConfig {
    LoggingConfig {
        filter: filter.map(str::to_string),
        format: LogFormat::Text,
    }
}

#[test]
fn environment_filter_wins() {
    let logging = configured(Some("info"));
    assert_eq!(resolve_filter(Some("captions_core=debug"), &logging), "captions_core=debug");
}

#[test]
fn blank_environment_filter_is_ignored() {
    let logging = configured(Some("info"));
    assert_eq!(resolve_filter(Some("   "), &logging), "info");
    assert_eq!(resolve_filter(None, &logging), "info");
}

#[test]
fn default_filter_applies_without_config() {
    assert_eq!(resolve_filter(None, &configured(None)), "warn");
}

#[test]
fn invalid_directives_are_rejected() {
    let err = build_filter("captions_core=loudest").unwrap_err();
    let LoggingError::Filter {
        filter,
        ..
    } = err
    else {
        panic!("expected filter error");
    };
    assert_eq!(filter, "captions_core=loudest");
    assert!(build_filter("warn,captions_store_sqlite=debug").is_ok());
}

#[test]
fn subscriber_installs_once() {
    init_logging("warn", LogFormat::Json).unwrap();
    let second = init_logging("warn", LogFormat::Text);
    assert!(matches!(second, Err(LoggingError::Init(_))));
}
