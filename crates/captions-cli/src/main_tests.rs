// crates/captions-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing helpers in the CLI entry point.
// Purpose: Ensure CLI inputs are parsed strictly before reaching the runtime.
// Dependencies: captions-cli main helpers
// ============================================================================

//! ## Overview
//! Validates language selection, interpolation parameter parsing, locale and
//! section argument checks, and the clap command surface.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use clap::CommandFactory;
use clap::Parser;
use proptest::prelude::*;

use super::CacheCommand;
use super::Cli;
use super::Commands;
use super::ConfigCommand;
use super::LangArg;
use super::Locale;
use super::LoggingError;
use super::join_or_none;
use super::logging_error_message;
use super::parse_locale_arg;
use super::parse_param;
use super::parse_section_arg;
use super::resolve_locale;

// ============================================================================
// SECTION: Language Selection
// ============================================================================

#[test]
fn lang_flag_overrides_environment() {
    let locale = resolve_locale(Some(LangArg::Es), Some("en")).unwrap();
    assert_eq!(locale, Locale::Es);
}

#[test]
fn environment_language_accepts_region_tags() {
    assert_eq!(resolve_locale(None, Some("es_MX.UTF-8")).unwrap(), Locale::Es);
    assert_eq!(resolve_locale(None, None).unwrap(), Locale::En);
}

#[test]
fn unknown_environment_language_is_rejected() {
    let err = resolve_locale(None, Some("klingon")).unwrap_err();
    assert!(err.to_string().contains("CAPTIONS_LANG"));
    assert!(err.to_string().contains("klingon"));
}

// ============================================================================
// SECTION: Parameters
// ============================================================================

#[test]
fn param_splits_on_first_equals() {
    let arg = parse_param("expr=a=b").unwrap();
    assert_eq!(arg.name, "expr");
    assert_eq!(arg.value, "a=b");
}

#[test]
fn param_allows_empty_value_and_trims_name() {
    let arg = parse_param(" name =").unwrap();
    assert_eq!(arg.name, "name");
    assert_eq!(arg.value, "");
}

#[test]
fn param_rejects_malformed_input() {
    for raw in ["novalue", "=value", "{name}=x", "  =x"] {
        let err = parse_param(raw).unwrap_err();
        assert!(err.to_string().contains(raw), "message should echo {raw}");
    }
}

proptest! {
    #[test]
    fn param_round_trips_name_and_value(
        name in "[a-z_][a-z0-9_]{0,15}",
        value in "[^\\n]{0,32}",
    ) {
        let arg = parse_param(&format!("{name}={value}")).unwrap();
        prop_assert_eq!(arg.name, name);
        prop_assert_eq!(arg.value, value);
    }
}

// ============================================================================
// SECTION: Identifiers
// ============================================================================

#[test]
fn locale_argument_is_normalized() {
    assert_eq!(parse_locale_arg("PT_br").unwrap().as_str(), "pt-br");
}

#[test]
fn invalid_locale_and_section_arguments_fail() {
    assert!(parse_locale_arg("../es").is_err());
    assert!(parse_locale_arg("").is_err());
    assert!(parse_section_arg("home.title").is_err());
    assert_eq!(parse_section_arg("home").unwrap().as_str(), "home");
}

#[test]
fn join_or_none_lists_items() {
    assert_eq!(join_or_none(&["common".to_string(), "error".to_string()]), "common, error");
    assert_eq!(join_or_none(&[]), "none");
}

#[test]
fn logging_errors_use_distinct_messages() {
    let filter = LoggingError::Filter {
        filter: "captions_core=loudest".to_string(),
        error: "invalid level".to_string(),
    };
    assert_eq!(
        logging_error_message(&filter),
        "Invalid log filter captions_core=loudest: invalid level"
    );
    let init = LoggingError::Init("already set".to_string());
    assert_eq!(logging_error_message(&init), "Failed to initialize logging: already set");
}

// ============================================================================
// SECTION: Command Surface
// ============================================================================

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn resolve_collects_keys_and_params() {
    let cli = Cli::try_parse_from([
        "captions",
        "resolve",
        "common.save",
        "home.title",
        "--locale",
        "es",
        "--param",
        "name=Ada",
        "--param",
        "count=3",
        "--json",
    ])
    .unwrap();
    let Some(Commands::Resolve(command)) = cli.command else {
        panic!("expected resolve command");
    };
    assert_eq!(command.keys, vec!["common.save", "home.title"]);
    assert_eq!(command.locale.as_deref(), Some("es"));
    assert_eq!(command.params, vec!["name=Ada", "count=3"]);
    assert!(command.json);
}

#[test]
fn resolve_requires_a_key() {
    assert!(Cli::try_parse_from(["captions", "resolve"]).is_err());
}

#[test]
fn global_flags_are_accepted_after_subcommands() {
    let cli = Cli::try_parse_from([
        "captions",
        "status",
        "--no-detect",
        "--content-dir",
        "content",
        "--config",
        "captions.toml",
        "--lang",
        "es",
    ])
    .unwrap();
    assert!(cli.no_detect);
    assert_eq!(cli.content_dir.unwrap().to_string_lossy(), "content");
    assert_eq!(cli.config.unwrap().to_string_lossy(), "captions.toml");
    assert!(matches!(cli.lang, Some(LangArg::Es)));
    assert!(matches!(cli.command, Some(Commands::Status(_))));
}

#[test]
fn nested_subcommands_parse() {
    let cli = Cli::try_parse_from(["captions", "cache", "clear"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Cache {
            command: CacheCommand::Clear
        })
    ));
    let cli = Cli::try_parse_from(["captions", "config", "example"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Config {
            command: ConfigCommand::Example
        })
    ));
    let cli = Cli::try_parse_from(["captions", "load-section", "settings"]).unwrap();
    let Some(Commands::LoadSection(command)) = cli.command else {
        panic!("expected load-section command");
    };
    assert_eq!(command.section, "settings");
}
