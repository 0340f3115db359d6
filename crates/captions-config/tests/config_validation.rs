//! Config validation tests for captions-config.
// crates/captions-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Validate section-level invariants of captions.toml.
// Purpose: Ensure invalid sources, locales, store, and logging settings fail.
// =============================================================================

use captions_config::CaptionsConfig;
use captions_config::ConfigError;
use captions_config::LogFormat;
use captions_config::config_toml_example;
use captions_store_sqlite::SqliteStoreMode;

type TestResult = Result<(), String>;

fn assert_invalid(toml: &str, needle: &str) -> TestResult {
    match CaptionsConfig::from_toml_str(toml) {
        Err(ConfigError::Invalid(message)) if message.contains(needle) => Ok(()),
        Err(error) => Err(format!("error {error} did not contain {needle}")),
        Ok(_) => Err(format!("expected invalid config for {needle}")),
    }
}

#[test]
fn example_config_is_valid() -> TestResult {
    let config =
        CaptionsConfig::from_toml_str(&config_toml_example()).map_err(|err| err.to_string())?;
    let remote = config.remote.ok_or_else(|| "example should set remote".to_string())?;
    if remote.timeout_ms != 10_000 {
        return Err("unexpected timeout".to_string());
    }
    if config.store.journal_mode != SqliteStoreMode::Wal {
        return Err("unexpected journal mode".to_string());
    }
    if config.logging.format != LogFormat::Text {
        return Err("unexpected log format".to_string());
    }
    Ok(())
}

#[test]
fn empty_config_uses_defaults() -> TestResult {
    let config = CaptionsConfig::from_toml_str("").map_err(|err| err.to_string())?;
    let container = config.locales.container_config().map_err(|err| err.to_string())?;
    if container.supported.default_locale().as_str() != "en" {
        return Err("default locale should be en".to_string());
    }
    let sections: Vec<&str> = container.baseline_sections.iter().map(|s| s.as_str()).collect();
    if sections != ["common", "error", "footer"] {
        return Err(format!("unexpected baseline sections: {}", sections.join(",")));
    }
    if config.logging.filter_or_default() != "warn" {
        return Err("default log filter should be warn".to_string());
    }
    let sqlite = config.store.to_sqlite_config();
    if sqlite.busy_timeout_ms != 5_000 || sqlite.max_document_bytes != 4 * 1024 * 1024 {
        return Err("unexpected store defaults".to_string());
    }
    Ok(())
}

#[test]
fn remote_and_directory_are_exclusive() -> TestResult {
    assert_invalid(
        "[remote]\nbase_url = \"https://cdn.example.com\"\n[directory]\nroot = \"content\"\n",
        "mutually exclusive",
    )
}

#[test]
fn remote_rejects_cleartext_without_opt_in() -> TestResult {
    assert_invalid("[remote]\nbase_url = \"http://cdn.example.com\"\n", "allow_http")
}

#[test]
fn remote_rejects_zero_timeout() -> TestResult {
    assert_invalid(
        "[remote]\nbase_url = \"https://cdn.example.com\"\ntimeout_ms = 0\n",
        "timeout_ms",
    )
}

#[test]
fn directory_rejects_nested_document_file() -> TestResult {
    assert_invalid(
        "[directory]\nroot = \"content\"\ndocument_file = \"../en.json\"\n",
        "single path segment",
    )
}

#[test]
fn locales_reject_empty_set() -> TestResult {
    assert_invalid("[locales]\nsupported = []\n", "locales.supported")
}

#[test]
fn locales_reject_duplicates_after_normalization() -> TestResult {
    assert_invalid("[locales]\nsupported = [\"en\", \"es_MX\", \"es-mx\"]\n", "duplicate locale")
}

#[test]
fn locales_reject_invalid_codes() -> TestResult {
    assert_invalid("[locales]\nsupported = [\"en\", \"../x\"]\n", "locales.supported")
}

#[test]
fn baseline_sections_reject_dotted_names() -> TestResult {
    assert_invalid("[locales]\nbaseline_sections = [\"common.save\"]\n", "baseline_sections")
}

#[test]
fn baseline_sections_reject_duplicates() -> TestResult {
    assert_invalid(
        "[locales]\nbaseline_sections = [\"common\", \"common\"]\n",
        "duplicate section",
    )
}

#[test]
fn store_rejects_zero_busy_timeout() -> TestResult {
    assert_invalid("[store]\nbusy_timeout_ms = 0\n", "busy_timeout_ms")
}

#[test]
fn store_rejects_out_of_range_document_limit() -> TestResult {
    assert_invalid("[store]\nmax_document_bytes = 0\n", "max_document_bytes")
}

#[test]
fn store_rejects_empty_path() -> TestResult {
    assert_invalid("[store]\npath = \"  \"\n", "store.path must be non-empty")
}

#[test]
fn logging_rejects_blank_filter() -> TestResult {
    assert_invalid("[logging]\nfilter = \" \"\n", "logging.filter")
}

#[test]
fn logging_accepts_json_format() -> TestResult {
    let config = CaptionsConfig::from_toml_str("[logging]\nformat = \"json\"\n")
        .map_err(|err| err.to_string())?;
    if config.logging.format == LogFormat::Json { Ok(()) } else { Err("expected json".to_string()) }
}
