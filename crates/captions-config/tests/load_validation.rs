//! Config load validation tests for captions-config.
// crates/captions-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use captions_config::CaptionsConfig;
use captions_config::ConfigError;
use captions_config::ConfigOrigin;
use tempfile::NamedTempFile;
use tempfile::TempDir;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<CaptionsConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(contents: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(CaptionsConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(CaptionsConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'a'; 1_048_577])?;
    assert_invalid(CaptionsConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(CaptionsConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_invalid_toml() -> TestResult {
    let file = write_config(b"[locales\nsupported = ")?;
    match CaptionsConfig::load(Some(file.path())) {
        Err(ConfigError::Parse(_)) => Ok(()),
        other => Err(format!("expected parse error, got {}", describe(&other))),
    }
}

#[test]
fn load_rejects_unknown_fields() -> TestResult {
    let file = write_config(b"[store]\npath = \"x.db\"\nretention = 3\n")?;
    match CaptionsConfig::load(Some(file.path())) {
        Err(ConfigError::Parse(_)) => Ok(()),
        other => Err(format!("expected parse error, got {}", describe(&other))),
    }
}

#[test]
fn load_requires_explicit_file_to_exist() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let missing = temp.path().join("missing.toml");
    match CaptionsConfig::load(Some(&missing)) {
        Err(ConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {}", describe(&other))),
    }
}

#[test]
fn missing_default_file_uses_defaults() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let missing = temp.path().join("captions.toml");
    let config = CaptionsConfig::load_resolved(&missing, ConfigOrigin::Default)
        .map_err(|err| err.to_string())?;
    if config != CaptionsConfig::default() {
        return Err("expected default config".to_string());
    }
    Ok(())
}

#[test]
fn load_accepts_valid_file() -> TestResult {
    let file = write_config(
        br#"
[directory]
root = "content"

[locales]
supported = ["en", "es"]
"#,
    )?;
    let config = CaptionsConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    let supported = config.locales.supported_locales().map_err(|err| err.to_string())?;
    if supported.default_locale().as_str() != "en" || supported.len() != 2 {
        return Err("unexpected supported locales".to_string());
    }
    let directory = config.directory.ok_or_else(|| "missing directory".to_string())?;
    if directory.document_file != "en.json" {
        return Err("document_file default not applied".to_string());
    }
    Ok(())
}

fn describe(result: &Result<CaptionsConfig, ConfigError>) -> String {
    match result {
        Ok(_) => "ok".to_string(),
        Err(err) => err.to_string(),
    }
}
