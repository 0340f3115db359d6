// crates/captions-providers/tests/directory_source_unit.rs
// ============================================================================
// Module: Directory Content Source Unit Tests
// Description: Filesystem tests for the directory content source.
// Purpose: Validate layout, missing documents, size limits, and root escapes.
// ============================================================================

//! ## Overview
//! Unit-level tests for [`captions_providers::DirectoryContentSource`] using
//! temporary directories.

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

use std::fs;
use std::path::Path;

use captions_core::ContentSource;
use captions_core::LocaleCode;
use captions_core::SourceError;
use captions_providers::DirectoryContentSource;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn locale(code: &str) -> LocaleCode {
    LocaleCode::parse(code).unwrap()
}

fn write_document(root: &Path, locale: &str, file: &str, body: &str) {
    let dir = root.join(locale);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), body).unwrap();
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn reads_locale_document_from_root() {
    let temp = TempDir::new().unwrap();
    write_document(temp.path(), "es", "en.json", r#"{"common":{"save":"Guardar"}}"#);
    let source = DirectoryContentSource::new(temp.path());

    let bytes = source.fetch(&locale("es")).await.unwrap();
    assert_eq!(bytes, br#"{"common":{"save":"Guardar"}}"#.to_vec());
    assert_eq!(source.root(), temp.path());
}

#[tokio::test]
async fn honors_custom_document_file() {
    let temp = TempDir::new().unwrap();
    write_document(temp.path(), "fr", "captions.json", "{}");
    let source =
        DirectoryContentSource::new(temp.path()).with_document_file("captions.json").unwrap();
    assert_eq!(source.fetch(&locale("fr")).await.unwrap(), b"{}".to_vec());
}

#[tokio::test]
async fn missing_locale_is_not_found() {
    let temp = TempDir::new().unwrap();
    let source = DirectoryContentSource::new(temp.path());
    assert!(matches!(source.fetch(&locale("de")).await, Err(SourceError::NotFound(_))));
}

#[tokio::test]
async fn missing_root_is_an_io_error() {
    let temp = TempDir::new().unwrap();
    let source = DirectoryContentSource::new(temp.path().join("absent"));
    assert!(matches!(source.fetch(&locale("es")).await, Err(SourceError::Io(_))));
}

#[tokio::test]
async fn oversized_documents_are_rejected() {
    let temp = TempDir::new().unwrap();
    write_document(temp.path(), "es", "en.json", &"x".repeat(64));
    let source = DirectoryContentSource::new(temp.path()).with_max_bytes(16);
    assert!(matches!(
        source.fetch(&locale("es")).await,
        Err(SourceError::TooLarge { max_bytes: 16, actual_bytes: 17 })
    ));
}

#[test]
fn document_file_must_be_a_single_segment() {
    let temp = TempDir::new().unwrap();
    let result = DirectoryContentSource::new(temp.path()).with_document_file("../escape.json");
    assert!(matches!(result, Err(SourceError::Invalid(_))));
}

#[cfg(unix)]
#[tokio::test]
async fn symlinks_cannot_escape_root() {
    let outside = TempDir::new().unwrap();
    write_document(outside.path(), "es", "en.json", "{}");
    let temp = TempDir::new().unwrap();
    std::os::unix::fs::symlink(outside.path().join("es"), temp.path().join("es")).unwrap();

    let source = DirectoryContentSource::new(temp.path());
    assert!(matches!(source.fetch(&locale("es")).await, Err(SourceError::Invalid(_))));
}
