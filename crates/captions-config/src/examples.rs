// crates/captions-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and the CLI.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `captions.toml`. The output is static and must always
//! pass validation.

/// Returns a canonical example `captions.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"default_document = "assets/en.json"

[remote]
base_url = "https://cdn.example.com/captions"
document_file = "en.json"
timeout_ms = 10000
max_response_bytes = 4194304
user_agent = "captions/0.1"
allow_http = false

[locales]
supported = ["en", "es", "fr"]
baseline_sections = ["common", "error", "footer"]

[store]
path = "captions.db"
journal_mode = "wal"
sync_mode = "full"
busy_timeout_ms = 5000
max_document_bytes = 4194304

[logging]
filter = "warn,captions_core=info"
format = "text"
"#,
    )
}
