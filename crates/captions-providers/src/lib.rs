// crates/captions-providers/src/lib.rs
// ============================================================================
// Module: Captions Providers
// Description: Built-in content sources and the system locale probe.
// Purpose: Connect the captions runtime to HTTP origins, disk, and the OS.
// Dependencies: captions-core, reqwest, sys-locale, tokio, url
// ============================================================================

//! ## Overview
//! This crate ships the concrete collaborators the captions runtime needs
//! outside of storage: an HTTP content source, a directory content source
//! with the same layout, and a device locale probe. Inputs from the network
//! and the filesystem are untrusted and bounded by size limits.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod directory;
pub mod http;
pub mod probe;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use directory::DirectoryContentSource;
pub use http::DEFAULT_DOCUMENT_FILE;
pub use http::HttpContentSource;
pub use http::HttpSourceConfig;
pub use http::MAX_RESPONSE_BYTES;
pub use http::MAX_TIMEOUT_MS;
pub use http::validate_document_file;
pub use probe::SystemLocaleProbe;
pub use probe::language_from_platform;

#[cfg(test)]
mod tests;
