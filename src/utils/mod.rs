//! Utils module - Shared utilities and helpers
//!
//! I/O-facing helpers used by the CLI layer and available to library users.

/// File handles with transparent gzip/bzip2 support
pub mod file;

/// Opening files in the OS default application
pub mod opener;

/// Configuration value parsing
pub mod validation;

/// Verbose diagnostics on stderr
pub mod logging;

/// Table cell text helpers
pub mod text;
