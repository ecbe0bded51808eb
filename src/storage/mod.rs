//! Storage layer for nxmisc
//!
//! Handles the TOML configuration file.

use crate::error::StorageError;

pub mod config;

type Result<T> = std::result::Result<T, StorageError>;
