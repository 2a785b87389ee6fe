// src/import/mod.rs
//! Import utilities for encrypted-credential-vault
//!
//! Encrypted vault files are opened through `VaultSession::import_from_file`.
//! This module holds the unauthenticated plaintext converters.

pub mod csv;

pub use self::csv::parse as parse_csv;
