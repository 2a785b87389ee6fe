// src/error.rs
//! Public error types for the entire crate
//!
//! No message in here may ever carry a password, a derived key or a plaintext
//! entry value. Variants hold only static text or non-secret identifiers.

use thiserror::Error;

/// Rejected user input. Recoverable by re-entering the value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("master password must not be empty")]
    EmptyPassword,

    #[error("entry title must not be empty")]
    EmptyTitle,
}

/// Opening an encrypted vault failed.
///
/// Deliberately carries no detail: a wrong password, a flipped bit, an unknown
/// version and a truncated file all look the same to the caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("wrong master password or corrupted vault file")]
pub struct VaultOpenError;

/// Key-value store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("store connection poisoned by a panicked writer")]
    Poisoned,

    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Clipboard collaborator failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Open(#[from] VaultOpenError),

    #[error("no vault is unlocked")]
    NoVault,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error("system randomness source failed")]
    Randomness,

    #[error("AES-256-GCM encryption failed")]
    Cipher,

    #[error("vault serialization failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("CSV export failed: {0}")]
    CsvExport(#[from] csv::Error),

    #[error("background crypto task failed")]
    TaskFailed,

    #[error("vault runtime is no longer running")]
    RuntimeClosed,
}

/// Configuration loading failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}
