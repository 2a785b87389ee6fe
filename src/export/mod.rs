// src/export/mod.rs
//! Export utilities for encrypted-credential-vault
//!
//! The encrypted `{v, s, iv, ct}` file is produced by `VaultSession::export_to_file`.
//! CSV export writes every password in cleartext; callers must confirm with the user first.

pub mod csv;

pub use self::csv::to_csv as export_to_csv;
