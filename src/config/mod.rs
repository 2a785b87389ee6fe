// src/config/mod.rs
//! Configuration system for encrypted-credential-vault
//!
//! Central, lazy-loaded global config from TOML with env overrides.
//! `ECV_CONFIG` points at the file (default `vault-config.toml`);
//! `ECV_STORE_DB` overrides `paths.store_db`.

pub use app::{load, load_from, Config, Features, Paths};

mod app;
mod defaults;
