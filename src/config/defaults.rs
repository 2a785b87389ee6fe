// src/config/defaults.rs
use std::path::PathBuf;

use crate::config::app::{Features, Paths};

pub const DEFAULT_CONFIG_FILE: &str = "vault-config.toml";
pub const APP_DIR: &str = "encrypted-credential-vault";

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn default_paths() -> Paths {
    let base = data_dir();
    Paths {
        store_db: base.join("store.db").to_string_lossy().into_owned(),
        export_dir: base.join("exports").to_string_lossy().into_owned(),
    }
}

pub fn default_features() -> Features {
    Features {
        allow_insecure_export: true,
    }
}
