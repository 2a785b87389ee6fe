// src/config/app.rs
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::{debug, warn};

use super::defaults::*;
use crate::error::ConfigError;
use crate::settings::SecuritySettings;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub security: SecuritySettings,
    pub paths: Paths,
    pub features: Features,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            security: SecuritySettings::default(),
            paths: default_paths(),
            features: default_features(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// SQLite key-value store (settings + auto-backup)
    pub store_db: String,
    /// Where `vault-tool` writes exports when no path is given
    pub export_dir: String,
}

impl Default for Paths {
    fn default() -> Self {
        default_paths()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Permit plaintext CSV export (still requires confirmation)
    pub allow_insecure_export: bool,
}

impl Default for Features {
    fn default() -> Self {
        default_features()
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Parse a config file; missing sections and keys take their defaults
pub fn load_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(toml::from_str(&content)?)
}

/// The process-wide config, loaded on first use
pub fn load() -> &'static Config {
    CONFIG.get_or_init(|| {
        let config_path =
            std::env::var("ECV_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut conf = if Path::new(&config_path).exists() {
            match load_from(&config_path) {
                Ok(conf) => {
                    debug!(path = %config_path, "config loaded");
                    conf
                }
                Err(e) => {
                    warn!(path = %config_path, error = %e, "invalid config, using built-in defaults");
                    Config::default()
                }
            }
        } else {
            warn!(path = %config_path, "config file not found, using built-in defaults");
            Config::default()
        };

        // Test isolation override
        if let Ok(db) = std::env::var("ECV_STORE_DB") {
            conf.paths.store_db = db;
        }

        conf
    })
}
