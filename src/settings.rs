// src/settings.rs
//! User-tunable security settings
//!
//! Owned by the settings collaborator; the core only reads them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Minutes of inactivity before the vault locks; 0 disables
    pub idle_lock_minutes: u32,
    /// Ctrl+Shift+L / double Escape lock the vault
    pub panic_key_enabled: bool,
    /// Seconds before a copied secret is wiped from the clipboard; 0 disables
    pub clipboard_clear_seconds: u32,
    pub auto_backup_enabled: bool,
    /// Hide secrets while the window is unfocused
    pub privacy_blur: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            idle_lock_minutes: 5,
            panic_key_enabled: true,
            clipboard_clear_seconds: 30,
            auto_backup_enabled: true,
            privacy_blur: true,
        }
    }
}

impl SecuritySettings {
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_lock_minutes > 0).then(|| Duration::from_secs(u64::from(self.idle_lock_minutes) * 60))
    }

    pub fn clipboard_timeout(&self) -> Option<Duration> {
        (self.clipboard_clear_seconds > 0).then(|| Duration::from_secs(u64::from(self.clipboard_clear_seconds)))
    }
}
