// src/consts.rs
//! Shared constants: security parameters, storage keys and timer defaults

use std::time::Duration;

/// Current encrypted vault file version written by `encrypt`
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// PBKDF2-HMAC-SHA256 rounds bound to format v1
// Raise only together with a new format version; old files must stay readable
pub const V1_PBKDF2_ITERATIONS: u32 = 250_000;

/// Salt length in bytes (fresh per encryption)
pub const SALT_LEN: usize = 16;

/// AES-GCM nonce length in bytes (fresh per encryption)
pub const NONCE_LEN: usize = 12;

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;

/// GCM authentication tag appended to the ciphertext
pub const TAG_LEN: usize = 16;

/// Export filename parts: `vault-YYYY-MM-DD.vault.json`
pub const EXPORT_FILENAME_PREFIX: &str = "vault-";
pub const EXPORT_FILENAME_SUFFIX: &str = ".vault.json";

/// Key-value store: plaintext snapshot of the unlocked entry set
pub const BACKUP_ENTRIES_KEY: &str = "vault-backup-entries";

/// Key-value store: ISO-8601 time of the last snapshot
pub const BACKUP_TIMESTAMP_KEY: &str = "vault-backup-timestamp";

/// Key-value store: auto-backup toggle owned by the settings view (read-only here)
pub const AUTO_BACKUP_ENABLED_KEY: &str = "auto-backup-enabled";

/// Cadence of the recurring backup snapshot
pub const BACKUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Two panic-key presses closer than this lock the vault
pub const PANIC_DOUBLE_PRESS_WINDOW: Duration = Duration::from_millis(500);

/// CSV export header, in column order
pub const CSV_EXPORT_HEADER: [&str; 6] = ["title", "username", "url", "password", "notes", "createdAt"];

/// Buffered store change notifications per subscriber before it lags
pub const STORE_CHANNEL_CAPACITY: usize = 64;
