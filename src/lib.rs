// src/lib.rs
//! encrypted-credential-vault: a local, password-encrypted credential vault
//!
//! Features:
//! - PBKDF2-HMAC-SHA256 + AES-256-GCM portable vault files (`{v, s, iv, ct}`)
//! - Locked/unlocked session with zeroize-on-drop plaintext
//! - Idle lock, panic gesture, clipboard hygiene and privacy blur
//! - Periodic local snapshots into a SQLite key-value store
//! - CSV import/export and a password generator
//! - `secrecy`-backed wrappers for passwords and keys

pub mod aliases;
pub mod backup;
pub mod config;
pub mod consts;
pub mod crypto;
pub mod enums;
pub mod error;
pub mod export;
pub mod generator;
pub mod import;
#[cfg(feature = "logging")]
pub mod logging;
pub mod model;
pub mod runtime;
pub mod security;
pub mod session;
pub mod settings;
pub mod store;
pub mod vault_file;

// Re-export everything users need at the crate root
pub use aliases::{DerivedKey32, GeneratedPassword, MasterPassword};
pub use backup::BackupScheduler;
pub use config::load as load_config;
pub use crypto::{decrypt, decrypt_async, encrypt, encrypt_async};
pub use enums::{ActivitySignal, FocusEvent, FormatVersion};
pub use error::{ClipboardError, ConfigError, CoreError, StoreError, ValidationError, VaultOpenError};
pub use generator::{generate_password, GeneratorOptions};
pub use model::{EntryId, EntryPatch, NewEntry, VaultData, VaultEntry};
pub use runtime::{RuntimeHandle, ShellEvent, VaultRuntime};
pub use security::{Clipboard, Key, KeyEvent, MemoryClipboard, SecurityMonitor};
pub use session::{ExportedVault, ImportOutcome, Result as CoreResult, VaultSession};
pub use settings::SecuritySettings;
pub use store::{ChangeValue, KeyValueStore, MemoryStore, SqliteStore, StoreChange};
pub use vault_file::EncryptedVaultFile;
