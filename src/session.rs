// src/session.rs
//! The locked/unlocked vault state machine
//!
//! `VaultSession` is the only owner of decrypted records. Locking drops the
//! `VaultData`, which zeroizes every plaintext field on the way out.
//!
//! Crypto-bound operations come in two shapes:
//! - `import_from_file` / `export_to_file`: plain `async fn`s for callers that
//!   can hold the session across the suspension;
//! - `begin_import` + `finish_import` / `begin_export`: split halves for an
//!   event loop that must keep handling input (and possibly lock) while the key
//!   derivation runs on the blocking pool.

use std::fmt;

use chrono::{NaiveDate, Utc};
use tokio::task::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::aliases::MasterPassword;
use crate::crypto;
use crate::error::{CoreError, ValidationError, VaultOpenError};
use crate::export;
use crate::import;
use crate::model::{EntryId, EntryPatch, NewEntry, VaultData, VaultEntry};
use crate::vault_file::{export_filename, EncryptedVaultFile};

pub type Result<T> = std::result::Result<T, CoreError>;

enum SessionState {
    Locked,
    Unlocked(VaultData),
}

pub struct VaultSession {
    state: SessionState,
    // bumped whenever the working set is replaced or discarded
    epoch: u64,
}

/// Captures the session epoch when an import starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTicket {
    epoch: u64,
}

/// What `finish_import` did with a decrypted payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Applied { entries: usize },
    /// The session was locked or replaced while decrypting; result dropped
    Discarded,
}

/// An import whose decryption is running on the blocking pool
pub struct PendingImport {
    ticket: ImportTicket,
    task: JoinHandle<std::result::Result<VaultData, VaultOpenError>>,
}

impl PendingImport {
    pub fn ticket(&self) -> ImportTicket {
        self.ticket
    }

    pub async fn wait(self) -> (ImportTicket, Result<VaultData>) {
        let result = match self.task.await {
            Ok(decrypted) => decrypted.map_err(CoreError::from),
            Err(_) => Err(CoreError::TaskFailed),
        };
        (self.ticket, result)
    }
}

/// An export that captured its data and password when it started
pub struct PendingExport {
    date: NaiveDate,
    task: JoinHandle<Result<EncryptedVaultFile>>,
}

impl PendingExport {
    pub async fn wait(self) -> Result<ExportedVault> {
        let file = self.task.await.map_err(|_| CoreError::TaskFailed)??;
        let bytes = file.to_json()?;
        Ok(ExportedVault {
            filename: export_filename(self.date),
            bytes,
            file,
        })
    }
}

/// Result of `export_to_file`: the JSON bytes to save and a dated filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedVault {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub file: EncryptedVaultFile,
}

impl Default for VaultSession {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultSession {
    /// A fresh session starts locked
    pub fn new() -> Self {
        Self {
            state: SessionState::Locked,
            epoch: 0,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state, SessionState::Locked)
    }

    pub fn is_unlocked(&self) -> bool {
        !self.is_locked()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The decrypted payload, if unlocked
    pub fn data(&self) -> Option<&VaultData> {
        match &self.state {
            SessionState::Unlocked(data) => Some(data),
            SessionState::Locked => None,
        }
    }

    /// Entries, most recent first; empty while locked
    pub fn entries(&self) -> &[VaultEntry] {
        self.data().map(|d| d.entries.as_slice()).unwrap_or(&[])
    }

    pub fn entry(&self, id: &EntryId) -> Option<&VaultEntry> {
        self.entries().iter().find(|e| &e.id == id)
    }

    /// Case-insensitive match over title, username, url and notes
    pub fn search(&self, query: &str) -> Vec<&VaultEntry> {
        let needle = query.trim().to_lowercase();
        self.entries()
            .iter()
            .filter(|e| needle.is_empty() || e.matches(&needle))
            .collect()
    }

    fn replace(&mut self, data: VaultData) {
        // the previous VaultData (if any) is dropped and zeroized here
        self.state = SessionState::Unlocked(data);
        self.epoch += 1;
    }

    fn data_mut(&mut self) -> Option<&mut VaultData> {
        match &mut self.state {
            SessionState::Unlocked(data) => Some(data),
            SessionState::Locked => None,
        }
    }

    /// Start an empty vault. The password is only needed later, for export.
    pub fn create_new(&mut self, password: &MasterPassword) -> Result<()> {
        if password.expose_secret().is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }
        self.replace(VaultData::default());
        info!("new vault created in memory");
        Ok(())
    }

    /// Replace the working set with records parsed from CSV text. Never fails.
    pub fn import_from_csv(&mut self, text: &str) -> usize {
        let entries = import::csv::parse(text);
        let count = entries.len();
        self.replace(VaultData::new(entries));
        info!(entries = count, "vault imported from CSV");
        count
    }

    /// Start decrypting `file` off the event loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn begin_import(&self, file: EncryptedVaultFile, password: MasterPassword) -> PendingImport {
        debug!(version = file.version, "vault import started");
        PendingImport {
            ticket: ImportTicket { epoch: self.epoch },
            task: task::spawn_blocking(move || crypto::decrypt(&file, &password)),
        }
    }

    /// Apply a finished import. Failures leave the session untouched; a result
    /// that arrives after an intervening lock or replacement is discarded.
    pub fn finish_import(&mut self, ticket: ImportTicket, result: Result<VaultData>) -> Result<ImportOutcome> {
        let data = result?;
        if ticket.epoch != self.epoch {
            warn!("vault import finished after a lock or replacement, result discarded");
            return Ok(ImportOutcome::Discarded);
        }
        let entries = data.len();
        self.replace(data);
        info!(entries, "vault decrypted and unlocked");
        Ok(ImportOutcome::Applied { entries })
    }

    /// Decrypt `file` and replace the working set with its contents.
    pub async fn import_from_file(
        &mut self,
        file: EncryptedVaultFile,
        password: MasterPassword,
    ) -> Result<ImportOutcome> {
        let (ticket, result) = self.begin_import(file, password).wait().await;
        self.finish_import(ticket, result)
    }

    /// Validate and start encrypting a snapshot of the current entries.
    ///
    /// The snapshot and password are captured by value now, so a lock that
    /// happens before the export finishes does not affect it.
    pub fn begin_export(&self, password: MasterPassword) -> Result<PendingExport> {
        let data = self.data().ok_or(CoreError::NoVault)?.clone();
        if password.expose_secret().is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }
        debug!(entries = data.len(), "vault export started");
        Ok(PendingExport {
            date: Utc::now().date_naive(),
            task: task::spawn_blocking(move || crypto::encrypt(&data, &password)),
        })
    }

    /// Encrypt the current entries into a portable vault file.
    pub async fn export_to_file(&self, password: MasterPassword) -> Result<ExportedVault> {
        let exported = self.begin_export(password)?.wait().await?;
        info!(filename = %exported.filename, "vault exported");
        Ok(exported)
    }

    /// Plaintext CSV of the current entries, only for explicit user export
    pub fn export_csv(&self) -> Result<String> {
        let data = self.data().ok_or(CoreError::NoVault)?;
        warn!(entries = data.len(), "exporting vault as plaintext CSV");
        export::csv::to_csv(&data.entries)
    }

    /// Discard the decrypted entries. Idempotent.
    pub fn lock(&mut self) {
        if self.is_unlocked() {
            info!("vault locked");
        }
        self.state = SessionState::Locked;
        self.epoch += 1;
    }

    /// Prepend a new entry; returns its generated id
    pub fn add_entry(&mut self, fields: NewEntry) -> Result<EntryId> {
        let Some(data) = self.data_mut() else {
            warn!("add_entry rejected: vault is locked");
            return Err(CoreError::NoVault);
        };
        fields.validate()?;
        let entry = VaultEntry::create(fields);
        let id = entry.id.clone();
        data.entries.insert(0, entry);
        debug!(%id, "entry added");
        Ok(id)
    }

    /// Merge `patch` into the entry with `id`.
    ///
    /// Returns `Ok(false)` when locked or when `id` is unknown: a stale UI
    /// reference, not a failure.
    pub fn update_entry(&mut self, id: &EntryId, patch: EntryPatch) -> Result<bool> {
        let Some(data) = self.data_mut() else {
            return Ok(false);
        };
        patch.validate()?;
        match data.entries.iter_mut().find(|e| &e.id == id) {
            Some(entry) => {
                entry.apply(patch);
                debug!(%id, "entry updated");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove the entry with `id`; `false` if locked or absent
    pub fn delete_entry(&mut self, id: &EntryId) -> bool {
        let Some(data) = self.data_mut() else {
            return false;
        };
        let before = data.entries.len();
        data.entries.retain(|e| &e.id != id);
        let removed = data.entries.len() != before;
        if removed {
            debug!(%id, "entry deleted");
        }
        removed
    }
}

impl fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultSession")
            .field("locked", &self.is_locked())
            .field("entries", &self.entries().len())
            .field("epoch", &self.epoch)
            .finish()
    }
}
