// src/backup.rs
//! Periodic local snapshots of the unlocked vault
//!
//! SECURITY WARNING: the snapshot written to `vault-backup-entries` is the
//! plaintext `{"entries": [...]}` payload, passwords included. It is only as
//! safe as the store it lands in. Disable `auto_backup_enabled` (or set the
//! `auto-backup-enabled` store key to `"false"`) where that is not acceptable.
//!
//! Cadence: a snapshot is taken as soon as the vault unlocks or changes, then
//! every [`BACKUP_INTERVAL`] while it stays unlocked and enabled.

use chrono::{SecondsFormat, Utc};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::consts::{AUTO_BACKUP_ENABLED_KEY, BACKUP_ENTRIES_KEY, BACKUP_INTERVAL, BACKUP_TIMESTAMP_KEY};
use crate::error::StoreError;
use crate::session::VaultSession;
use crate::settings::SecuritySettings;
use crate::store::{KeyValueStore, StoreChange};

pub struct BackupScheduler<S: KeyValueStore> {
    store: S,
    setting_enabled: bool,
    // `Some(false)` when the store key says "false"; otherwise defer to the setting
    store_flag: Option<bool>,
    next_due: Option<Instant>,
    warned_plaintext: bool,
}

/// Read the cross-view toggle: only the literal "false" disables
fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value {
        Some("false") => Some(false),
        _ => None,
    }
}

impl<S: KeyValueStore> BackupScheduler<S> {
    pub fn new(store: S, settings: &SecuritySettings) -> Self {
        let mut scheduler = Self {
            store,
            setting_enabled: settings.auto_backup_enabled,
            store_flag: None,
            next_due: None,
            warned_plaintext: false,
        };
        scheduler.reload_flag();
        scheduler
    }

    fn reload_flag(&mut self) {
        self.store_flag = match self.store.get(AUTO_BACKUP_ENABLED_KEY) {
            Ok(value) => parse_flag(value.as_deref()),
            Err(e) => {
                warn!(error = %e, "could not read auto-backup flag, using setting");
                None
            }
        };
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_enabled(&self) -> bool {
        self.store_flag.unwrap_or(self.setting_enabled)
    }

    /// When the next recurring snapshot is due, if one is scheduled
    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Change notifications for the enable flag
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.store.subscribe()
    }

    pub fn on_unlocked(&mut self, session: &VaultSession, now: Instant) -> Result<bool, StoreError> {
        self.snapshot_and_reschedule(session, now)
    }

    /// The working set changed: snapshot now and restart the cadence
    pub fn on_mutation(&mut self, session: &VaultSession, now: Instant) -> Result<bool, StoreError> {
        self.snapshot_and_reschedule(session, now)
    }

    pub fn on_locked(&mut self) {
        if self.next_due.take().is_some() {
            debug!("backup schedule cancelled by lock");
        }
    }

    /// Take the recurring snapshot if it is due
    pub fn poll(&mut self, session: &VaultSession, now: Instant) -> Result<bool, StoreError> {
        match self.next_due {
            Some(due) if now >= due => self.snapshot_and_reschedule(session, now),
            _ => Ok(false),
        }
    }

    /// React to a write from any view of the store
    pub fn on_store_change(
        &mut self,
        change: &StoreChange,
        session: &VaultSession,
        now: Instant,
    ) -> Result<bool, StoreError> {
        if change.key != AUTO_BACKUP_ENABLED_KEY {
            return Ok(false);
        }
        self.store_flag = parse_flag(change.value.as_str());
        self.reconcile(session, now)
    }

    /// Re-read the flag from the store, e.g. after missing notifications
    pub fn resync(&mut self, session: &VaultSession, now: Instant) -> Result<bool, StoreError> {
        self.reload_flag();
        self.reconcile(session, now)
    }

    pub fn apply_settings(
        &mut self,
        settings: &SecuritySettings,
        session: &VaultSession,
        now: Instant,
    ) -> Result<bool, StoreError> {
        self.setting_enabled = settings.auto_backup_enabled;
        self.reconcile(session, now)
    }

    fn reconcile(&mut self, session: &VaultSession, now: Instant) -> Result<bool, StoreError> {
        match (self.is_enabled(), self.next_due.is_some()) {
            (false, true) => {
                self.next_due = None;
                info!("auto-backup disabled");
                Ok(false)
            }
            (true, false) if session.is_unlocked() => {
                info!("auto-backup enabled");
                self.snapshot_and_reschedule(session, now)
            }
            _ => Ok(false),
        }
    }

    fn snapshot_and_reschedule(&mut self, session: &VaultSession, now: Instant) -> Result<bool, StoreError> {
        if !self.is_enabled() || session.is_locked() {
            self.next_due = None;
            return Ok(false);
        }
        // keep the cadence even if this write fails
        self.next_due = Some(now + BACKUP_INTERVAL);
        self.snapshot(session)
    }

    /// Write the plaintext snapshot and its timestamp. No-op while locked.
    pub fn snapshot(&mut self, session: &VaultSession) -> Result<bool, StoreError> {
        let Some(data) = session.data() else {
            return Ok(false);
        };
        let json = Zeroizing::new(serde_json::to_string(data)?);
        self.store.set(BACKUP_ENTRIES_KEY, &json)?;
        self.store.set(
            BACKUP_TIMESTAMP_KEY,
            &Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;

        if !self.warned_plaintext {
            warn!("auto-backup stores vault entries unencrypted in the local store");
            self.warned_plaintext = true;
        }
        debug!(entries = data.len(), "backup snapshot written");
        Ok(true)
    }
}
