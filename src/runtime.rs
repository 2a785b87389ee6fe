// src/runtime.rs
//! The vault event loop
//!
//! One task owns the session, the security monitor, the backup scheduler, a
//! store view and the clipboard. It multiplexes:
//! - shell events (activity, keys, focus, settings, commands) from an mpsc channel;
//! - completed off-thread imports;
//! - change notifications from the key-value store;
//! - the earliest pending timer deadline.
//!
//! Each event is handled to completion before the next one. Crypto never runs
//! on this task: imports finish through a `JoinSet`, exports on a spawned task.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::aliases::MasterPassword;
use crate::backup::BackupScheduler;
use crate::enums::{ActivitySignal, FocusEvent};
use crate::error::{CoreError, StoreError};
use crate::generator::{generate_password, GeneratorOptions};
use crate::model::{EntryId, EntryPatch, NewEntry, VaultData, VaultEntry};
use crate::security::{Clipboard, KeyEvent, SecurityMonitor};
use crate::session::{ExportedVault, ImportOutcome, ImportTicket, VaultSession};
use crate::settings::SecuritySettings;
use crate::store::{KeyValueStore, StoreChange};
use crate::vault_file::EncryptedVaultFile;

pub type Reply<T> = oneshot::Sender<Result<T, CoreError>>;

// how long to park when no timer is pending
const IDLE_PARK: Duration = Duration::from_secs(3600);

/// Input to the runtime
pub enum ShellEvent {
    Activity(ActivitySignal),
    Key(KeyEvent),
    Focus(FocusEvent),
    SettingsChanged(SecuritySettings),
    Command(Command),
    Shutdown,
}

/// A user action with its reply channel
pub enum Command {
    CreateNew {
        password: MasterPassword,
        reply: Reply<()>,
    },
    ImportFile {
        file: EncryptedVaultFile,
        password: MasterPassword,
        reply: Reply<ImportOutcome>,
    },
    ImportCsv {
        text: String,
        reply: oneshot::Sender<usize>,
    },
    ExportFile {
        password: MasterPassword,
        reply: Reply<ExportedVault>,
    },
    ExportCsv {
        reply: Reply<String>,
    },
    Lock {
        reply: oneshot::Sender<()>,
    },
    AddEntry {
        fields: NewEntry,
        reply: Reply<EntryId>,
    },
    UpdateEntry {
        id: EntryId,
        patch: EntryPatch,
        reply: Reply<bool>,
    },
    DeleteEntry {
        id: EntryId,
        reply: oneshot::Sender<bool>,
    },
    /// Copy an entry's password under clipboard hygiene; `false` if no such entry
    CopyPassword {
        id: EntryId,
        reply: Reply<bool>,
    },
    /// Generate a password straight into the clipboard
    GeneratePassword {
        length: usize,
        options: GeneratorOptions,
        reply: Reply<()>,
    },
    ListEntries {
        query: String,
        reply: oneshot::Sender<Vec<EntrySummary>>,
    },
    Status {
        reply: oneshot::Sender<SessionStatus>,
    },
}

/// Listing row, without the password or notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySummary {
    pub id: EntryId,
    pub title: String,
    pub username: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&VaultEntry> for EntrySummary {
    fn from(entry: &VaultEntry) -> Self {
        Self {
            id: entry.id.clone(),
            title: entry.title.clone(),
            username: entry.username.clone(),
            url: entry.url.clone(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub locked: bool,
    pub entries: usize,
    pub epoch: u64,
    pub obscure_secrets: bool,
    pub backup_enabled: bool,
}

type ImportDone = (ImportTicket, Result<VaultData, CoreError>, Reply<ImportOutcome>);

pub struct VaultRuntime<S: KeyValueStore, C: Clipboard + 'static> {
    session: VaultSession,
    monitor: SecurityMonitor,
    backup: BackupScheduler<S>,
    clipboard: C,
    events: mpsc::UnboundedReceiver<ShellEvent>,
    imports: JoinSet<ImportDone>,
}

impl<S: KeyValueStore, C: Clipboard + 'static> VaultRuntime<S, C> {
    /// Build a runtime around a locked session. Drive it with [`run`](Self::run).
    pub fn new(settings: SecuritySettings, store: S, clipboard: C) -> (Self, RuntimeHandle) {
        let (tx, events) = mpsc::unbounded_channel();
        let runtime = Self {
            session: VaultSession::new(),
            monitor: SecurityMonitor::new(settings),
            backup: BackupScheduler::new(store, &settings),
            clipboard,
            events,
            imports: JoinSet::new(),
        };
        (runtime, RuntimeHandle { tx })
    }

    /// Process events until `Shutdown` or every handle is dropped.
    /// The session is locked on the way out.
    pub async fn run(mut self) {
        info!("vault runtime started");
        let mut changes = self.backup.subscribe();
        let mut store_open = true;

        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(ShellEvent::Shutdown) | None => break,
                    Some(event) => self.handle_event(event),
                },
                Some(joined) = self.imports.join_next(), if !self.imports.is_empty() => {
                    self.complete_import(joined);
                }
                change = changes.recv(), if store_open => match change {
                    Ok(change) => self.handle_store_change(&change),
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "store notifications lagged, resyncing");
                        let now = Instant::now();
                        log_store(self.backup.resync(&self.session, now));
                    }
                    Err(RecvError::Closed) => store_open = false,
                },
                _ = time::sleep_until(deadline.unwrap_or_else(|| Instant::now() + IDLE_PARK)), if deadline.is_some() => {
                    self.handle_timers();
                }
            }
        }

        self.session.lock();
        self.monitor.on_locked();
        self.backup.on_locked();
        info!("vault runtime stopped");
    }

    fn next_deadline(&self) -> Option<Instant> {
        match (self.monitor.next_deadline(), self.backup.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Tell monitor and scheduler when the working set was replaced or dropped
    fn sync_observers(&mut self, epoch_before: u64, now: Instant) {
        if self.session.epoch() == epoch_before {
            return;
        }
        if self.session.is_unlocked() {
            self.monitor.on_unlocked(now);
            log_store(self.backup.on_unlocked(&self.session, now));
        } else {
            self.monitor.on_locked();
            self.backup.on_locked();
        }
    }

    fn transition<T>(&mut self, now: Instant, f: impl FnOnce(&mut VaultSession) -> T) -> T {
        let before = self.session.epoch();
        let out = f(&mut self.session);
        self.sync_observers(before, now);
        out
    }

    fn mutated(&mut self, now: Instant) {
        log_store(self.backup.on_mutation(&self.session, now));
    }

    fn handle_event(&mut self, event: ShellEvent) {
        let now = Instant::now();
        match event {
            ShellEvent::Activity(signal) => self.monitor.on_activity(signal, &self.session, now),
            ShellEvent::Key(key) => {
                let before = self.session.epoch();
                self.monitor.on_key(&key, &mut self.session, now);
                self.sync_observers(before, now);
            }
            ShellEvent::Focus(focus) => self.monitor.on_focus(focus),
            ShellEvent::SettingsChanged(settings) => {
                self.monitor.apply_settings(settings, &self.session, now);
                log_store(self.backup.apply_settings(&settings, &self.session, now));
            }
            ShellEvent::Command(command) => self.handle_command(command, now),
            // handled by the loop
            ShellEvent::Shutdown => {}
        }
    }

    fn handle_command(&mut self, command: Command, now: Instant) {
        match command {
            Command::CreateNew { password, reply } => {
                let result = self.transition(now, |s| s.create_new(&password));
                let _ = reply.send(result);
            }
            Command::ImportFile {
                file,
                password,
                reply,
            } => {
                let pending = self.session.begin_import(file, password);
                self.imports.spawn(async move {
                    let (ticket, result) = pending.wait().await;
                    (ticket, result, reply)
                });
            }
            Command::ImportCsv { text, reply } => {
                let count = self.transition(now, |s| s.import_from_csv(&text));
                let _ = reply.send(count);
            }
            Command::ExportFile { password, reply } => match self.session.begin_export(password) {
                Ok(pending) => {
                    tokio::spawn(async move {
                        let result = pending.wait().await;
                        if let Ok(exported) = &result {
                            info!(filename = %exported.filename, "vault exported");
                        }
                        let _ = reply.send(result);
                    });
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            },
            Command::ExportCsv { reply } => {
                let _ = reply.send(self.session.export_csv());
            }
            Command::Lock { reply } => {
                self.transition(now, VaultSession::lock);
                let _ = reply.send(());
            }
            Command::AddEntry { fields, reply } => {
                let result = self.session.add_entry(fields);
                if result.is_ok() {
                    self.mutated(now);
                }
                let _ = reply.send(result);
            }
            Command::UpdateEntry { id, patch, reply } => {
                let result = self.session.update_entry(&id, patch);
                if matches!(result, Ok(true)) {
                    self.mutated(now);
                }
                let _ = reply.send(result);
            }
            Command::DeleteEntry { id, reply } => {
                let removed = self.session.delete_entry(&id);
                if removed {
                    self.mutated(now);
                }
                let _ = reply.send(removed);
            }
            Command::CopyPassword { id, reply } => {
                let result = match self.session.entry(&id) {
                    Some(entry) => self
                        .monitor
                        .copy_secret(&mut self.clipboard, &entry.password, now)
                        .map(|()| true)
                        .map_err(CoreError::from),
                    None => Ok(false),
                };
                let _ = reply.send(result);
            }
            Command::GeneratePassword {
                length,
                options,
                reply,
            } => {
                let password = generate_password(length, options);
                let result = self
                    .monitor
                    .copy_secret(&mut self.clipboard, password.expose_secret(), now)
                    .map_err(CoreError::from);
                let _ = reply.send(result);
            }
            Command::ListEntries { query, reply } => {
                let rows = self.session.search(&query).into_iter().map(EntrySummary::from).collect();
                let _ = reply.send(rows);
            }
            Command::Status { reply } => {
                let _ = reply.send(SessionStatus {
                    locked: self.session.is_locked(),
                    entries: self.session.entries().len(),
                    epoch: self.session.epoch(),
                    obscure_secrets: self.monitor.obscure_secrets(),
                    backup_enabled: self.backup.is_enabled(),
                });
            }
        }
    }

    fn complete_import(&mut self, joined: Result<ImportDone, JoinError>) {
        let (ticket, result, reply) = match joined {
            Ok(done) => done,
            Err(e) => {
                warn!(error = %e, "import task aborted");
                return;
            }
        };
        let now = Instant::now();
        let outcome = self.transition(now, |s| s.finish_import(ticket, result));
        let _ = reply.send(outcome);
    }

    fn handle_store_change(&mut self, change: &StoreChange) {
        if change.origin == self.backup.store().view_id() {
            return;
        }
        debug!(key = %change.key, "store change from another view");
        let now = Instant::now();
        log_store(self.backup.on_store_change(change, &self.session, now));
    }

    fn handle_timers(&mut self) {
        let now = Instant::now();
        let before = self.session.epoch();
        let report = self.monitor.poll(&mut self.session, &mut self.clipboard, now);
        self.sync_observers(before, now);
        if report.clipboard_cleared {
            debug!("clipboard hygiene fired");
        }
        log_store(self.backup.poll(&self.session, now));
    }
}

fn log_store(result: Result<bool, StoreError>) {
    if let Err(e) = result {
        warn!(error = %e, "backup snapshot failed");
    }
}

/// Cloneable async front end to a running [`VaultRuntime`]
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    tx: mpsc::UnboundedSender<ShellEvent>,
}

impl RuntimeHandle {
    pub fn send(&self, event: ShellEvent) -> Result<(), CoreError> {
        self.tx.send(event).map_err(|_| CoreError::RuntimeClosed)
    }

    pub fn activity(&self, signal: ActivitySignal) -> Result<(), CoreError> {
        self.send(ShellEvent::Activity(signal))
    }

    pub fn key(&self, event: KeyEvent) -> Result<(), CoreError> {
        self.send(ShellEvent::Key(event))
    }

    pub fn focus(&self, event: FocusEvent) -> Result<(), CoreError> {
        self.send(ShellEvent::Focus(event))
    }

    pub fn settings_changed(&self, settings: SecuritySettings) -> Result<(), CoreError> {
        self.send(ShellEvent::SettingsChanged(settings))
    }

    pub fn shutdown(&self) -> Result<(), CoreError> {
        self.send(ShellEvent::Shutdown)
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, CoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(ShellEvent::Command(make(reply)))?;
        rx.await.map_err(|_| CoreError::RuntimeClosed)
    }

    pub async fn create_new(&self, password: MasterPassword) -> Result<(), CoreError> {
        self.request(|reply| Command::CreateNew { password, reply }).await?
    }

    pub async fn import_file(
        &self,
        file: EncryptedVaultFile,
        password: MasterPassword,
    ) -> Result<ImportOutcome, CoreError> {
        self.request(|reply| Command::ImportFile {
            file,
            password,
            reply,
        })
        .await?
    }

    pub async fn import_csv(&self, text: impl Into<String>) -> Result<usize, CoreError> {
        let text = text.into();
        self.request(|reply| Command::ImportCsv { text, reply }).await
    }

    pub async fn export_file(&self, password: MasterPassword) -> Result<ExportedVault, CoreError> {
        self.request(|reply| Command::ExportFile { password, reply }).await?
    }

    pub async fn export_csv(&self) -> Result<String, CoreError> {
        self.request(|reply| Command::ExportCsv { reply }).await?
    }

    pub async fn lock(&self) -> Result<(), CoreError> {
        self.request(|reply| Command::Lock { reply }).await
    }

    pub async fn add_entry(&self, fields: NewEntry) -> Result<EntryId, CoreError> {
        self.request(|reply| Command::AddEntry { fields, reply }).await?
    }

    pub async fn update_entry(&self, id: EntryId, patch: EntryPatch) -> Result<bool, CoreError> {
        self.request(|reply| Command::UpdateEntry { id, patch, reply }).await?
    }

    pub async fn delete_entry(&self, id: EntryId) -> Result<bool, CoreError> {
        self.request(|reply| Command::DeleteEntry { id, reply }).await
    }

    pub async fn copy_password(&self, id: EntryId) -> Result<bool, CoreError> {
        self.request(|reply| Command::CopyPassword { id, reply }).await?
    }

    pub async fn generate_password(&self, length: usize, options: GeneratorOptions) -> Result<(), CoreError> {
        self.request(|reply| Command::GeneratePassword {
            length,
            options,
            reply,
        })
        .await?
    }

    pub async fn list_entries(&self, query: impl Into<String>) -> Result<Vec<EntrySummary>, CoreError> {
        let query = query.into();
        self.request(|reply| Command::ListEntries { query, reply }).await
    }

    pub async fn status(&self) -> Result<SessionStatus, CoreError> {
        self.request(|reply| Command::Status { reply }).await
    }
}
