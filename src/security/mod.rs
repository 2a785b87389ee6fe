// src/security/mod.rs
//! Protective timers around an unlocked session
//!
//! `SecurityMonitor` is sans-IO: every method takes the current
//! `tokio::time::Instant`, and the event loop sleeps until `next_deadline()`
//! before calling `poll`. The session is passed in by reference and never
//! retained.

pub mod clipboard;
pub mod idle;
pub mod panic;
pub mod privacy;

pub use clipboard::{Clipboard, ClipboardGuard, MemoryClipboard};
pub use idle::IdleLock;
pub use panic::{Key, KeyEvent, PanicGesture};
pub use privacy::PrivacyBlur;

use tokio::time::Instant;
use tracing::{info, trace, warn};

use crate::enums::{ActivitySignal, FocusEvent};
use crate::error::ClipboardError;
use crate::session::VaultSession;
use crate::settings::SecuritySettings;

/// What a `poll` did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorReport {
    pub idle_locked: bool,
    pub clipboard_cleared: bool,
}

#[derive(Debug)]
pub struct SecurityMonitor {
    settings: SecuritySettings,
    idle: IdleLock,
    panic: PanicGesture,
    clipboard: ClipboardGuard,
    privacy: PrivacyBlur,
}

impl SecurityMonitor {
    pub fn new(settings: SecuritySettings) -> Self {
        Self {
            settings,
            idle: IdleLock::new(settings.idle_timeout()),
            panic: PanicGesture::new(settings.panic_key_enabled),
            clipboard: ClipboardGuard::new(settings.clipboard_timeout()),
            privacy: PrivacyBlur::new(settings.privacy_blur),
        }
    }

    pub fn settings(&self) -> &SecuritySettings {
        &self.settings
    }

    /// Adopt new settings. An armed idle deadline restarts from `now` under the
    /// new timeout; disabling a timer cancels it.
    pub fn apply_settings(&mut self, settings: SecuritySettings, session: &VaultSession, now: Instant) {
        self.settings = settings;
        self.idle.set_timeout(settings.idle_timeout());
        if session.is_unlocked() {
            self.idle.arm(now);
        } else {
            self.idle.disarm();
        }
        self.panic.set_enabled(settings.panic_key_enabled);
        self.clipboard.set_timeout(settings.clipboard_timeout());
        self.privacy.set_enabled(settings.privacy_blur);
        info!(
            idle_lock_minutes = settings.idle_lock_minutes,
            panic_key = settings.panic_key_enabled,
            clipboard_clear_seconds = settings.clipboard_clear_seconds,
            "security settings applied"
        );
    }

    pub fn on_unlocked(&mut self, now: Instant) {
        self.idle.arm(now);
    }

    pub fn on_locked(&mut self) {
        self.idle.disarm();
        self.panic.reset();
    }

    /// Any user activity postpones the idle lock while unlocked
    pub fn on_activity(&mut self, signal: ActivitySignal, session: &VaultSession, now: Instant) {
        if session.is_unlocked() {
            trace!(?signal, "activity");
            self.idle.arm(now);
        }
    }

    /// A key press counts as activity and may fire the panic gesture.
    /// Returns `true` if the vault was locked by it.
    pub fn on_key(&mut self, event: &KeyEvent, session: &mut VaultSession, now: Instant) -> bool {
        self.on_activity(ActivitySignal::KeyPress, session, now);
        if !self.panic.on_key(event, now) {
            return false;
        }
        warn!("panic gesture: locking vault");
        session.lock();
        self.on_locked();
        true
    }

    pub fn on_focus(&mut self, event: FocusEvent) {
        self.privacy.on_focus(event);
    }

    /// Whether the shell should hide secret values right now
    pub fn obscure_secrets(&self) -> bool {
        self.privacy.obscure()
    }

    /// Copy a secret to the clipboard under clipboard hygiene
    pub fn copy_secret(&mut self, clipboard: &mut dyn Clipboard, secret: &str, now: Instant) -> Result<(), ClipboardError> {
        self.clipboard.copy(clipboard, secret, now)
    }

    /// Fire every deadline that `now` has reached
    pub fn poll(&mut self, session: &mut VaultSession, clipboard: &mut dyn Clipboard, now: Instant) -> MonitorReport {
        let mut report = MonitorReport::default();

        if self.idle.expired(now) {
            info!("idle timeout reached: locking vault");
            session.lock();
            self.on_locked();
            report.idle_locked = true;
        }

        match self.clipboard.poll(clipboard, now) {
            Ok(cleared) => report.clipboard_cleared = cleared,
            Err(e) => warn!(error = %e, "clipboard clear failed"),
        }

        report
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.idle.deadline(), self.clipboard.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn idle_deadline(&self) -> Option<Instant> {
        self.idle.deadline()
    }
}
