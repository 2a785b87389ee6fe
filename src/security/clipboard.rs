// src/security/clipboard.rs
//! Clipboard hygiene
//!
//! The guard never stores the copied secret. It keeps a BLAKE3 fingerprint and
//! clears the clipboard at the deadline only if the contents still match.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::ClipboardError;

/// System clipboard collaborator
pub trait Clipboard: Send {
    fn read_text(&mut self) -> Result<Option<String>, ClipboardError>;
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// In-process clipboard. Clones share the same contents.
#[derive(Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<Zeroizing<String>>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&mut self) -> Result<Option<String>, ClipboardError> {
        let guard = self
            .contents
            .lock()
            .map_err(|_| ClipboardError::Unavailable("clipboard lock poisoned".into()))?;
        Ok(guard.as_ref().map(|s| s.to_string()))
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut guard = self
            .contents
            .lock()
            .map_err(|_| ClipboardError::Unavailable("clipboard lock poisoned".into()))?;
        *guard = Some(Zeroizing::new(text.to_owned()));
        Ok(())
    }
}

impl fmt::Debug for MemoryClipboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MemoryClipboard([REDACTED])")
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingClear {
    fingerprint: blake3::Hash,
    due: Instant,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClipboardGuard {
    timeout: Option<Duration>,
    pending: Option<PendingClear>,
}

impl ClipboardGuard {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            pending: None,
        }
    }

    /// A disabled timeout also cancels a pending clear
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
        if timeout.is_none() {
            self.pending = None;
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    /// Write `secret` to the clipboard and schedule its removal.
    pub fn copy(&mut self, clipboard: &mut dyn Clipboard, secret: &str, now: Instant) -> Result<(), ClipboardError> {
        clipboard.write_text(secret)?;
        self.pending = self.timeout.map(|t| PendingClear {
            fingerprint: blake3::hash(secret.as_bytes()),
            due: now + t,
        });
        Ok(())
    }

    /// Clear the clipboard if the deadline passed and it still holds our secret.
    /// Returns `true` if it was cleared.
    pub fn poll(&mut self, clipboard: &mut dyn Clipboard, now: Instant) -> Result<bool, ClipboardError> {
        let Some(pending) = self.pending else {
            return Ok(false);
        };
        if now < pending.due {
            return Ok(false);
        }
        self.pending = None;

        let current = clipboard.read_text()?.map(Zeroizing::new);
        let unchanged = current
            .as_ref()
            .is_some_and(|text| blake3::hash(text.as_bytes()) == pending.fingerprint);
        if !unchanged {
            debug!("clipboard changed since copy, left alone");
            return Ok(false);
        }
        clipboard.write_text("")?;
        debug!("clipboard cleared");
        Ok(true)
    }
}
