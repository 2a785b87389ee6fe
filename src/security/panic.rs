// src/security/panic.rs
//! Panic gesture: Ctrl+Shift+L, or Escape twice in quick succession

use std::time::Duration;

use tokio::time::Instant;

use crate::consts::PANIC_DOUBLE_PRESS_WINDOW;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Char(char),
    Other,
}

/// A key press with its modifier state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
        }
    }

    pub fn ctrl_shift(key: Key) -> Self {
        Self {
            ctrl: true,
            shift: true,
            ..Self::plain(key)
        }
    }

    fn is_lock_chord(&self) -> bool {
        self.ctrl && self.shift && matches!(self.key, Key::Char(c) if c.eq_ignore_ascii_case(&'l'))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PanicGesture {
    enabled: bool,
    window: Duration,
    last_escape: Option<Instant>,
}

impl PanicGesture {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            window: PANIC_DOUBLE_PRESS_WINDOW,
            last_escape: None,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.last_escape = None;
    }

    pub fn reset(&mut self) {
        self.last_escape = None;
    }

    /// Feed one key press; returns `true` when the gesture fires.
    pub fn on_key(&mut self, event: &KeyEvent, now: Instant) -> bool {
        if !self.enabled {
            return false;
        }
        if event.is_lock_chord() {
            self.last_escape = None;
            return true;
        }
        if event.key != Key::Escape {
            return false;
        }
        match self.last_escape.replace(now) {
            Some(prev) if now.saturating_duration_since(prev) < self.window => {
                // the next double press starts from scratch
                self.last_escape = None;
                true
            }
            _ => false,
        }
    }
}
