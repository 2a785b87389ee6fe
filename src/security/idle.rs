// src/security/idle.rs
//! Inactivity deadline

use std::time::Duration;

use tokio::time::Instant;

/// A single rearmable deadline. Disarmed while locked or when disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleLock {
    timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl IdleLock {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    /// Push the deadline to `now + timeout`; no-op when disabled
    pub fn arm(&mut self, now: Instant) {
        self.deadline = self.timeout.map(|t| now + t);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once `now` has reached the deadline
    pub fn expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }
}
