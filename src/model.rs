// src/model.rs
//! Plaintext vault records
//!
//! `VaultEntry` and `VaultData` overwrite their string fields when dropped,
//! so discarding a `VaultData` (lock, replacement) also wipes the plaintext.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::ValidationError;

/// Current time truncated to milliseconds: the precision stored in vault files
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Opaque entry identifier, generated once and never reused
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One credential record
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct VaultEntry {
    #[zeroize(skip)]
    pub id: EntryId,
    pub title: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub url: String,
    pub password: String,
    #[serde(default)]
    pub notes: String,
    #[zeroize(skip)]
    pub created_at: DateTime<Utc>,
    #[zeroize(skip)]
    pub updated_at: DateTime<Utc>,
}

impl VaultEntry {
    /// Build a fresh entry with a new id and `created_at = updated_at = now`
    pub fn create(fields: NewEntry) -> Self {
        let now = now_millis();
        Self {
            id: EntryId::generate(),
            title: fields.title,
            username: fields.username,
            url: fields.url,
            password: fields.password,
            notes: fields.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge `patch` into this entry and refresh `updated_at`
    pub fn apply(&mut self, patch: EntryPatch) {
        let EntryPatch {
            title,
            username,
            url,
            password,
            notes,
        } = patch;

        replace_field(&mut self.title, title);
        replace_field(&mut self.username, username);
        replace_field(&mut self.url, url);
        replace_field(&mut self.password, password);
        replace_field(&mut self.notes, notes);

        // never let a clock step backwards break updated_at >= created_at
        self.updated_at = now_millis().max(self.created_at);
    }

    /// Case-insensitive substring match over the non-secret text fields.
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        [&self.title, &self.username, &self.url, &self.notes]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

fn replace_field(slot: &mut String, value: Option<String>) {
    if let Some(value) = value {
        slot.zeroize();
        *slot = value;
    }
}

impl fmt::Debug for VaultEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultEntry")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("password", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// The decrypted vault payload, most-recently-added first
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct VaultData {
    pub entries: Vec<VaultEntry>,
}

impl VaultData {
    pub fn new(entries: Vec<VaultEntry>) -> Self {
        Self { entries }
    }

    /// `true` when no two entries share an id
    pub fn has_unique_ids(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.entries.len());
        self.entries.iter().all(|e| seen.insert(&e.id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for VaultData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultData")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Caller-supplied fields of a new entry
#[derive(Clone, Default, Zeroize)]
pub struct NewEntry {
    pub title: String,
    pub username: String,
    pub url: String,
    pub password: String,
    pub notes: String,
}

impl NewEntry {
    pub fn new(title: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }
}

impl fmt::Debug for NewEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewEntry")
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Field-level update for `update_entry`: `None` leaves a field untouched
#[derive(Clone, Default, PartialEq, Eq, Zeroize)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub username: Option<String>,
    pub url: Option<String>,
    pub password: Option<String>,
    pub notes: Option<String>,
}

impl EntryPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.username.is_none()
            && self.url.is_none()
            && self.password.is_none()
            && self.notes.is_none()
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        match &self.title {
            Some(title) if title.trim().is_empty() => Err(ValidationError::EmptyTitle),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for EntryPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPatch")
            .field("title", &self.title)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}
