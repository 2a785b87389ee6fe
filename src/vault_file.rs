// src/vault_file.rs
//! Portable encrypted vault container
//!
//! Wire form: `{"v": 1, "s": "<base64>", "iv": "<base64>", "ct": "<base64>"}`.
//! A container that fails to parse is reported exactly like a wrong password.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::consts::{EXPORT_FILENAME_PREFIX, EXPORT_FILENAME_SUFFIX};
use crate::enums::FormatVersion;
use crate::error::{CoreError, VaultOpenError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedVaultFile {
    #[serde(rename = "v")]
    pub version: u32,
    #[serde(rename = "s", with = "b64")]
    pub salt: Vec<u8>,
    #[serde(rename = "iv", with = "b64")]
    pub iv: Vec<u8>,
    #[serde(rename = "ct", with = "b64")]
    pub ciphertext: Vec<u8>,
}

impl EncryptedVaultFile {
    /// Parse the JSON container (does not decrypt)
    pub fn from_json(bytes: &[u8]) -> Result<Self, VaultOpenError> {
        serde_json::from_slice(bytes).map_err(|_| VaultOpenError)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, CoreError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Known format version, if any
    pub fn format_version(&self) -> Option<FormatVersion> {
        FormatVersion::from_wire(self.version)
    }
}

/// `vault-YYYY-MM-DD.vault.json`
pub fn export_filename(date: NaiveDate) -> String {
    format!(
        "{EXPORT_FILENAME_PREFIX}{}{EXPORT_FILENAME_SUFFIX}",
        date.format("%Y-%m-%d")
    )
}

/// Check whether bytes look like a vault container of a version we can open
pub fn is_vault_file(data: &[u8]) -> bool {
    EncryptedVaultFile::from_json(data)
        .map(|file| file.format_version().is_some())
        .unwrap_or(false)
}

mod b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
