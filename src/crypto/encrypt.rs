// src/crypto/encrypt.rs
use tracing::debug;

use crate::aliases::{MasterPassword, PlainPayload};
use crate::crypto::{aead, kdf};
use crate::enums::FormatVersion;
use crate::error::CoreError;
use crate::model::VaultData;
use crate::vault_file::EncryptedVaultFile;

/// Encrypt the vault payload under the master password (current format version).
///
/// Salt and nonce are drawn fresh on every call, so two encryptions of the same
/// data under the same password never share a key/nonce pair.
pub fn encrypt(data: &VaultData, password: &MasterPassword) -> Result<EncryptedVaultFile, CoreError> {
    let version = FormatVersion::default();
    let salt = kdf::generate_salt()?;
    let nonce = aead::generate_nonce()?;
    let key = kdf::derive_key(password, &salt, kdf::iterations(version));

    let payload = PlainPayload::new(serde_json::to_vec(data)?);
    let ciphertext = aead::seal(&key, nonce, payload.expose_secret())?;

    debug!(entries = data.len(), version = version.to_wire(), "vault sealed");
    Ok(EncryptedVaultFile {
        version: version.to_wire(),
        salt: salt.to_vec(),
        iv: nonce.to_vec(),
        ciphertext,
    })
}
