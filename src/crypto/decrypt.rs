// src/crypto/decrypt.rs
use tracing::debug;

use crate::aliases::MasterPassword;
use crate::consts::{NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::crypto::{aead, kdf};
use crate::enums::FormatVersion;
use crate::error::VaultOpenError;
use crate::model::VaultData;
use crate::vault_file::EncryptedVaultFile;

/// Decrypt and validate a vault file.
///
/// Any failure (unknown version, bad lengths, wrong password, tampered tag,
/// malformed payload) collapses into the same [`VaultOpenError`].
pub fn decrypt(file: &EncryptedVaultFile, password: &MasterPassword) -> Result<VaultData, VaultOpenError> {
    let result = open_payload(file, password);
    if result.is_err() {
        debug!(version = file.version, "vault open rejected");
    }
    result
}

fn open_payload(file: &EncryptedVaultFile, password: &MasterPassword) -> Result<VaultData, VaultOpenError> {
    let version = FormatVersion::from_wire(file.version).ok_or(VaultOpenError)?;
    let salt: [u8; SALT_LEN] = file.salt.as_slice().try_into().map_err(|_| VaultOpenError)?;
    let nonce: [u8; NONCE_LEN] = file.iv.as_slice().try_into().map_err(|_| VaultOpenError)?;
    if file.ciphertext.len() < TAG_LEN {
        return Err(VaultOpenError);
    }

    let key = kdf::derive_key(password, &salt, kdf::iterations(version));
    let plaintext = aead::open(&key, nonce, &file.ciphertext)?;

    let data: VaultData = serde_json::from_slice(&plaintext).map_err(|_| VaultOpenError)?;
    if !data.has_unique_ids() {
        return Err(VaultOpenError);
    }
    Ok(data)
}
