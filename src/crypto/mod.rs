// src/crypto/mod.rs
//! Pure cryptographic operations: no I/O, no store
//!
//! `encrypt`/`decrypt` map `VaultData` + master password to and from an
//! `EncryptedVaultFile`. The `_async` variants run the same work on the blocking
//! pool so a slow key derivation never stalls the event loop.

pub mod aead;
mod decrypt;
mod encrypt;
pub mod kdf;

pub use decrypt::decrypt;
pub use encrypt::encrypt;

use tokio::task;

use crate::aliases::MasterPassword;
use crate::error::CoreError;
use crate::model::VaultData;
use crate::vault_file::EncryptedVaultFile;

/// [`encrypt`] on the blocking thread pool
pub async fn encrypt_async(data: VaultData, password: MasterPassword) -> Result<EncryptedVaultFile, CoreError> {
    task::spawn_blocking(move || encrypt(&data, &password))
        .await
        .map_err(|_| CoreError::TaskFailed)?
}

/// [`decrypt`] on the blocking thread pool
pub async fn decrypt_async(file: EncryptedVaultFile, password: MasterPassword) -> Result<VaultData, CoreError> {
    let data = task::spawn_blocking(move || decrypt(&file, &password))
        .await
        .map_err(|_| CoreError::TaskFailed)??;
    Ok(data)
}
