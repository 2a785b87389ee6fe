// src/crypto/aead.rs
//! Low-level AES-256-GCM seal/open operations.
//!
//! The nonce is supplied by the caller so it can be written into the vault
//! file; [`generate_nonce`] must be called for every seal.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::aliases::DerivedKey32;
use crate::consts::NONCE_LEN;
use crate::error::{CoreError, VaultOpenError};

fn cipher(key: &DerivedKey32) -> Option<LessSafeKey> {
    UnboundKey::new(&AES_256_GCM, key.expose_secret())
        .ok()
        .map(LessSafeKey::new)
}

/// Encrypt `plaintext`, returning ciphertext with the 16-byte tag appended.
pub fn seal(
    key: &DerivedKey32,
    nonce: [u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, CoreError> {
    let cipher = cipher(key).ok_or(CoreError::Cipher)?;
    let mut in_out = plaintext.to_vec();
    cipher
        .seal_in_place_append_tag(Nonce::assume_unique_for_key(nonce), Aad::empty(), &mut in_out)
        .map_err(|_| CoreError::Cipher)?;
    Ok(in_out)
}

/// Decrypt and authenticate `ciphertext` (tag included).
pub fn open(
    key: &DerivedKey32,
    nonce: [u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, VaultOpenError> {
    let cipher = cipher(key).ok_or(VaultOpenError)?;
    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = cipher
        .open_in_place(Nonce::assume_unique_for_key(nonce), Aad::empty(), &mut in_out)
        .map_err(|_| VaultOpenError)?
        .len();
    in_out.truncate(plaintext_len);
    Ok(in_out)
}

/// Generate a fresh random 96-bit nonce.
pub fn generate_nonce() -> Result<[u8; NONCE_LEN], CoreError> {
    let rng = SystemRandom::new();
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill(&mut nonce).map_err(|_| CoreError::Randomness)?;
    Ok(nonce)
}
