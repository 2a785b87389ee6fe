// src/crypto/kdf.rs
//! PBKDF2-HMAC-SHA256 key derivation from the master password.
//!
//! Round counts are bound to the vault file version: a file always names the
//! parameters it was written with, and nothing here guesses.

use std::num::NonZeroU32;

use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::aliases::{DerivedKey32, MasterPassword};
use crate::consts::{KEY_LEN, SALT_LEN, V1_PBKDF2_ITERATIONS};
use crate::enums::FormatVersion;
use crate::error::CoreError;

const V1_ITERATIONS: NonZeroU32 = match NonZeroU32::new(V1_PBKDF2_ITERATIONS) {
    Some(n) => n,
    None => panic!("PBKDF2 round count must be non-zero"),
};

/// PBKDF2 rounds for a given file version
pub fn iterations(version: FormatVersion) -> NonZeroU32 {
    match version {
        FormatVersion::V1 => V1_ITERATIONS,
    }
}

/// Derive a 256-bit AES key from the master password and salt.
pub fn derive_key(password: &MasterPassword, salt: &[u8], rounds: NonZeroU32) -> DerivedKey32 {
    let mut out = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        rounds,
        salt,
        password.expose_secret().as_bytes(),
        &mut out[..],
    );
    DerivedKey32::new(*out)
}

/// Generate a fresh random 16-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], CoreError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt).map_err(|_| CoreError::Randomness)?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    // low round count keeps the unit tests fast; the file format never uses it
    const FAST: NonZeroU32 = match NonZeroU32::new(1_000) {
        Some(n) => n,
        None => panic!(),
    };

    #[test]
    fn derive_key_produces_consistent_output() {
        let password = MasterPassword::new("correct horse".to_owned());
        let key1 = derive_key(&password, &[1u8; SALT_LEN], FAST);
        let key2 = derive_key(&password, &[1u8; SALT_LEN], FAST);
        assert_eq!(key1.expose_secret(), key2.expose_secret());
    }

    #[test]
    fn derive_key_different_salt_produces_different_output() {
        let password = MasterPassword::new("same passphrase".to_owned());
        let key1 = derive_key(&password, &[1u8; SALT_LEN], FAST);
        let key2 = derive_key(&password, &[2u8; SALT_LEN], FAST);
        assert_ne!(key1.expose_secret(), key2.expose_secret());
    }

    #[test]
    fn derive_key_different_password_produces_different_output() {
        let key1 = derive_key(&MasterPassword::new("one".to_owned()), &[3u8; SALT_LEN], FAST);
        let key2 = derive_key(&MasterPassword::new("two".to_owned()), &[3u8; SALT_LEN], FAST);
        assert_ne!(key1.expose_secret(), key2.expose_secret());
    }

    #[test]
    fn v1_is_bound_to_250k_rounds() {
        assert_eq!(iterations(FormatVersion::V1).get(), 250_000);
    }

    #[test]
    fn generate_salt_produces_random_values() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }
}
