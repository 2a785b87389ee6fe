// src/aliases.rs
//! Secret types built on `secrecy`
//!
//! These are the canonical secret types used throughout encrypted-credential-vault.
//! All of them zeroize on drop and redact themselves in `Debug` output. The
//! contents are only reachable through `expose_secret`.

use std::fmt;

use secrecy::{ExposeSecret, SecretBox, SecretSlice, SecretString};

macro_rules! secret_alias {
    ($name:ident, $inner:ty, $exposed:ty, $value:ty, $wrap:expr) => {
        pub struct $name($inner);

        impl $name {
            pub fn new(value: $value) -> Self {
                Self($wrap(value))
            }

            pub fn expose_secret(&self) -> &$exposed {
                self.0.expose_secret()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "([REDACTED])"))
            }
        }
    };
}

// Fixed-size secrets
// 256-bit AES-GCM key derived from the master password
secret_alias!(DerivedKey32, SecretBox<[u8; 32]>, [u8; 32], [u8; 32], |k| SecretBox::new(Box::new(k)));

// Dynamic secrets
// Vault unlock / export passphrase: never stored
secret_alias!(MasterPassword, SecretString, str, String, SecretString::from);
// Output of the password generator
secret_alias!(GeneratedPassword, SecretString, str, String, SecretString::from);
// Serialized VaultData before sealing / after opening
secret_alias!(PlainPayload, SecretSlice<u8>, [u8], Vec<u8>, SecretSlice::from);
