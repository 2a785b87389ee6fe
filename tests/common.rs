// tests/common.rs
//! Shared test utilities: logging setup and sample vaults
#![allow(dead_code)] // each test crate uses a different subset

use encrypted_credential_vault::{MasterPassword, NewEntry, VaultSession};

#[cfg(feature = "logging")]
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize test-friendly logging
/// Call once at the start of any test that needs logs
pub fn setup() {
    #[cfg(feature = "logging")]
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer()) // works in `cargo test`
        .with(EnvFilter::from_default_env()) // respects RUST_LOG=
        .try_init()
        .ok(); // idempotent

    #[cfg(not(feature = "logging"))]
    { /* no-op */ }
}

pub fn pw(s: &str) -> MasterPassword {
    MasterPassword::new(s.to_string())
}

/// An unlocked session holding `count` entries ("Site 1" .. "Site N", newest first)
pub fn session_with_entries(count: usize) -> VaultSession {
    let mut session = VaultSession::new();
    session.create_new(&pw("correct")).expect("create_new");
    for i in 1..=count {
        session
            .add_entry(
                NewEntry::new(format!("Site {i}"), format!("pass-{i}"))
                    .username(format!("user{i}@example.com"))
                    .url(format!("https://site{i}.example.com")),
            )
            .expect("add_entry");
    }
    session
}
