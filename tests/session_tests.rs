// tests/session_tests.rs
mod common;
use common::{pw, session_with_entries};

use encrypted_credential_vault::consts::{EXPORT_FILENAME_PREFIX, EXPORT_FILENAME_SUFFIX};
use encrypted_credential_vault::error::{CoreError, ValidationError};
use encrypted_credential_vault::model::{EntryId, EntryPatch, NewEntry};
use encrypted_credential_vault::session::{ImportOutcome, VaultSession};
use encrypted_credential_vault::vault_file::EncryptedVaultFile;

#[test]
fn new_session_is_locked_and_empty() {
    let session = VaultSession::new();
    assert!(session.is_locked());
    assert!(session.entries().is_empty());
    assert!(session.data().is_none());
}

#[test]
fn create_new_rejects_empty_password() {
    let mut session = VaultSession::new();
    let err = session.create_new(&pw("")).unwrap_err();
    assert!(matches!(err, CoreError::Validation(ValidationError::EmptyPassword)));
    assert!(session.is_locked());
    assert_eq!(session.epoch(), 0);
}

#[test]
fn create_new_replaces_an_unlocked_vault() {
    let mut session = session_with_entries(2);
    session.create_new(&pw("other")).unwrap();
    assert!(session.is_unlocked());
    assert!(session.entries().is_empty());
}

#[test]
fn lock_from_any_state_is_idempotent() {
    let mut session = VaultSession::new();
    session.lock();
    assert!(session.is_locked());

    let mut session = session_with_entries(3);
    session.lock();
    session.lock();
    assert!(session.is_locked());
    assert!(session.entries().is_empty());
}

#[test]
fn mutations_while_locked_are_no_ops() {
    let mut session = session_with_entries(1);
    let id = session.entries()[0].id.clone();
    session.lock();
    let epoch = session.epoch();

    assert!(matches!(
        session.add_entry(NewEntry::new("x", "y")),
        Err(CoreError::NoVault)
    ));
    assert!(!session.update_entry(&id, EntryPatch::default().title("z")).unwrap());
    assert!(!session.delete_entry(&id));
    assert!(session.is_locked());
    assert_eq!(session.epoch(), epoch);
}

#[test]
fn add_entry_prepends_and_validates_title() {
    let mut session = session_with_entries(2);
    let id = session.add_entry(NewEntry::new("Newest", "pw").notes("n")).unwrap();

    let first = &session.entries()[0];
    assert_eq!(first.id, id);
    assert_eq!(first.title, "Newest");
    assert_eq!(first.notes, "n");
    assert_eq!(first.created_at, first.updated_at);
    assert_eq!(session.entries()[1].title, "Site 2");

    let err = session.add_entry(NewEntry::new("   ", "pw")).unwrap_err();
    assert!(matches!(err, CoreError::Validation(ValidationError::EmptyTitle)));
    assert_eq!(session.entries().len(), 3);
}

#[test]
fn empty_password_field_is_allowed() {
    let mut session = session_with_entries(0);
    let id = session.add_entry(NewEntry::new("No secret", "")).unwrap();
    assert_eq!(session.entry(&id).unwrap().password, "");
}

#[test]
fn update_entry_merges_only_given_fields() {
    let mut session = session_with_entries(1);
    let before = session.entries()[0].clone();

    std::thread::sleep(std::time::Duration::from_millis(5));
    let changed = session
        .update_entry(&before.id, EntryPatch::default().password("rotated").url(""))
        .unwrap();
    assert!(changed);

    let after = session.entry(&before.id).unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.title, before.title);
    assert_eq!(after.username, before.username);
    assert_eq!(after.url, "");
    assert_eq!(after.password, "rotated");
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
}

#[test]
fn update_entry_rejects_blank_title_and_unknown_id() {
    let mut session = session_with_entries(1);
    let id = session.entries()[0].id.clone();

    let err = session.update_entry(&id, EntryPatch::default().title("")).unwrap_err();
    assert!(matches!(err, CoreError::Validation(ValidationError::EmptyTitle)));
    assert_eq!(session.entries()[0].title, "Site 1");

    let missing = EntryId::from("does-not-exist");
    assert!(!session.update_entry(&missing, EntryPatch::default().title("x")).unwrap());
}

#[test]
fn delete_entry_removes_only_the_target() {
    let mut session = session_with_entries(3);
    let id = session.entries()[1].id.clone();

    assert!(session.delete_entry(&id));
    assert!(!session.delete_entry(&id));
    assert_eq!(session.entries().len(), 2);
    assert!(session.entry(&id).is_none());
}

#[test]
fn search_is_case_insensitive_and_skips_passwords() {
    let session = session_with_entries(3);
    assert_eq!(session.search("SITE2.example").len(), 1);
    assert_eq!(session.search("").len(), 3);
    assert!(session.search("pass-1").is_empty());
}

#[test]
fn import_from_csv_replaces_working_set() {
    let mut session = session_with_entries(4);
    let count = session.import_from_csv("title,password\nOnly,one");
    assert_eq!(count, 1);
    assert_eq!(session.entries().len(), 1);
    assert_eq!(session.entries()[0].title, "Only");

    let mut locked = VaultSession::new();
    assert_eq!(locked.import_from_csv(""), 0);
    assert!(locked.is_unlocked());
}

#[test]
fn export_csv_requires_unlocked_vault() {
    let mut session = session_with_entries(1);
    assert!(session.export_csv().unwrap().contains("Site 1"));
    session.lock();
    assert!(matches!(session.export_csv(), Err(CoreError::NoVault)));
}

#[tokio::test]
async fn export_then_import_preserves_entries_and_ids() {
    common::setup();
    let mut session = VaultSession::new();
    session.create_new(&pw("correct")).unwrap();
    session
        .add_entry(NewEntry::new("Mail", "s3cret").username("me@example.com"))
        .unwrap();
    let before = session.entries().to_vec();

    let exported = session.export_to_file(pw("correct")).await.unwrap();
    assert!(exported.filename.starts_with(EXPORT_FILENAME_PREFIX));
    assert!(exported.filename.ends_with(EXPORT_FILENAME_SUFFIX));
    assert_eq!(exported.filename.len(), "vault-2024-01-01.vault.json".len());

    let mut fresh = VaultSession::new();
    let file = EncryptedVaultFile::from_json(&exported.bytes).unwrap();
    let outcome = fresh.import_from_file(file, pw("correct")).await.unwrap();

    assert_eq!(outcome, ImportOutcome::Applied { entries: 1 });
    assert_eq!(fresh.entries(), before.as_slice());
}

#[tokio::test]
async fn export_validates_state_then_password() {
    let locked = VaultSession::new();
    assert!(matches!(locked.export_to_file(pw("x")).await, Err(CoreError::NoVault)));

    let session = session_with_entries(1);
    assert!(matches!(
        session.export_to_file(pw("")).await,
        Err(CoreError::Validation(ValidationError::EmptyPassword))
    ));
}

#[tokio::test]
async fn failed_import_leaves_state_unchanged() {
    let source = session_with_entries(2);
    let exported = source.export_to_file(pw("right")).await.unwrap();

    let mut target = session_with_entries(5);
    let epoch = target.epoch();
    let err = target
        .import_from_file(exported.file.clone(), pw("wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Open(_)));
    assert_eq!(target.entries().len(), 5);
    assert_eq!(target.epoch(), epoch);
}

#[tokio::test]
async fn stale_import_is_discarded_after_lock() {
    let source = session_with_entries(2);
    let exported = source.export_to_file(pw("right")).await.unwrap();

    let mut session = VaultSession::new();
    let pending = session.begin_import(exported.file, pw("right"));
    // panic-locked while the key derivation runs
    session.lock();

    let (ticket, result) = pending.wait().await;
    let outcome = session.finish_import(ticket, result).unwrap();
    assert_eq!(outcome, ImportOutcome::Discarded);
    assert!(session.is_locked());
}

#[tokio::test]
async fn export_is_unaffected_by_a_lock_after_it_starts() {
    let mut session = session_with_entries(2);
    let pending = session.begin_export(pw("pw")).unwrap();
    session.lock();

    let exported = pending.wait().await.unwrap();
    let mut reopened = VaultSession::new();
    let outcome = reopened.import_from_file(exported.file, pw("pw")).await.unwrap();
    assert_eq!(outcome, ImportOutcome::Applied { entries: 2 });
    assert_eq!(reopened.entries().len(), 2);
}
