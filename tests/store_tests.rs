// tests/store_tests.rs
mod common;

use encrypted_credential_vault::consts::{BACKUP_ENTRIES_KEY, BACKUP_TIMESTAMP_KEY};
use encrypted_credential_vault::store::{ChangeValue, KeyValueStore, MemoryStore, SqliteStore};
use tempfile::tempdir;

fn exercise_basic_ops(store: &impl KeyValueStore) {
    assert_eq!(store.get("missing").unwrap(), None);

    store.set("k", "v1").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v1"));

    store.set("k", "v2").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

    store.remove("k").unwrap();
    assert_eq!(store.get("k").unwrap(), None);
    // removing again is fine
    store.remove("k").unwrap();
}

#[test]
fn memory_store_basic_ops() {
    exercise_basic_ops(&MemoryStore::new());
}

#[test]
fn sqlite_store_basic_ops() {
    common::setup();
    exercise_basic_ops(&SqliteStore::open_in_memory().unwrap());
}

#[test]
fn sqlite_store_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("store.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store.set("auto-backup-enabled", "false").unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
    }

    let reopened = SqliteStore::open(&path).unwrap();
    assert_eq!(reopened.get("auto-backup-enabled").unwrap().as_deref(), Some("false"));
}

#[test]
fn views_share_data_but_not_identity() {
    let store = MemoryStore::new();
    let other = store.view();
    assert_ne!(store.view_id(), other.view_id());

    other.set("shared", "yes").unwrap();
    assert_eq!(store.get("shared").unwrap().as_deref(), Some("yes"));

    let sql = SqliteStore::open_in_memory().unwrap();
    let sql_view = sql.view();
    sql_view.set("shared", "also").unwrap();
    assert_eq!(sql.get("shared").unwrap().as_deref(), Some("also"));
}

#[tokio::test]
async fn writes_are_published_to_every_view() {
    let store = SqliteStore::open_in_memory().unwrap();
    let writer = store.view();
    let mut rx = store.subscribe();

    writer.set("theme", "dark").unwrap();
    writer.remove("theme").unwrap();
    // removing an absent key publishes nothing
    writer.remove("theme").unwrap();
    writer.set("after", "1").unwrap();

    let set = rx.recv().await.unwrap();
    assert_eq!(set.key, "theme");
    assert_eq!(set.value.as_str(), Some("dark"));
    assert_eq!(set.origin, writer.view_id());

    let removed = rx.recv().await.unwrap();
    assert_eq!(removed.value, ChangeValue::Removed);

    assert_eq!(rx.recv().await.unwrap().key, "after");
}

#[tokio::test]
async fn change_debug_hides_values() {
    let store = MemoryStore::new();
    let mut rx = store.subscribe();
    store.set("vault-backup-entries", "{\"entries\":[{\"password\":\"hunter2\"}]}").unwrap();

    let change = rx.recv().await.unwrap();
    assert!(!format!("{change:?}").contains("hunter2"));
}

#[tokio::test]
async fn snapshot_body_never_reaches_subscribers() {
    let store = MemoryStore::new();
    let writer = store.view();
    let mut rx = store.subscribe();
    let body = "{\"entries\":[{\"password\":\"hunter2\"}]}";

    writer.set(BACKUP_ENTRIES_KEY, body).unwrap();
    writer.set(BACKUP_TIMESTAMP_KEY, "2024-01-01T00:00:00.000Z").unwrap();

    let snapshot = rx.recv().await.unwrap();
    assert_eq!(snapshot.key, BACKUP_ENTRIES_KEY);
    assert_eq!(snapshot.value, ChangeValue::Withheld);
    assert_eq!(snapshot.value.as_str(), None);
    // still readable from the store itself
    assert_eq!(store.get(BACKUP_ENTRIES_KEY).unwrap().as_deref(), Some(body));

    let stamp = rx.recv().await.unwrap();
    assert_eq!(stamp.value.as_str(), Some("2024-01-01T00:00:00.000Z"));
}
