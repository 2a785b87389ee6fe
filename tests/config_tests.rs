// tests/config_tests.rs
use encrypted_credential_vault::config::{load, load_from, Config};
use encrypted_credential_vault::error::ConfigError;
use encrypted_credential_vault::settings::SecuritySettings;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault-config.toml");
    fs::write(
        &path,
        r#"
[security]
idle_lock_minutes = 1
clipboard_clear_seconds = 0

[paths]
store_db = "/tmp/ecv-test/store.db"
"#,
    )
    .unwrap();

    let conf = load_from(&path).unwrap();
    assert_eq!(conf.security.idle_lock_minutes, 1);
    assert_eq!(conf.security.clipboard_clear_seconds, 0);
    assert!(conf.security.panic_key_enabled);
    assert!(conf.security.auto_backup_enabled);
    assert_eq!(conf.paths.store_db, "/tmp/ecv-test/store.db");
    assert!(conf.paths.export_dir.ends_with("exports"));
    assert!(conf.features.allow_insecure_export);
}

#[test]
fn empty_file_equals_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.toml");
    fs::write(&path, "").unwrap();

    assert_eq!(load_from(&path).unwrap(), Config::default());
    assert_eq!(Config::default().security, SecuritySettings::default());
}

#[test]
fn invalid_toml_and_missing_file_are_errors() {
    let dir = tempdir().unwrap();
    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[security\nidle_lock_minutes = ").unwrap();

    assert!(matches!(load_from(&bad), Err(ConfigError::Toml(_))));
    assert!(matches!(load_from(dir.path().join("nope.toml")), Err(ConfigError::Io(_))));
}

#[test]
fn default_security_settings() {
    let s = SecuritySettings::default();
    assert_eq!(s.idle_lock_minutes, 5);
    assert!(s.panic_key_enabled);
    assert_eq!(s.clipboard_clear_seconds, 30);
    assert!(s.auto_backup_enabled);
    assert!(s.privacy_blur);
    assert_eq!(s.idle_timeout(), Some(std::time::Duration::from_secs(300)));
}

#[test]
#[serial]
fn global_load_honours_env_overrides() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    fs::write(&path, "[security]\nidle_lock_minutes = 2\n").unwrap();
    let db = dir.path().join("override.db");

    std::env::set_var("ECV_CONFIG", &path);
    std::env::set_var("ECV_STORE_DB", &db);

    // first load in this test binary wins
    let conf = load();
    assert_eq!(conf.security.idle_lock_minutes, 2);
    assert_eq!(conf.paths.store_db, db.to_string_lossy());
    assert!(std::ptr::eq(conf, load()));
}
