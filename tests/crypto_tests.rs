// tests/crypto_tests.rs
mod common;
use common::{pw, session_with_entries};

use encrypted_credential_vault::consts::{CURRENT_FORMAT_VERSION, NONCE_LEN, SALT_LEN, TAG_LEN};
use encrypted_credential_vault::crypto::{decrypt, decrypt_async, encrypt, encrypt_async};
use encrypted_credential_vault::error::{CoreError, VaultOpenError};
use encrypted_credential_vault::model::{VaultData, VaultEntry};
use encrypted_credential_vault::vault_file::{is_vault_file, EncryptedVaultFile};
use serde_json::Value;

fn sample_data() -> VaultData {
    session_with_entries(3).data().expect("unlocked").clone()
}

#[test]
fn test_encrypt_decrypt_roundtrip() {
    common::setup();
    let data = sample_data();

    let file = encrypt(&data, &pw("correct")).unwrap();
    let decrypted = decrypt(&file, &pw("correct")).unwrap();

    assert_eq!(decrypted, data);
    assert_eq!(file.version, CURRENT_FORMAT_VERSION);
    assert_eq!(file.salt.len(), SALT_LEN);
    assert_eq!(file.iv.len(), NONCE_LEN);
}

#[test]
fn test_empty_vault_roundtrip() {
    let data = VaultData::default();
    let file = encrypt(&data, &pw("pw")).unwrap();
    assert!(decrypt(&file, &pw("pw")).unwrap().is_empty());
}

#[test]
fn test_decrypt_fails_with_wrong_password() {
    let file = encrypt(&sample_data(), &pw("correct")).unwrap();
    assert!(matches!(decrypt(&file, &pw("incorrect")), Err(VaultOpenError)));
}

#[test]
fn test_salt_and_nonce_are_fresh_per_encryption() {
    let data = sample_data();
    let a = encrypt(&data, &pw("same")).unwrap();
    let b = encrypt(&data, &pw("same")).unwrap();

    assert_ne!(a.salt, b.salt);
    assert_ne!(a.iv, b.iv);
    assert_ne!(a.ciphertext, b.ciphertext);
}

#[test]
fn test_bit_flips_in_ciphertext_are_detected() {
    let file = encrypt(&sample_data(), &pw("correct")).unwrap();
    // first byte, a middle byte, and inside the tag
    for index in [0, file.ciphertext.len() / 2, file.ciphertext.len() - 1] {
        let mut tampered = file.clone();
        tampered.ciphertext[index] ^= 0x01;
        assert!(decrypt(&tampered, &pw("correct")).is_err(), "flip at {index} not detected");
    }
}

#[test]
fn test_bit_flips_in_iv_and_salt_are_detected() {
    let file = encrypt(&sample_data(), &pw("correct")).unwrap();

    for bit in 0..8 {
        let mut tampered = file.clone();
        tampered.iv[5] ^= 1 << bit;
        assert!(decrypt(&tampered, &pw("correct")).is_err());
    }

    let mut tampered = file.clone();
    tampered.salt[0] ^= 0x80;
    assert!(decrypt(&tampered, &pw("correct")).is_err());
}

#[test]
fn test_unknown_version_and_bad_lengths_rejected() {
    let file = encrypt(&sample_data(), &pw("correct")).unwrap();

    let mut future = file.clone();
    future.version = 2;
    assert!(decrypt(&future, &pw("correct")).is_err());

    let mut short_iv = file.clone();
    short_iv.iv.truncate(8);
    assert!(decrypt(&short_iv, &pw("correct")).is_err());

    let mut long_salt = file.clone();
    long_salt.salt.push(0);
    assert!(decrypt(&long_salt, &pw("correct")).is_err());

    let mut truncated = file;
    truncated.ciphertext.truncate(TAG_LEN - 1);
    assert!(decrypt(&truncated, &pw("correct")).is_err());
}

#[test]
fn test_malformed_container_reports_same_error_as_wrong_password() {
    let file = encrypt(&sample_data(), &pw("correct")).unwrap();
    let wrong_pw = decrypt(&file, &pw("nope")).unwrap_err();

    let not_base64 = EncryptedVaultFile::from_json(br#"{"v":1,"s":"%%%","iv":"AAAA","ct":"AAAA"}"#).unwrap_err();
    let not_json = EncryptedVaultFile::from_json(b"hello").unwrap_err();

    assert_eq!(wrong_pw.to_string(), not_base64.to_string());
    assert_eq!(wrong_pw.to_string(), not_json.to_string());
    assert_eq!(CoreError::from(wrong_pw).to_string(), "wrong master password or corrupted vault file");
}

#[test]
fn test_wire_format_fields() {
    let file = encrypt(&sample_data(), &pw("correct")).unwrap();
    let json: Value = serde_json::from_slice(&file.to_json().unwrap()).unwrap();

    let obj = json.as_object().unwrap();
    assert_eq!(obj.len(), 4);
    assert_eq!(json["v"], 1);
    assert!(json["s"].is_string());
    assert!(json["iv"].is_string());
    assert!(json["ct"].is_string());

    let parsed = EncryptedVaultFile::from_json(&file.to_json().unwrap()).unwrap();
    assert_eq!(parsed, file);
    assert!(is_vault_file(&file.to_json().unwrap()));
    assert!(!is_vault_file(br#"{"v":9,"s":"","iv":"","ct":""}"#));
}

#[test]
fn test_entry_json_uses_camel_case_and_defaults_optional_fields() {
    let json = r#"{
        "id": "abc",
        "title": "Bank",
        "password": "hunter2",
        "createdAt": "2024-01-02T03:04:05.678Z",
        "updatedAt": "2024-01-02T03:04:05.678Z"
    }"#;
    let entry: VaultEntry = serde_json::from_str(json).unwrap();
    assert_eq!(entry.id.as_str(), "abc");
    assert_eq!(entry.username, "");
    assert_eq!(entry.url, "");
    assert_eq!(entry.notes, "");

    let back: Value = serde_json::to_value(&entry).unwrap();
    assert_eq!(back["createdAt"], "2024-01-02T03:04:05.678Z");
    assert!(back.get("created_at").is_none());
}

#[test]
fn test_debug_output_redacts_secrets() {
    let data = sample_data();
    let rendered = format!("{:?} {:?}", data, data.entries[0]);
    assert!(!rendered.contains("pass-"));
}

#[tokio::test]
async fn test_async_variants_roundtrip() {
    let data = sample_data();
    let file = encrypt_async(data.clone(), pw("async")).await.unwrap();
    let back = decrypt_async(file.clone(), pw("async")).await.unwrap();
    assert_eq!(back, data);

    let err = decrypt_async(file, pw("wrong")).await.unwrap_err();
    assert!(matches!(err, CoreError::Open(_)));
}
