//! End-to-end hybrid envelope tests for both algorithm suites

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use envseal::{chunked, envelope, CipherAttr, Envelope, EnvelopeError, RsaError, Version};

mod common;

#[test]
fn hello_world_round_trips_with_gcm_oaep() {
    let sealed = envelope::encrypt(b"hello world", common::public_key(), Version::GcmOaep).unwrap();
    assert!(sealed.encrypted_cipher_attr.is_some());

    let opened = envelope::decrypt(&sealed, common::private_key(), Version::GcmOaep).unwrap();
    assert_eq!(opened, b"hello world");
}

#[test]
fn hello_world_cipher_attr_carries_32_byte_key_and_16_byte_iv() {
    let sealed = envelope::encrypt(b"hello world", common::public_key(), Version::GcmOaep).unwrap();

    // Unwrap the attribute record by hand and inspect the key material
    let encrypted_attr = BASE64.decode(sealed.encrypted_cipher_attr.unwrap()).unwrap();
    let attr_json = chunked::decrypt(
        &encrypted_attr,
        common::private_key(),
        envseal::Padding::OaepSha256,
    )
    .unwrap();
    let attr: CipherAttr = serde_json::from_slice(&attr_json).unwrap();

    assert_eq!(attr.key.len(), 32);
    assert_eq!(attr.iv.len(), 16);
}

#[test]
fn round_trips_with_cbc_pkcs1() {
    let payload = b"legacy suite payload";
    let sealed = envelope::encrypt(payload, common::public_key(), Version::CbcPkcs1).unwrap();
    let opened = envelope::decrypt(&sealed, common::private_key(), Version::CbcPkcs1).unwrap();
    assert_eq!(opened, payload);
}

#[test]
fn large_payloads_round_trip_in_both_suites() {
    let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    for version in [Version::GcmOaep, Version::CbcPkcs1] {
        let sealed = envelope::encrypt(&payload, common::public_key(), version).unwrap();
        let opened = envelope::decrypt(&sealed, common::private_key(), version).unwrap();
        assert_eq!(opened, payload);
    }
}

#[test]
fn empty_payload_round_trips() {
    for version in [Version::GcmOaep, Version::CbcPkcs1] {
        let sealed = envelope::encrypt(b"", common::public_key(), version).unwrap();
        let opened = envelope::decrypt(&sealed, common::private_key(), version).unwrap();
        assert!(opened.is_empty());
    }
}

#[test]
fn fresh_key_material_per_encryption() {
    let sealed_a = envelope::encrypt(b"same payload", common::public_key(), Version::GcmOaep).unwrap();
    let sealed_b = envelope::encrypt(b"same payload", common::public_key(), Version::GcmOaep).unwrap();
    // Fresh symmetric key and IV make both parts differ every time
    assert_ne!(sealed_a.ciphertext, sealed_b.ciphertext);
    assert_ne!(sealed_a.encrypted_cipher_attr, sealed_b.encrypted_cipher_attr);
}

#[test]
fn caller_supplied_symmetric_key_is_honored() {
    let key = envseal::SymmetricKey::generate();
    let sealed = envelope::encrypt_with(
        b"pinned key",
        common::public_key(),
        Some(key.clone()),
        Version::GcmOaep,
    )
    .unwrap();

    let direct = envseal::symmetric::decrypt(
        &sealed.ciphertext,
        &key,
        envseal::BlockMode::Gcm,
    )
    .unwrap();
    assert_eq!(direct, b"pinned key");
}

#[test]
fn cross_suite_decryption_fails_deterministically() {
    let payload = b"suite confusion";

    let sealed_gcm = envelope::encrypt(payload, common::public_key(), Version::GcmOaep).unwrap();
    let err = envelope::decrypt(&sealed_gcm, common::private_key(), Version::CbcPkcs1).unwrap_err();
    assert!(matches!(
        err,
        EnvelopeError::Rsa(RsaError::ChunkDecryptFailed { .. })
    ));

    let sealed_cbc = envelope::encrypt(payload, common::public_key(), Version::CbcPkcs1).unwrap();
    let err = envelope::decrypt(&sealed_cbc, common::private_key(), Version::GcmOaep).unwrap_err();
    assert!(matches!(
        err,
        EnvelopeError::Rsa(RsaError::ChunkDecryptFailed { .. })
    ));
}

#[test]
fn missing_cipher_attr_is_rejected() {
    let envelope_without_attr = Envelope {
        ciphertext: vec![0u8; 32],
        encrypted_cipher_attr: None,
    };
    let err =
        envelope::decrypt(&envelope_without_attr, common::private_key(), Version::GcmOaep)
            .unwrap_err();
    assert!(matches!(err, EnvelopeError::MissingCipherAttr));
}

#[test]
fn malformed_attr_base64_is_rejected() {
    let mut sealed =
        envelope::encrypt(b"payload", common::public_key(), Version::GcmOaep).unwrap();
    sealed.encrypted_cipher_attr = Some("not base64 %%%".to_string());
    let err = envelope::decrypt(&sealed, common::private_key(), Version::GcmOaep).unwrap_err();
    assert!(matches!(err, EnvelopeError::InvalidBase64(_)));
}

#[test]
fn tampered_gcm_ciphertext_is_rejected() {
    let mut sealed = envelope::encrypt(b"payload", common::public_key(), Version::GcmOaep).unwrap();
    sealed.ciphertext[0] ^= 0xff;
    let err = envelope::decrypt(&sealed, common::private_key(), Version::GcmOaep).unwrap_err();
    assert!(matches!(
        err,
        EnvelopeError::Symmetric(envseal::SymmetricError::GcmDecryptFailed)
    ));
}

#[test]
fn tampered_attr_ciphertext_is_rejected() {
    let mut sealed = envelope::encrypt(b"payload", common::public_key(), Version::GcmOaep).unwrap();
    let mut attr = BASE64.decode(sealed.encrypted_cipher_attr.unwrap()).unwrap();
    attr[10] ^= 0xff;
    sealed.encrypted_cipher_attr = Some(BASE64.encode(attr));

    let err = envelope::decrypt(&sealed, common::private_key(), Version::GcmOaep).unwrap_err();
    assert!(matches!(
        err,
        EnvelopeError::Rsa(RsaError::ChunkDecryptFailed { index: 0, .. })
    ));
}
