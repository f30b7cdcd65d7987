//! Chunked RSA encryption and signature tests against a real key pair

use envseal::{chunked, DigestType, Padding, PrivateKey, RsaError, Signature};
use rsa::traits::PublicKeyParts;

mod common;

fn round_trip(len: usize, padding: Padding) {
    let payload: Vec<u8> = (0..len).map(|i| (i % 239) as u8).collect();
    let ciphertext = chunked::encrypt(&payload, common::public_key(), padding).unwrap();
    let plaintext = chunked::decrypt(&ciphertext, common::private_key(), padding).unwrap();
    assert_eq!(plaintext, payload);
}

#[test]
fn round_trips_at_chunk_boundaries_with_oaep() {
    let block_size = common::public_key().reference().size();
    let max_chunk = Padding::OaepSha256.max_chunk_size(block_size).unwrap();

    for len in [max_chunk, max_chunk + 1, 10 * max_chunk + 7] {
        round_trip(len, Padding::OaepSha256);
    }
}

#[test]
fn round_trips_at_chunk_boundaries_with_pkcs1() {
    let block_size = common::public_key().reference().size();
    let max_chunk = Padding::Pkcs1.max_chunk_size(block_size).unwrap();

    for len in [max_chunk, max_chunk + 1, 10 * max_chunk + 7] {
        round_trip(len, Padding::Pkcs1);
    }
}

#[test]
fn short_payload_round_trips() {
    round_trip(1, Padding::OaepSha256);
    round_trip(11, Padding::Pkcs1);
}

#[test]
fn empty_input_yields_empty_output() {
    let ciphertext = chunked::encrypt(b"", common::public_key(), Padding::OaepSha256).unwrap();
    assert!(ciphertext.is_empty());
    let plaintext = chunked::decrypt(b"", common::private_key(), Padding::OaepSha256).unwrap();
    assert!(plaintext.is_empty());
}

#[test]
fn each_chunk_fills_one_block() {
    let block_size = common::public_key().reference().size();
    let max_chunk = Padding::OaepSha256.max_chunk_size(block_size).unwrap();

    let payload = vec![0x5a; 3 * max_chunk + 1];
    let ciphertext = chunked::encrypt(&payload, common::public_key(), Padding::OaepSha256).unwrap();
    assert_eq!(ciphertext.len(), 4 * block_size);
}

#[test]
fn padding_mismatch_fails_with_the_chunk_offset() {
    let block_size = common::public_key().reference().size();
    let max_chunk = Padding::OaepSha256.max_chunk_size(block_size).unwrap();

    // Two OAEP blocks, decrypted as PKCS#1: the first chunk already fails
    let payload = vec![0xa5; max_chunk + 1];
    let ciphertext = chunked::encrypt(&payload, common::public_key(), Padding::OaepSha256).unwrap();
    let err = chunked::decrypt(&ciphertext, common::private_key(), Padding::Pkcs1).unwrap_err();
    assert!(matches!(err, RsaError::ChunkDecryptFailed { index: 0, .. }));
}

#[test]
fn truncated_ciphertext_reports_the_failing_offset() {
    let block_size = common::public_key().reference().size();

    let payload = vec![0x11; 16];
    let ciphertext = chunked::encrypt(&payload, common::public_key(), Padding::OaepSha256).unwrap();
    assert_eq!(ciphertext.len(), block_size);

    // A trailing partial block cannot decrypt
    let err = chunked::decrypt(
        &ciphertext[..block_size - 3],
        common::private_key(),
        Padding::OaepSha256,
    )
    .unwrap_err();
    assert!(matches!(err, RsaError::ChunkDecryptFailed { index: 0, .. }));
}

#[test]
fn sign_and_verify_succeed_for_all_digest_types() {
    let message = vec![0x42u8; 8192];
    for digest_type in [
        DigestType::Sha1,
        DigestType::Sha224,
        DigestType::Sha256,
        DigestType::Sha384,
        DigestType::Sha512,
    ] {
        let signature = chunked::sign(&message, common::private_key(), digest_type).unwrap();
        let valid =
            chunked::verify(&message, common::public_key(), &signature, digest_type).unwrap();
        assert!(valid, "verification failed for {digest_type:?}");
    }
}

#[test]
fn mismatched_digest_type_does_not_verify() {
    let message = b"digest identity matters";
    let signature = chunked::sign(message, common::private_key(), DigestType::Sha256).unwrap();
    let valid =
        chunked::verify(message, common::public_key(), &signature, DigestType::Sha384).unwrap();
    assert!(!valid);
}

#[test]
fn altered_message_does_not_verify() {
    let signature = chunked::sign(b"original", common::private_key(), DigestType::Sha256).unwrap();
    let valid =
        chunked::verify(b"altered!", common::public_key(), &signature, DigestType::Sha256).unwrap();
    assert!(!valid);
}

#[test]
fn corrupted_signature_does_not_verify() {
    let message = b"bit flips happen";
    let signature = chunked::sign(message, common::private_key(), DigestType::Sha256).unwrap();
    let mut bytes = signature.data().to_vec();
    bytes[7] ^= 0x01;
    let valid = chunked::verify(
        message,
        common::public_key(),
        &Signature::new(bytes),
        DigestType::Sha256,
    )
    .unwrap();
    assert!(!valid);
}

#[test]
fn key_below_the_oaep_overhead_is_rejected_not_looped() {
    // A 512-bit key has 64-byte blocks, below the 66-byte OAEP overhead
    let mut rng = rand::rngs::OsRng;
    let small = rsa::RsaPrivateKey::new(&mut rng, 512).unwrap();
    let small_public = envseal::PublicKey::from_reference(rsa::RsaPublicKey::from(&small));

    let err = chunked::encrypt(b"hello", &small_public, Padding::OaepSha256).unwrap_err();
    assert!(matches!(
        err,
        RsaError::KeyTooSmall { block_size: 64, overhead: 66 }
    ));
}

#[test]
fn oversized_digest_for_the_key_is_rejected() {
    // A 512-bit key leaves 64 - 11 = 53 bytes per block, too small for SHA-512
    let mut rng = rand::rngs::OsRng;
    let small = PrivateKey::from_reference(rsa::RsaPrivateKey::new(&mut rng, 512).unwrap());

    let err = chunked::sign(b"message", &small, DigestType::Sha512).unwrap_err();
    assert!(matches!(
        err,
        RsaError::InvalidDigestSize { digest_size: 64, max_chunk_size: 53 }
    ));
}
