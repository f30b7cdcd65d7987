//! AES-256 bulk encryption boundary
//!
//! Two block modes are supported: GCM (authenticated, preferred) and CBC with
//! PKCS#7 padding (legacy). Both use a 32-byte key and a 16-byte IV so that a
//! single [`SymmetricKey`] shape serves either mode. The ciphers themselves
//! come from the `aes-gcm` and `cbc` crates; this module only selects and
//! drives them.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{AesGcm, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES-256-GCM instantiated with the 16-byte nonce this wire format uses
type Aes256Gcm16 = AesGcm<Aes256, U16>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Symmetric key length in bytes (AES-256)
pub const KEY_LENGTH: usize = 32;
/// Initialization vector length in bytes
pub const IV_LENGTH: usize = 16;

/// Errors raised by the symmetric layer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymmetricError {
    #[error("invalid symmetric key length {0}, expected {KEY_LENGTH}")]
    InvalidKeyLength(usize),

    #[error("invalid initialization vector length {0}, expected {IV_LENGTH}")]
    InvalidIvLength(usize),

    #[error("AES-GCM encryption failed")]
    GcmEncryptFailed,

    /// Authentication tag mismatch, the ciphertext or key is wrong
    #[error("AES-GCM decryption failed, authentication tag mismatch")]
    GcmDecryptFailed,

    /// CBC unpadding failed, the ciphertext or key is wrong. Reported as a
    /// dedicated error instead of returning corrupted plaintext.
    #[error("AES-CBC decryption produced invalid PKCS#7 padding")]
    InvalidCbcPadding,
}

/// Supported AES-256 block modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    /// Authenticated GCM mode
    Gcm,
    /// CBC with PKCS#7 padding, kept for backward compatibility
    Cbc,
}

/// 32-byte authentication key plus 16-byte initialization vector.
///
/// Material is zeroized when the value is dropped, on every exit path.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    authentication_key: [u8; KEY_LENGTH],
    initialization_vector: [u8; IV_LENGTH],
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

impl SymmetricKey {
    /// Builds a key from existing material, validating lengths.
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, SymmetricError> {
        let authentication_key: [u8; KEY_LENGTH] = key
            .try_into()
            .map_err(|_| SymmetricError::InvalidKeyLength(key.len()))?;
        let initialization_vector: [u8; IV_LENGTH] = iv
            .try_into()
            .map_err(|_| SymmetricError::InvalidIvLength(iv.len()))?;
        Ok(Self { authentication_key, initialization_vector })
    }

    /// Generates fresh random key material.
    pub fn generate() -> Self {
        let mut authentication_key = [0u8; KEY_LENGTH];
        let mut initialization_vector = [0u8; IV_LENGTH];
        OsRng.fill_bytes(&mut authentication_key);
        OsRng.fill_bytes(&mut initialization_vector);
        Self { authentication_key, initialization_vector }
    }

    pub fn authentication_key(&self) -> &[u8; KEY_LENGTH] {
        &self.authentication_key
    }

    pub fn initialization_vector(&self) -> &[u8; IV_LENGTH] {
        &self.initialization_vector
    }
}

/// Encrypts a payload, generating fresh key material when none is supplied.
///
/// Returns the ciphertext together with the key that was used, so the caller
/// can wrap and transmit it. A generated key is never reused across two
/// independent encryptions.
pub fn encrypt(
    plaintext: &[u8],
    key: Option<SymmetricKey>,
    mode: BlockMode,
) -> Result<(Vec<u8>, SymmetricKey), SymmetricError> {
    let key = key.unwrap_or_else(SymmetricKey::generate);

    let ciphertext = match mode {
        BlockMode::Gcm => {
            let cipher = Aes256Gcm16::new(Key::<Aes256Gcm16>::from_slice(key.authentication_key()));
            let nonce = Nonce::from_slice(key.initialization_vector());
            cipher
                .encrypt(nonce, plaintext)
                .map_err(|_| SymmetricError::GcmEncryptFailed)?
        }
        BlockMode::Cbc => {
            let cipher = Aes256CbcEnc::new(
                key.authentication_key().into(),
                key.initialization_vector().into(),
            );
            cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext)
        }
    };

    Ok((ciphertext, key))
}

/// Decrypts a payload with the supplied key material.
pub fn decrypt(
    ciphertext: &[u8],
    key: &SymmetricKey,
    mode: BlockMode,
) -> Result<Vec<u8>, SymmetricError> {
    match mode {
        BlockMode::Gcm => {
            let cipher = Aes256Gcm16::new(Key::<Aes256Gcm16>::from_slice(key.authentication_key()));
            let nonce = Nonce::from_slice(key.initialization_vector());
            cipher
                .decrypt(nonce, ciphertext)
                .map_err(|_| SymmetricError::GcmDecryptFailed)
        }
        BlockMode::Cbc => {
            let cipher = Aes256CbcDec::new(
                key.authentication_key().into(),
                key.initialization_vector().into(),
            );
            cipher
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(|_| SymmetricError::InvalidCbcPadding)
        }
    }
}
