//! Hybrid envelope encryption
//!
//! A payload is bulk-encrypted with a fresh AES key, the key material is
//! serialized as a small JSON attribute record, that record is RSA-encrypted
//! through the chunked cipher, and the two parts travel together as an
//! [`Envelope`]. Two fixed algorithm suites are supported for backward
//! compatibility; the suite is an explicit input to both operations and is
//! never auto-detected, so mixing suites fails deterministically instead of
//! producing wrong plaintext.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chunked::{self, Padding, RsaError};
use crate::keys::{PrivateKey, PublicKey};
use crate::symmetric::{self, BlockMode, SymmetricError, SymmetricKey};

/// Errors raised while assembling or opening envelopes
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Legacy wire shapes allow the attribute to be absent; decryption
    /// without it is impossible
    #[error("the envelope carries no encrypted cipher attribute")]
    MissingCipherAttr,

    #[error("the encrypted cipher attribute is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The RSA layer produced bytes that are not a valid attribute record
    #[error("couldn't decode the cipher attribute record: {0}")]
    CipherAttrDecodeFailed(#[from] serde_json::Error),

    #[error(transparent)]
    Rsa(#[from] RsaError),

    #[error(transparent)]
    Symmetric(#[from] SymmetricError),
}

/// The two supported algorithm suites.
///
/// Adding a suite is a compatibility decision, not a configuration toggle:
/// every deployed decryptor must learn a new version before anyone encrypts
/// with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// AES-256-GCM bulk encryption, RSA OAEP-SHA256 key wrapping
    GcmOaep,
    /// AES-256-CBC with PKCS#7 padding, RSA PKCS#1 v1.5 key wrapping (legacy)
    CbcPkcs1,
}

impl Version {
    pub(crate) fn block_mode(self) -> BlockMode {
        match self {
            Version::GcmOaep => BlockMode::Gcm,
            Version::CbcPkcs1 => BlockMode::Cbc,
        }
    }

    pub(crate) fn padding(self) -> Padding {
        match self {
            Version::GcmOaep => Padding::OaepSha256,
            Version::CbcPkcs1 => Padding::Pkcs1,
        }
    }
}

/// The symmetric key material record that crosses the RSA boundary.
///
/// Field names are fixed wire identifiers; the byte fields serialize as
/// base64 strings.
#[derive(Debug, Serialize, Deserialize)]
pub struct CipherAttr {
    /// Authentication key bytes
    #[serde(rename = "base64EncodedKey", with = "base64_bytes")]
    pub key: Vec<u8>,

    /// Initialization vector bytes
    #[serde(rename = "base64EncodedIV", with = "base64_bytes")]
    pub iv: Vec<u8>,
}

/// Base64-string representation for byte fields, matching the wire format
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// The transmittable result of hybrid encryption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Bulk ciphertext of the payload
    pub ciphertext: Vec<u8>,
    /// Base64 of the RSA-encrypted [`CipherAttr`]; `None` only occurs in a
    /// legacy wire shape and always fails at decryption time
    pub encrypted_cipher_attr: Option<String>,
}

/// Encrypts a payload under a freshly generated symmetric key.
pub fn encrypt(
    payload: &[u8],
    key: &PublicKey,
    version: Version,
) -> Result<Envelope, EnvelopeError> {
    encrypt_with(payload, key, None, version)
}

/// Encrypts a payload, using the caller-supplied symmetric key material when
/// one is given.
pub fn encrypt_with(
    payload: &[u8],
    key: &PublicKey,
    symmetric_key: Option<SymmetricKey>,
    version: Version,
) -> Result<Envelope, EnvelopeError> {
    let (ciphertext, used_key) = symmetric::encrypt(payload, symmetric_key, version.block_mode())?;

    let attr = CipherAttr {
        key: used_key.authentication_key().to_vec(),
        iv: used_key.initialization_vector().to_vec(),
    };
    let attr_json = serde_json::to_vec(&attr)?;

    let encrypted_attr = chunked::encrypt(&attr_json, key, version.padding())?;

    Ok(Envelope {
        ciphertext,
        encrypted_cipher_attr: Some(BASE64.encode(encrypted_attr)),
    })
}

/// Opens an envelope with the matching private key and suite.
///
/// The suite must be the one the envelope was encrypted with; a mismatch
/// fails at the RSA or symmetric layer, it never yields wrong plaintext.
pub fn decrypt(
    envelope: &Envelope,
    key: &PrivateKey,
    version: Version,
) -> Result<Vec<u8>, EnvelopeError> {
    let attr_base64 = envelope
        .encrypted_cipher_attr
        .as_ref()
        .ok_or(EnvelopeError::MissingCipherAttr)?;
    let encrypted_attr = BASE64.decode(attr_base64)?;

    let attr_json = chunked::decrypt(&encrypted_attr, key, version.padding())?;
    let attr: CipherAttr = serde_json::from_slice(&attr_json)?;
    let symmetric_key = SymmetricKey::new(&attr.key, &attr.iv)?;

    Ok(symmetric::decrypt(&envelope.ciphertext, &symmetric_key, version.block_mode())?)
}
