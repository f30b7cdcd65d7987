//! RSA key material
//!
//! A key value pairs an opaque provider reference (the `rsa` crate key type)
//! with the optional headerless DER bytes it was constructed from. All
//! cryptographic operations go through the reference; the original bytes are
//! kept only for diagnostics and round-tripping. Private material is zeroized
//! when the value is dropped, on every exit path.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::rngs::OsRng;
use rsa::pkcs1::{
    DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey,
};
use rsa::{RsaPrivateKey, RsaPublicKey};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::header::{self, KeyFormatError};
use crate::pem::{self, PemError};

/// Errors raised while constructing or exporting keys
#[derive(Debug, Error)]
pub enum KeyError {
    #[error(transparent)]
    Format(#[from] KeyFormatError),

    #[error(transparent)]
    Pem(#[from] PemError),

    #[error("the provided string is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The provider rejected the bytes as an RSA public key
    #[error("the provided key is not a valid RSA public key")]
    NotAPublicKey(#[source] rsa::pkcs1::Error),

    /// The provider rejected the bytes as an RSA private key
    #[error("the provided key is not a valid RSA private key")]
    NotAPrivateKey(#[source] rsa::pkcs1::Error),

    #[error("couldn't produce a DER representation of the key")]
    RepresentationFailed(#[source] rsa::pkcs1::Error),

    #[error("couldn't generate an RSA key pair")]
    GenerationFailed(#[source] rsa::errors::Error),
}

/// Supported key sizes for generation, in bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySize {
    Bit2048 = 2048,
    Bit4096 = 4096,
}

/// An RSA public key
#[derive(Debug, Clone)]
pub struct PublicKey {
    reference: RsaPublicKey,
    original_data: Option<Vec<u8>>,
}

impl PublicKey {
    /// Builds a key from DER bytes, accepting both headerless PKCS#1 and
    /// X.509 SubjectPublicKeyInfo input. Any header is stripped before the
    /// provider parses the key.
    pub fn from_der(data: &[u8]) -> Result<Self, KeyError> {
        let headerless = header::strip(data)?;
        let reference =
            RsaPublicKey::from_pkcs1_der(&headerless).map_err(KeyError::NotAPublicKey)?;
        Ok(Self { reference, original_data: Some(headerless) })
    }

    /// Builds a key from a base64-encoded DER string.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        Self::from_der(&BASE64.decode(encoded)?)
    }

    /// Builds a key from a PEM block.
    pub fn from_pem(text: &str) -> Result<Self, KeyError> {
        Self::from_der(&pem::from_pem(text)?)
    }

    /// Wraps an existing provider reference.
    pub fn from_reference(reference: RsaPublicKey) -> Self {
        Self { reference, original_data: None }
    }

    /// Scans a text blob for armored `PUBLIC KEY` blocks and returns a key
    /// for every block that parses.
    ///
    /// Best-effort by design: blocks that fail to decode or parse are
    /// silently skipped, so one malformed key does not hide the others.
    pub fn from_pem_blocks(text: &str) -> Vec<PublicKey> {
        pem::extract_public_key_blocks(text)
            .iter()
            .filter_map(|block| Self::from_der(block).ok())
            .collect()
    }

    pub fn reference(&self) -> &RsaPublicKey {
        &self.reference
    }

    /// The headerless bytes this key was constructed from, if it was built
    /// from raw data rather than an existing reference.
    pub fn original_data(&self) -> Option<&[u8]> {
        self.original_data.as_deref()
    }

    /// Headerless PKCS#1 DER export.
    pub fn to_der(&self) -> Result<Vec<u8>, KeyError> {
        let der = self
            .reference
            .to_pkcs1_der()
            .map_err(KeyError::RepresentationFailed)?;
        Ok(der.as_bytes().to_vec())
    }

    /// X.509 SubjectPublicKeyInfo DER export.
    pub fn to_x509_der(&self) -> Result<Vec<u8>, KeyError> {
        Ok(header::wrap_with_x509(&self.to_der()?)?)
    }

    /// PEM export with the `RSA PUBLIC KEY` label.
    pub fn to_pem(&self) -> Result<String, KeyError> {
        Ok(pem::to_pem(&self.to_der()?, "RSA PUBLIC KEY"))
    }
}

/// An RSA private key.
///
/// The provider key zeroizes its material on drop; retained original bytes
/// are held in a [`Zeroizing`] buffer so they are cleared as well.
pub struct PrivateKey {
    reference: RsaPrivateKey,
    original_data: Option<Zeroizing<Vec<u8>>>,
}

impl PrivateKey {
    /// Builds a key from DER bytes, accepting both headerless PKCS#1 and
    /// PKCS#8 PrivateKeyInfo input.
    pub fn from_der(data: &[u8]) -> Result<Self, KeyError> {
        let headerless = Zeroizing::new(header::strip(data)?);
        let reference =
            RsaPrivateKey::from_pkcs1_der(&headerless).map_err(KeyError::NotAPrivateKey)?;
        Ok(Self { reference, original_data: Some(headerless) })
    }

    /// Builds a key from a base64-encoded DER string.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        Self::from_der(&BASE64.decode(encoded)?)
    }

    /// Builds a key from a PEM block.
    pub fn from_pem(text: &str) -> Result<Self, KeyError> {
        Self::from_der(&pem::from_pem(text)?)
    }

    /// Wraps an existing provider reference.
    pub fn from_reference(reference: RsaPrivateKey) -> Self {
        Self { reference, original_data: None }
    }

    pub fn reference(&self) -> &RsaPrivateKey {
        &self.reference
    }

    pub fn original_data(&self) -> Option<&[u8]> {
        self.original_data.as_deref().map(Vec::as_slice)
    }

    /// Headerless PKCS#1 DER export.
    pub fn to_der(&self) -> Result<Vec<u8>, KeyError> {
        let der = self
            .reference
            .to_pkcs1_der()
            .map_err(KeyError::RepresentationFailed)?;
        Ok(der.as_bytes().to_vec())
    }

    /// PEM export with the `RSA PRIVATE KEY` label.
    pub fn to_pem(&self) -> Result<String, KeyError> {
        let der = Zeroizing::new(self.to_der()?);
        Ok(pem::to_pem(&der, "RSA PRIVATE KEY"))
    }

    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_reference(RsaPublicKey::from(&self.reference))
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// Generates a fresh RSA key pair, delegating to the provider.
pub fn generate_key_pair(size: KeySize) -> Result<(PrivateKey, PublicKey), KeyError> {
    let mut rng = OsRng;
    let private = RsaPrivateKey::new(&mut rng, size as usize).map_err(KeyError::GenerationFailed)?;
    let public = RsaPublicKey::from(&private);
    Ok((PrivateKey::from_reference(private), PublicKey::from_reference(public)))
}
