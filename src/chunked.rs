//! Chunked RSA encryption, decryption and signatures
//!
//! RSA can only transform one block at a time, so payloads larger than a
//! single block are partitioned into padding-scheme-appropriate chunks and
//! each chunk is run through the `rsa` crate independently. Chunk failures
//! carry the byte offset of the failing chunk so callers can tell "this exact
//! range failed" apart from "the whole operation is unsupported". Partial
//! output is never returned.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pkcs1v15Encrypt, Pkcs1v15Sign};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use thiserror::Error;

use crate::keys::{PrivateKey, PublicKey};

/// PKCS#1 v1.5 padding reserves 11 bytes per block
const PKCS1_OVERHEAD: usize = 11;

/// Errors raised by the chunked RSA layer
#[derive(Debug, Error)]
pub enum RsaError {
    /// The chunk starting at byte `index` of the cleartext failed to encrypt
    #[error("couldn't encrypt chunk starting at byte {index}")]
    ChunkEncryptFailed {
        index: usize,
        #[source]
        source: rsa::errors::Error,
    },

    /// The chunk starting at byte `index` of the ciphertext failed to decrypt
    #[error("couldn't decrypt chunk starting at byte {index}")]
    ChunkDecryptFailed {
        index: usize,
        #[source]
        source: rsa::errors::Error,
    },

    /// The selected digest produces more bytes than one block can sign
    #[error("digest size {digest_size} exceeds the maximum chunk size {max_chunk_size} of the key")]
    InvalidDigestSize { digest_size: usize, max_chunk_size: usize },

    /// One block of the key cannot carry even a single cleartext byte
    #[error("key block size {block_size} is too small for a padding overhead of {overhead}")]
    KeyTooSmall { block_size: usize, overhead: usize },

    #[error("couldn't sign the provided digest")]
    SignatureCreateFailed(#[source] rsa::errors::Error),

    /// The provider rejected the verification for a reason other than a
    /// plain signature mismatch
    #[error("couldn't verify the signature of the provided data")]
    SignatureVerifyFailed(#[source] rsa::errors::Error),

    #[error("the provided string is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Asymmetric padding schemes paired with the two envelope versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// PKCS#1 v1.5 encryption padding
    Pkcs1,
    /// OAEP with SHA-256
    OaepSha256,
}

impl Padding {
    /// Per-block padding overhead in bytes. OAEP costs `2 * hash_len + 2`.
    fn overhead(self) -> usize {
        match self {
            Padding::Pkcs1 => PKCS1_OVERHEAD,
            Padding::OaepSha256 => 2 * Sha256::output_size() + 2,
        }
    }

    /// Largest cleartext chunk one block of the given size can carry, or
    /// `None` when the overhead leaves no room for cleartext at all
    pub fn max_chunk_size(self, block_size: usize) -> Option<usize> {
        block_size.checked_sub(self.overhead()).filter(|&size| size > 0)
    }

    fn usable_chunk_size(self, block_size: usize) -> Result<usize, RsaError> {
        self.max_chunk_size(block_size)
            .ok_or(RsaError::KeyTooSmall { block_size, overhead: self.overhead() })
    }
}

/// Digest algorithms supported for signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestType {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestType {
    fn digest(self, message: &[u8]) -> Vec<u8> {
        match self {
            DigestType::Sha1 => Sha1::digest(message).to_vec(),
            DigestType::Sha224 => Sha224::digest(message).to_vec(),
            DigestType::Sha256 => Sha256::digest(message).to_vec(),
            DigestType::Sha384 => Sha384::digest(message).to_vec(),
            DigestType::Sha512 => Sha512::digest(message).to_vec(),
        }
    }

    fn scheme(self) -> Pkcs1v15Sign {
        match self {
            DigestType::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
            DigestType::Sha224 => Pkcs1v15Sign::new::<Sha224>(),
            DigestType::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            DigestType::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
            DigestType::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
        }
    }
}

/// A detached PKCS#1 v1.5 signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    data: Vec<u8>,
}

impl Signature {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn from_base64(encoded: &str) -> Result<Self, RsaError> {
        Ok(Self { data: BASE64.decode(encoded)? })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn base64_string(&self) -> String {
        BASE64.encode(&self.data)
    }
}

/// Encrypts a cleartext of arbitrary length with a public key.
///
/// The cleartext is split into consecutive chunks of at most
/// `block_size - overhead` bytes; each chunk is encrypted independently and
/// the results concatenated in order. Empty input yields empty output.
pub fn encrypt(plaintext: &[u8], key: &PublicKey, padding: Padding) -> Result<Vec<u8>, RsaError> {
    let block_size = key.reference().size();
    let max_chunk_size = padding.usable_chunk_size(block_size)?;
    let mut rng = OsRng;

    let mut ciphertext = Vec::with_capacity(plaintext.len().div_ceil(max_chunk_size) * block_size);
    let mut index = 0;
    while index < plaintext.len() {
        let end = usize::min(index + max_chunk_size, plaintext.len());
        let chunk = &plaintext[index..end];

        let encrypted = match padding {
            Padding::Pkcs1 => key.reference().encrypt(&mut rng, Pkcs1v15Encrypt, chunk),
            Padding::OaepSha256 => key.reference().encrypt(&mut rng, Oaep::new::<Sha256>(), chunk),
        }
        .map_err(|source| RsaError::ChunkEncryptFailed { index, source })?;

        ciphertext.extend_from_slice(&encrypted);
        index = end;
    }
    Ok(ciphertext)
}

/// Decrypts a chunked ciphertext with a private key.
///
/// The ciphertext is split into chunks of exactly `block_size` bytes; a
/// trailing partial chunk means the input was not produced by [`encrypt`]
/// and surfaces as a [`RsaError::ChunkDecryptFailed`] for that offset.
pub fn decrypt(ciphertext: &[u8], key: &PrivateKey, padding: Padding) -> Result<Vec<u8>, RsaError> {
    let block_size = key.reference().size();

    let mut plaintext = Vec::with_capacity(ciphertext.len());
    let mut index = 0;
    while index < ciphertext.len() {
        let end = usize::min(index + block_size, ciphertext.len());
        let chunk = &ciphertext[index..end];

        let decrypted = match padding {
            Padding::Pkcs1 => key.reference().decrypt(Pkcs1v15Encrypt, chunk),
            Padding::OaepSha256 => key.reference().decrypt(Oaep::new::<Sha256>(), chunk),
        }
        .map_err(|source| RsaError::ChunkDecryptFailed { index, source })?;

        plaintext.extend_from_slice(&decrypted);
        index = end;
    }
    Ok(plaintext)
}

/// Hashes a message with the selected digest and signs the digest as a single
/// block. The digest is signed, never the raw message, and signing is never
/// chunked: a digest that does not fit one block is an error.
pub fn sign(message: &[u8], key: &PrivateKey, digest_type: DigestType) -> Result<Signature, RsaError> {
    let digest = digest_type.digest(message);
    let max_chunk_size = Padding::Pkcs1.usable_chunk_size(key.reference().size())?;
    if digest.len() > max_chunk_size {
        return Err(RsaError::InvalidDigestSize { digest_size: digest.len(), max_chunk_size });
    }

    let data = key
        .reference()
        .sign(digest_type.scheme(), &digest)
        .map_err(RsaError::SignatureCreateFailed)?;
    Ok(Signature::new(data))
}

/// Verifies a detached signature over a message.
///
/// A plain signature mismatch returns `Ok(false)`; any other provider
/// failure surfaces as [`RsaError::SignatureVerifyFailed`].
pub fn verify(
    message: &[u8],
    key: &PublicKey,
    signature: &Signature,
    digest_type: DigestType,
) -> Result<bool, RsaError> {
    let digest = digest_type.digest(message);
    match key.reference().verify(digest_type.scheme(), &digest, signature.data()) {
        Ok(()) => Ok(true),
        Err(rsa::errors::Error::Verification) => Ok(false),
        Err(source) => Err(RsaError::SignatureVerifyFailed(source)),
    }
}
