//! Hybrid RSA/AES envelope encryption
//!
//! This crate encrypts opaque byte payloads with a hybrid scheme: the payload
//! is bulk-encrypted with a fresh AES-256 key, the key material is wrapped
//! with chunked RSA, and both parts travel together as an [`Envelope`]. It
//! also carries the key plumbing needed to consume RSA keys supplied in
//! heterogeneous external formats: a minimal ASN.1 DER parser, X.509
//! SubjectPublicKeyInfo header stripping and wrapping, and a PEM codec with a
//! best-effort multi-key scanner.
//!
//! Two algorithm suites are supported for backward compatibility, selected
//! explicitly per call (never auto-detected):
//!
//! - [`Version::GcmOaep`]: AES-256-GCM with RSA OAEP-SHA256
//! - [`Version::CbcPkcs1`]: AES-256-CBC/PKCS#7 with RSA PKCS#1 v1.5
//!
//! # Example
//!
//! ```no_run
//! use envseal::{envelope, generate_key_pair, KeySize, Version};
//!
//! # fn example() -> Result<(), envseal::CryptoError> {
//! let (private_key, public_key) = generate_key_pair(KeySize::Bit2048)?;
//!
//! let sealed = envelope::encrypt(b"hello world", &public_key, Version::GcmOaep)?;
//! let opened = envelope::decrypt(&sealed, &private_key, Version::GcmOaep)?;
//! assert_eq!(opened, b"hello world");
//! # Ok(())
//! # }
//! ```

pub mod asn1;
pub mod chunked;
pub mod envelope;
mod error;
pub mod header;
pub mod keys;
pub mod pem;
pub mod symmetric;

pub use asn1::{Asn1Error, Asn1Node};
pub use chunked::{DigestType, Padding, RsaError, Signature};
pub use envelope::{CipherAttr, Envelope, EnvelopeError, Version};
pub use error::CryptoError;
pub use header::KeyFormatError;
pub use keys::{generate_key_pair, KeyError, KeySize, PrivateKey, PublicKey};
pub use pem::PemError;
pub use symmetric::{BlockMode, SymmetricError, SymmetricKey};
