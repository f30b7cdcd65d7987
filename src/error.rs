//! Unified error type for the public API
//!
//! Internal modules keep their domain-specific errors for precise handling;
//! this type consolidates them behind `#[from]` conversions for callers that
//! just want one error to match on.

use thiserror::Error;

use crate::asn1::Asn1Error;
use crate::chunked::RsaError;
use crate::envelope::EnvelopeError;
use crate::header::KeyFormatError;
use crate::keys::KeyError;
use crate::pem::PemError;
use crate::symmetric::SymmetricError;

/// Unified error type for all envseal operations
#[derive(Debug, Error)]
pub enum CryptoError {
    /// ASN.1 DER parsing error
    #[error("ASN.1 error: {0}")]
    Asn1(#[from] Asn1Error),

    /// Key structure detection or conversion error
    #[error("key format error: {0}")]
    KeyFormat(#[from] KeyFormatError),

    /// PEM framing or encoding error
    #[error("PEM error: {0}")]
    Pem(#[from] PemError),

    /// Key construction, export or generation error
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// Chunked RSA or signature error
    #[error("RSA error: {0}")]
    Rsa(#[from] RsaError),

    /// Symmetric cipher error
    #[error("symmetric cipher error: {0}")]
    Symmetric(#[from] SymmetricError),

    /// Envelope assembly or opening error
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),
}

impl CryptoError {
    /// True for errors detected locally in input bytes (malformed ASN.1, PEM,
    /// base64 or attribute records), as opposed to provider failures.
    pub fn is_format_error(&self) -> bool {
        match self {
            Self::Asn1(_) | Self::KeyFormat(_) | Self::Pem(_) => true,
            Self::Key(e) => !matches!(e, KeyError::GenerationFailed(_)),
            Self::Rsa(e) => matches!(e, RsaError::InvalidBase64(_)),
            Self::Envelope(e) => matches!(
                e,
                EnvelopeError::MissingCipherAttr
                    | EnvelopeError::InvalidBase64(_)
                    | EnvelopeError::CipherAttrDecodeFailed(_)
            ),
            Self::Symmetric(_) => false,
        }
    }

    /// True for failures reported by the cryptographic provider
    pub fn is_provider_error(&self) -> bool {
        match self {
            Self::Symmetric(_) => true,
            Self::Rsa(e) => !matches!(e, RsaError::InvalidBase64(_)),
            Self::Key(e) => matches!(e, KeyError::GenerationFailed(_)),
            Self::Envelope(e) => {
                matches!(e, EnvelopeError::Rsa(_) | EnvelopeError::Symmetric(_))
            }
            _ => false,
        }
    }
}
