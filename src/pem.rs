//! PEM text armor codec
//!
//! Converts between RFC 7468 PEM framing and raw DER bytes, and scans free-form
//! text for armored public key blocks.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref PUBLIC_KEY_BLOCK: Regex =
        Regex::new(r"(?s)-----BEGIN PUBLIC KEY-----.+?-----END PUBLIC KEY-----")
            .expect("static regex");
}

/// Errors raised while decoding PEM text
#[derive(Debug, Error)]
pub enum PemError {
    /// No data lines remain once the BEGIN/END framing is stripped
    #[error("no key data available after stripping PEM headers")]
    EmptyKeyData,

    /// The PEM body is not valid base64
    #[error("invalid base64 in PEM body: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Encodes raw bytes as a PEM block with the given label.
///
/// The base64 body is hard-wrapped at 64 characters per RFC 7468, lines joined
/// with a single newline.
pub fn to_pem(data: &[u8], label: &str) -> String {
    let encoded = BASE64.encode(data);
    let body = encoded
        .as_bytes()
        .chunks(64)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join("\n");
    format!("-----BEGIN {label}-----\n{body}\n-----END {label}-----")
}

/// Decodes a PEM block back into raw bytes.
///
/// Every line starting with `-----BEGIN` or `-----END` is discarded, the
/// remainder concatenated and base64-decoded.
pub fn from_pem(text: &str) -> Result<Vec<u8>, PemError> {
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.starts_with("-----BEGIN") && !line.starts_with("-----END"))
        .collect();

    if lines.is_empty() {
        return Err(PemError::EmptyKeyData);
    }

    Ok(BASE64.decode(lines.concat())?)
}

/// Scans a text blob for all armored `PUBLIC KEY` blocks and decodes each one
/// independently.
///
/// This is a deliberate best-effort extraction: a block whose body fails to
/// decode is silently skipped rather than aborting the whole scan, so a
/// document mixing valid and malformed keys still yields every usable key.
/// Empty input yields an empty vec.
pub fn extract_public_key_blocks(text: &str) -> Vec<Vec<u8>> {
    PUBLIC_KEY_BLOCK
        .find_iter(text)
        .filter_map(|m| from_pem(m.as_str()).ok())
        .collect()
}
