//! X.509 / PKCS#8 key header detection and conversion
//!
//! RSA key material arrives in two canonical shapes: "headerless" PKCS#1
//! (a bare `SEQUENCE` of `INTEGER`s) or wrapped in an outer structure whose
//! last element is a BIT STRING (X.509 SubjectPublicKeyInfo) or OCTET STRING
//! (PKCS#8 PrivateKeyInfo) carrying the headerless key. This module converts
//! between the two forms using the [`asn1`](crate::asn1) parser.

use thiserror::Error;

use crate::asn1::{self, Asn1Error, Asn1Node};

/// rsaEncryption, 1.2.840.113549.1.1.1
pub const RSA_ENCRYPTION_OID: [u64; 7] = [1, 2, 840, 113_549, 1, 1, 1];

/// DER bytes of `SEQUENCE { OID rsaEncryption, NULL }`
const RSA_ALGORITHM_IDENTIFIER: [u8; 15] = [
    0x30, 0x0d, 0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01, 0x05, 0x00,
];

/// Errors raised while inspecting or rewriting key structures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyFormatError {
    /// The key bytes are not parseable DER at all
    #[error("couldn't parse the ASN.1 key data: {0}")]
    Asn1(#[from] Asn1Error),

    /// The root ASN.1 node is not a sequence, the key is probably corrupt
    #[error("the root ASN.1 node of the key is not a sequence")]
    InvalidRootNode,

    /// The key parses but has an unexpected ASN.1 structure
    #[error("the key has an unexpected ASN.1 structure")]
    InvalidStructure,

    /// The key is neither headerless nor X.509-wrapped
    #[error("the key format is not recognized, can't prepend an X.509 header")]
    UnrecognizedKeyFormat,
}

/// True iff the key is a bare PKCS#1 structure: a sequence of integers only.
pub fn is_headerless(key: &[u8]) -> Result<bool, KeyFormatError> {
    let node = asn1::parse(key)?;
    match node {
        Asn1Node::Sequence(_) => Ok(node.is_integer_sequence()),
        _ => Ok(false),
    }
}

/// True iff the key is a sequence whose last element is a BIT STRING or
/// OCTET STRING wrapping a nested headerless key.
///
/// When the outer sequence carries an AlgorithmIdentifier with an object
/// identifier, that identifier must be rsaEncryption; any other algorithm
/// makes this check return false.
pub fn has_x509_header(key: &[u8]) -> Result<bool, KeyFormatError> {
    let node = asn1::parse(key)?;
    let Asn1Node::Sequence(nodes) = node else {
        return Ok(false);
    };

    let algorithm_oid = nodes.iter().find_map(|node| match node {
        Asn1Node::Sequence(alg) => match alg.first() {
            Some(Asn1Node::ObjectIdentifier(oid)) => Some(oid.as_slice()),
            _ => None,
        },
        _ => None,
    });
    if let Some(oid) = algorithm_oid {
        if oid != RSA_ENCRYPTION_OID {
            return Ok(false);
        }
    }

    let inner = match nodes.last() {
        Some(Asn1Node::BitString { data, .. }) => data,
        Some(Asn1Node::OctetString(data)) => data,
        _ => return Ok(false),
    };
    Ok(is_headerless(inner).unwrap_or(false))
}

/// Strips the X.509/PKCS#8 header from a DER key.
///
/// Headerless input is returned unchanged. Otherwise the root must be a
/// sequence and its last element a BIT STRING or OCTET STRING, whose inner
/// bytes are returned.
pub fn strip(key: &[u8]) -> Result<Vec<u8>, KeyFormatError> {
    let node = asn1::parse(key)?;

    let Asn1Node::Sequence(ref nodes) = node else {
        return Err(KeyFormatError::InvalidRootNode);
    };

    if node.is_integer_sequence() {
        return Ok(key.to_vec());
    }

    match nodes.last() {
        Some(Asn1Node::BitString { data, .. }) => Ok(data.clone()),
        Some(Asn1Node::OctetString(data)) => Ok(data.clone()),
        _ => Err(KeyFormatError::InvalidStructure),
    }
}

/// Prepends the fixed X.509 SubjectPublicKeyInfo header to a headerless key:
/// `SEQUENCE { SEQUENCE { OID rsaEncryption, NULL }, BIT STRING { key } }`.
///
/// Already-wrapped keys are returned unchanged; anything else fails with
/// [`KeyFormatError::UnrecognizedKeyFormat`].
pub fn wrap_with_x509(key: &[u8]) -> Result<Vec<u8>, KeyFormatError> {
    if is_headerless(key)? {
        Ok(prepend_x509_header(key))
    } else if has_x509_header(key)? {
        Ok(key.to_vec())
    } else {
        Err(KeyFormatError::UnrecognizedKeyFormat)
    }
}

fn prepend_x509_header(key: &[u8]) -> Vec<u8> {
    let mut bit_string = vec![0x03];
    bit_string.extend(asn1::encode_length(key.len() + 1));
    bit_string.push(0x00); // no unused bits
    bit_string.extend_from_slice(key);

    let mut out = vec![0x30];
    out.extend(asn1::encode_length(RSA_ALGORITHM_IDENTIFIER.len() + bit_string.len()));
    out.extend_from_slice(&RSA_ALGORITHM_IDENTIFIER);
    out.extend(bit_string);
    out
}
