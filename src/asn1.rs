//! Minimal ASN.1 DER parser
//!
//! Parses a DER byte buffer into a tree of typed nodes. Only the subset needed
//! to recognize RSA key structures is supported: SEQUENCE, INTEGER, BIT STRING,
//! OCTET STRING, OBJECT IDENTIFIER and NULL. Anything else is preserved as an
//! opaque `Unknown` node. Indefinite-length BER is rejected outright.

use thiserror::Error;

/// Errors raised while decoding DER bytes
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Asn1Error {
    /// The tag/length/value structure is truncated or inconsistent
    #[error("malformed DER encoding at offset {offset}")]
    MalformedEncoding { offset: usize },
}

/// A single node of the parsed DER tree.
///
/// Sequences own their children; the tree is produced and consumed within a
/// single parse/transform call and holds no references into the input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asn1Node {
    /// Constructed SEQUENCE, children in document order
    Sequence(Vec<Asn1Node>),
    /// INTEGER as raw big-endian magnitude bytes (sign byte included as encoded)
    Integer(Vec<u8>),
    /// BIT STRING with the leading unused-bit count stripped from the payload
    BitString { data: Vec<u8>, unused_bits: u8 },
    /// OCTET STRING payload
    OctetString(Vec<u8>),
    /// OBJECT IDENTIFIER as numeric components
    ObjectIdentifier(Vec<u64>),
    /// NULL
    Null,
    /// Any tag outside the supported subset, kept verbatim
    Unknown { tag: u8, data: Vec<u8> },
}

impl Asn1Node {
    /// True if this node is a sequence containing only INTEGER children
    pub fn is_integer_sequence(&self) -> bool {
        match self {
            Asn1Node::Sequence(nodes) => {
                nodes.iter().all(|n| matches!(n, Asn1Node::Integer(_)))
            }
            _ => false,
        }
    }
}

/// Parses a complete DER document into a single root node.
///
/// Fails with [`Asn1Error::MalformedEncoding`] when the buffer is truncated,
/// a declared length exceeds the remaining bytes, or bytes trail the root node.
pub fn parse(data: &[u8]) -> Result<Asn1Node, Asn1Error> {
    let mut reader = Reader { data, pos: 0 };
    let node = reader.read_node()?;
    if reader.pos != data.len() {
        return Err(Asn1Error::MalformedEncoding { offset: reader.pos });
    }
    Ok(node)
}

/// Encodes a DER length field (short form below 128, long form above)
pub(crate) fn encode_length(len: usize) -> Vec<u8> {
    if len < 0x80 {
        return vec![len as u8];
    }
    let mut be = len.to_be_bytes().to_vec();
    while be.first() == Some(&0) {
        be.remove(0);
    }
    let mut out = vec![0x80 | be.len() as u8];
    out.extend(be);
    out
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn malformed(&self) -> Asn1Error {
        Asn1Error::MalformedEncoding { offset: self.pos }
    }

    fn read_byte(&mut self) -> Result<u8, Asn1Error> {
        let byte = *self.data.get(self.pos).ok_or_else(|| self.malformed())?;
        self.pos += 1;
        Ok(byte)
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], Asn1Error> {
        if count > self.data.len() - self.pos {
            return Err(self.malformed());
        }
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    fn read_length(&mut self) -> Result<usize, Asn1Error> {
        let first = self.read_byte()?;
        if first & 0x80 == 0 {
            return Ok(first as usize);
        }
        let count = (first & 0x7f) as usize;
        // 0x80 would be BER indefinite length, which DER forbids
        if count == 0 || count > std::mem::size_of::<usize>() {
            return Err(self.malformed());
        }
        let mut length: usize = 0;
        for &byte in self.take(count)? {
            length = (length << 8) | byte as usize;
        }
        Ok(length)
    }

    fn read_node(&mut self) -> Result<Asn1Node, Asn1Error> {
        let tag = self.read_byte()?;
        let length = self.read_length()?;
        let content_start = self.pos;
        let content = self.take(length)?;

        let node = match tag {
            0x30 => {
                let mut children = Vec::new();
                let mut inner = Reader { data: content, pos: 0 };
                while inner.pos < content.len() {
                    children.push(inner.read_node().map_err(
                        |Asn1Error::MalformedEncoding { offset }| Asn1Error::MalformedEncoding {
                            offset: content_start + offset,
                        },
                    )?);
                }
                Asn1Node::Sequence(children)
            }
            0x02 => Asn1Node::Integer(content.to_vec()),
            0x03 => {
                let (&unused_bits, payload) = content
                    .split_first()
                    .ok_or(Asn1Error::MalformedEncoding { offset: content_start })?;
                if unused_bits > 7 {
                    return Err(Asn1Error::MalformedEncoding { offset: content_start });
                }
                Asn1Node::BitString { data: payload.to_vec(), unused_bits }
            }
            0x04 => Asn1Node::OctetString(content.to_vec()),
            0x05 => {
                if !content.is_empty() {
                    return Err(Asn1Error::MalformedEncoding { offset: content_start });
                }
                Asn1Node::Null
            }
            0x06 => Asn1Node::ObjectIdentifier(decode_oid(content, content_start)?),
            _ => Asn1Node::Unknown { tag, data: content.to_vec() },
        };
        Ok(node)
    }
}

fn decode_oid(content: &[u8], offset: usize) -> Result<Vec<u64>, Asn1Error> {
    let malformed = Asn1Error::MalformedEncoding { offset };
    if content.is_empty() {
        return Err(malformed);
    }

    // Every subidentifier, including the first, is a base-128 group with the
    // high bit marking continuation
    let mut groups = Vec::new();
    let mut value: u64 = 0;
    let mut in_group = false;
    for &byte in content {
        value = value
            .checked_mul(128)
            .and_then(|v| v.checked_add((byte & 0x7f) as u64))
            .ok_or(malformed.clone())?;
        if byte & 0x80 == 0 {
            groups.push(value);
            value = 0;
            in_group = false;
        } else {
            in_group = true;
        }
    }
    // A set continuation bit on the final byte means the last group never ended
    if in_group {
        return Err(malformed);
    }

    // The first group packs the first two components as 40*X + Y, with X
    // capped at 2 and any excess belonging to Y
    let mut components = Vec::with_capacity(groups.len() + 1);
    if groups[0] < 80 {
        components.push(groups[0] / 40);
        components.push(groups[0] % 40);
    } else {
        components.push(2);
        components.push(groups[0] - 80);
    }
    components.extend_from_slice(&groups[1..]);
    Ok(components)
}
