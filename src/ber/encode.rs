//! BER encoding.
//!
//! Uses a reverse buffer: content is written first and the length and tag
//! are prepended afterwards, so nested lengths never need a second pass.
//! Callers therefore push the fields of a SEQUENCE last-to-first.

use super::length::encode_length;
use super::tag;
use bytes::Bytes;

/// Buffer for BER encoding that grows backwards.
pub struct EncodeBuf {
    buf: Vec<u8>,
}

impl EncodeBuf {
    /// Create a new encode buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(512)
    }

    /// Create a new encode buffer with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Prepend bytes, keeping their order in the final output.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend(bytes.iter().rev());
    }

    /// Prepend a BER length.
    pub fn push_length(&mut self, len: usize) {
        let (bytes, count) = encode_length(len);
        self.buf.extend_from_slice(&bytes[..count]);
    }

    /// Prepend a tag octet.
    pub fn push_tag(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Prepend a complete primitive TLV.
    pub fn push_tlv(&mut self, tag: u8, content: &[u8]) {
        self.push_bytes(content);
        self.push_length(content.len());
        self.push_tag(tag);
    }

    /// Encode a constructed type (SEQUENCE, PDU, ...).
    ///
    /// The closure writes the contents; length and tag are added around them.
    pub fn push_constructed<F>(&mut self, tag: u8, f: F)
    where
        F: FnOnce(&mut Self),
    {
        let start = self.len();
        f(self);
        let content_len = self.len() - start;
        self.push_length(content_len);
        self.push_tag(tag);
    }

    /// Encode a SEQUENCE.
    pub fn push_sequence<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push_constructed(tag::universal::SEQUENCE, f);
    }

    /// Encode an INTEGER.
    pub fn push_integer(&mut self, value: i32) {
        let bytes = value.to_be_bytes();
        self.push_tlv(tag::universal::INTEGER, minimal_signed(&bytes));
    }

    /// Encode a Counter64.
    pub fn push_integer64(&mut self, value: u64) {
        self.push_unsigned(tag::application::COUNTER64, &value.to_be_bytes());
    }

    /// Encode an unsigned 32-bit integer under `tag` (Counter32, Gauge32, TimeTicks, ...).
    pub fn push_unsigned32(&mut self, tag: u8, value: u32) {
        self.push_unsigned(tag, &value.to_be_bytes());
    }

    fn push_unsigned(&mut self, tag: u8, be: &[u8]) {
        let digits = minimal_unsigned(be);
        self.push_bytes(digits);
        let mut len = digits.len();
        // A set high bit would read back as negative
        if digits[0] & 0x80 != 0 {
            self.buf.push(0x00);
            len += 1;
        }
        self.push_length(len);
        self.push_tag(tag);
    }

    /// Encode an OCTET STRING.
    pub fn push_octet_string(&mut self, data: &[u8]) {
        self.push_tlv(tag::universal::OCTET_STRING, data);
    }

    /// Encode a NULL.
    pub fn push_null(&mut self) {
        self.push_tlv(tag::universal::NULL, &[]);
    }

    /// Encode an OBJECT IDENTIFIER.
    pub fn push_oid(&mut self, oid: &crate::oid::Oid) {
        self.push_tlv(tag::universal::OBJECT_IDENTIFIER, &oid.to_ber_smallvec());
    }

    /// Encode an IpAddress.
    pub fn push_ip_address(&mut self, addr: [u8; 4]) {
        self.push_tlv(tag::application::IP_ADDRESS, &addr);
    }

    /// Finalize and return the encoded bytes in wire order.
    pub fn finish(mut self) -> Bytes {
        self.buf.reverse();
        Bytes::from(self.buf)
    }
}

impl Default for EncodeBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip redundant leading sign octets from a big-endian two's complement value.
fn minimal_signed(be: &[u8]) -> &[u8] {
    let mut start = 0;
    while start + 1 < be.len() {
        let redundant = (be[start] == 0x00 && be[start + 1] & 0x80 == 0)
            || (be[start] == 0xFF && be[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    &be[start..]
}

/// Strip leading zero octets, keeping at least one.
fn minimal_unsigned(be: &[u8]) -> &[u8] {
    let start = be
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(be.len().saturating_sub(1));
    &be[start..]
}
