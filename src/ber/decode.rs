//! BER decoding.
//!
//! Zero-copy: nested decoders share the response buffer through `Bytes`.
//! Error offsets are absolute positions in the original message.

use super::length::decode_length;
use super::tag;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// BER decoder over a byte buffer.
pub struct Decoder {
    data: Bytes,
    offset: usize,
    base: usize,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
        }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Absolute offset of the next byte.
    pub fn offset(&self) -> usize {
        self.base + self.offset
    }

    /// Remaining bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check if we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    fn error(&self, kind: DecodeErrorKind) -> Error {
        Error::decode(self.offset(), kind)
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        let Some(&byte) = self.data.get(self.offset) else {
            return Err(self.error(DecodeErrorKind::TruncatedData));
        };
        self.offset += 1;
        Ok(byte)
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> Result<u8> {
        self.read_byte()
    }

    /// Read a length.
    pub fn read_length(&mut self) -> Result<usize> {
        let (len, consumed) = decode_length(&self.data[self.offset..], self.offset())?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        if self.offset.saturating_add(len) > self.data.len() {
            return Err(self.error(DecodeErrorKind::InsufficientData {
                needed: len,
                available: self.remaining(),
            }));
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Read and expect a specific tag, returning the content length.
    pub fn expect_tag(&mut self, expected: u8) -> Result<usize> {
        let start = self.offset();
        let actual = self.read_tag()?;
        if actual != expected {
            return Err(Error::decode(
                start,
                DecodeErrorKind::UnexpectedTag { expected, actual },
            ));
        }
        self.read_length()
    }

    /// Read a BER INTEGER.
    pub fn read_integer(&mut self) -> Result<i32> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        self.read_integer_value(len)
    }

    /// Read INTEGER content of a known length.
    ///
    /// Over-long encodings keep their low 32 bits, as net-snmp does.
    pub fn read_integer_value(&mut self, len: usize) -> Result<i32> {
        if len == 0 {
            return Err(self.error(DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 4 {
            tracing::debug!(
                target: "snmp_southbound::ber",
                { snmp.offset = self.offset(), length = len },
                "integer longer than 4 bytes, truncating"
            );
        }
        let bytes = self.read_bytes(len)?;
        let negative = bytes[0] & 0x80 != 0;
        let mut value: i32 = if negative { -1 } else { 0 };
        for &byte in bytes.iter() {
            value = (value << 8) | i32::from(byte);
        }
        Ok(value)
    }

    /// Read a Counter64.
    pub fn read_integer64(&mut self, expected_tag: u8) -> Result<u64> {
        let len = self.expect_tag(expected_tag)?;
        self.read_integer64_value(len)
    }

    /// Read Counter64 content of a known length.
    pub fn read_integer64_value(&mut self, len: usize) -> Result<u64> {
        if len == 0 {
            return Err(self.error(DecodeErrorKind::ZeroLengthInteger));
        }
        // One leading zero octet plus eight value octets
        if len > 9 {
            return Err(self.error(DecodeErrorKind::Integer64TooLong { length: len }));
        }
        let bytes = self.read_bytes(len)?;
        Ok(bytes
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    /// Read an unsigned 32-bit integer with a specific tag.
    pub fn read_unsigned32(&mut self, expected_tag: u8) -> Result<u32> {
        let len = self.expect_tag(expected_tag)?;
        self.read_unsigned32_value(len)
    }

    /// Read unsigned 32-bit content of a known length.
    pub fn read_unsigned32_value(&mut self, len: usize) -> Result<u32> {
        if len == 0 {
            return Err(self.error(DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 5 {
            tracing::debug!(
                target: "snmp_southbound::ber",
                { snmp.offset = self.offset(), length = len },
                "unsigned integer longer than 5 bytes, truncating"
            );
        }
        let bytes = self.read_bytes(len)?;
        Ok(bytes
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        self.read_bytes(len)
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<()> {
        let len = self.expect_tag(tag::universal::NULL)?;
        if len != 0 {
            return Err(self.error(DecodeErrorKind::InvalidNull));
        }
        Ok(())
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let len = self.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
        self.read_oid_value(len)
    }

    /// Read OID content of a known length.
    pub fn read_oid_value(&mut self, len: usize) -> Result<Oid> {
        let start = self.offset();
        let bytes = self.read_bytes(len)?;
        Oid::from_ber(&bytes).map_err(|e| match e {
            Error::Decode { offset, kind } => Error::decode(start + offset, kind),
            other => other,
        })
    }

    /// Read a SEQUENCE, returning a decoder for its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        self.read_constructed(tag::universal::SEQUENCE)
    }

    /// Read a constructed type with a specific tag, returning a decoder for its contents.
    pub fn read_constructed(&mut self, expected_tag: u8) -> Result<Decoder> {
        let len = self.expect_tag(expected_tag)?;
        self.sub_decoder(len)
    }

    /// Read an IpAddress.
    pub fn read_ip_address(&mut self) -> Result<[u8; 4]> {
        let len = self.expect_tag(tag::application::IP_ADDRESS)?;
        if len != 4 {
            return Err(self.error(DecodeErrorKind::InvalidIpAddressLength { length: len }));
        }
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Skip one TLV without parsing it.
    pub fn skip_tlv(&mut self) -> Result<()> {
        self.read_tag()?;
        let len = self.read_length()?;
        if self.offset.saturating_add(len) > self.data.len() {
            return Err(self.error(DecodeErrorKind::TlvOverflow));
        }
        self.offset += len;
        Ok(())
    }

    /// Create a decoder over the next `len` bytes.
    pub fn sub_decoder(&mut self, len: usize) -> Result<Decoder> {
        let base = self.offset();
        let data = self.read_bytes(len)?;
        Ok(Decoder {
            data,
            offset: 0,
            base,
        })
    }

    /// Remaining data as a slice.
    pub fn remaining_slice(&self) -> &[u8] {
        &self.data[self.offset..]
    }
}
