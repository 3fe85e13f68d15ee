//! Community-based message format shared by SNMPv1 and SNMPv2c.
//!
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu PDU }`

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::pdu::Pdu;
use crate::version::Version;
use bytes::Bytes;

/// v1/v2c message.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityMessage {
    pub version: Version,
    pub community: Bytes,
    pub pdu: Pdu,
}

impl CommunityMessage {
    /// Create a message. `version` must be V1 or V2c.
    pub fn new(version: Version, community: impl AsRef<[u8]>, pdu: Pdu) -> Self {
        debug_assert!(version != Version::V3);
        Self {
            version,
            community: Bytes::copy_from_slice(community.as_ref()),
            pdu,
        }
    }

    /// Encode to BER.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.community);
            buf.push_integer(self.version.as_i32());
        });
        buf.finish()
    }

    /// Decode a complete message.
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;
        let at = seq.offset();
        let raw = seq.read_integer()?;
        let version = Version::from_i32(raw)
            .ok_or_else(|| Error::decode(at, DecodeErrorKind::UnknownVersion(raw)))?;
        Self::decode_from_sequence(&mut seq, version)
    }

    /// Decode the remainder after the version field.
    pub(crate) fn decode_from_sequence(seq: &mut Decoder, version: Version) -> Result<Self> {
        if version == Version::V3 {
            return Err(Error::decode(
                seq.offset(),
                DecodeErrorKind::UnknownVersion(version.as_i32()),
            ));
        }
        let community = seq.read_octet_string()?;
        let pdu = Pdu::decode(seq)?;
        Ok(Self {
            version,
            community,
            pdu,
        })
    }
}
