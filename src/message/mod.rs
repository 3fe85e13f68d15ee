//! SNMP message wrappers.
//!
//! - [`CommunityMessage`]: v1/v2c, authenticated by community string
//! - [`V3Message`]: v3 with USM security parameters

mod community;
mod v3;

pub use community::CommunityMessage;
pub use v3::{
    DEFAULT_MSG_MAX_SIZE, MsgFlags, MsgGlobalData, ScopedPdu, SecurityLevel, V3Message,
    V3MessageData,
};

use crate::ber::Decoder;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::version::Version;
use bytes::Bytes;

/// Decoded SNMP message of any version.
#[derive(Debug, Clone)]
pub enum Message {
    Community(CommunityMessage),
    V3(V3Message),
}

impl Message {
    /// Protocol version of the message.
    pub fn version(&self) -> Version {
        match self {
            Message::Community(m) => m.version,
            Message::V3(_) => Version::V3,
        }
    }

    /// Decode a message, dispatching on its version field.
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;

        let at = seq.offset();
        let raw = seq.read_integer()?;
        let version = Version::from_i32(raw)
            .ok_or_else(|| Error::decode(at, DecodeErrorKind::UnknownVersion(raw)))?;

        match version {
            Version::V1 | Version::V2c => Ok(Message::Community(
                CommunityMessage::decode_from_sequence(&mut seq, version)?,
            )),
            Version::V3 => Ok(Message::V3(V3Message::decode_from_sequence(&mut seq)?)),
        }
    }

    /// Encode to BER.
    pub fn encode(&self) -> Bytes {
        match self {
            Message::Community(m) => m.encode(),
            Message::V3(m) => m.encode(),
        }
    }
}
