//! SNMPv3 message format (RFC 3412).
//!
//! ```text
//! SEQUENCE {
//!     INTEGER version (3)
//!     SEQUENCE msgGlobalData { msgID, msgMaxSize, msgFlags, msgSecurityModel }
//!     OCTET STRING msgSecurityParameters (USM-encoded)
//!     msgData: plaintext ScopedPDU, or OCTET STRING holding the encrypted one
//! }
//! ```

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::pdu::Pdu;
use crate::v3::UsmSecurityParams;

/// User-based Security Model identifier.
const USM_SECURITY_MODEL: i32 = 3;

/// msgMaxSize advertised in requests: the largest UDP payload over IPv4.
pub const DEFAULT_MSG_MAX_SIZE: i32 = 65507;

/// USM security level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SecurityLevel {
    NoAuthNoPriv,
    AuthNoPriv,
    AuthPriv,
}

impl SecurityLevel {
    /// Decode from the low two msgFlags bits. Privacy without authentication is invalid.
    pub fn from_flags(flags: u8) -> Option<Self> {
        match (flags & 0x01 != 0, flags & 0x02 != 0) {
            (false, false) => Some(Self::NoAuthNoPriv),
            (true, false) => Some(Self::AuthNoPriv),
            (true, true) => Some(Self::AuthPriv),
            (false, true) => None,
        }
    }

    pub fn to_flags(self) -> u8 {
        match self {
            Self::NoAuthNoPriv => 0x00,
            Self::AuthNoPriv => 0x01,
            Self::AuthPriv => 0x03,
        }
    }

    pub fn requires_auth(self) -> bool {
        self >= Self::AuthNoPriv
    }

    pub fn requires_priv(self) -> bool {
        self == Self::AuthPriv
    }
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAuthNoPriv => write!(f, "noAuthNoPriv"),
            Self::AuthNoPriv => write!(f, "authNoPriv"),
            Self::AuthPriv => write!(f, "authPriv"),
        }
    }
}

/// msgFlags octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsgFlags {
    pub security_level: SecurityLevel,
    pub reportable: bool,
}

impl MsgFlags {
    pub fn new(security_level: SecurityLevel, reportable: bool) -> Self {
        Self {
            security_level,
            reportable,
        }
    }

    pub fn to_byte(self) -> u8 {
        let mut flags = self.security_level.to_flags();
        if self.reportable {
            flags |= 0x04;
        }
        flags
    }
}

/// msgGlobalData header.
#[derive(Debug, Clone, PartialEq)]
pub struct MsgGlobalData {
    pub msg_id: i32,
    pub msg_max_size: i32,
    pub msg_flags: MsgFlags,
}

impl MsgGlobalData {
    pub fn new(msg_id: i32, msg_flags: MsgFlags) -> Self {
        Self {
            msg_id,
            msg_max_size: DEFAULT_MSG_MAX_SIZE,
            msg_flags,
        }
    }

    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            buf.push_integer(USM_SECURITY_MODEL);
            buf.push_octet_string(&[self.msg_flags.to_byte()]);
            buf.push_integer(self.msg_max_size);
            buf.push_integer(self.msg_id);
        });
    }

    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let msg_id = seq.read_integer()?;
        let msg_max_size = seq.read_integer()?;

        let at = seq.offset();
        let flags = seq.read_octet_string()?;
        let &[byte] = &flags[..] else {
            return Err(Error::decode(at, DecodeErrorKind::InvalidLength));
        };
        let security_level = SecurityLevel::from_flags(byte)
            .ok_or_else(|| Error::decode(at, DecodeErrorKind::InvalidMsgFlags))?;

        let at = seq.offset();
        let model = seq.read_integer()?;
        if model != USM_SECURITY_MODEL {
            return Err(Error::decode(
                at,
                DecodeErrorKind::UnknownSecurityModel(model),
            ));
        }

        Ok(Self {
            msg_id,
            msg_max_size,
            msg_flags: MsgFlags::new(security_level, byte & 0x04 != 0),
        })
    }
}

/// ScopedPDU: context plus PDU.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedPdu {
    pub context_engine_id: Bytes,
    pub context_name: Bytes,
    pub pdu: Pdu,
}

impl ScopedPdu {
    pub fn new(context_engine_id: Bytes, pdu: Pdu) -> Self {
        Self {
            context_engine_id,
            context_name: Bytes::new(),
            pdu,
        }
    }

    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.context_name);
            buf.push_octet_string(&self.context_engine_id);
        });
    }

    /// Encode standalone, as input to encryption.
    pub fn encode_to_bytes(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        self.encode(&mut buf);
        buf.finish()
    }

    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let context_engine_id = seq.read_octet_string()?;
        let context_name = seq.read_octet_string()?;
        let pdu = Pdu::decode(&mut seq)?;
        Ok(Self {
            context_engine_id,
            context_name,
            pdu,
        })
    }
}

/// msgData payload.
#[derive(Debug, Clone, PartialEq)]
pub enum V3MessageData {
    Plaintext(ScopedPdu),
    Encrypted(Bytes),
}

/// SNMPv3 message.
#[derive(Debug, Clone, PartialEq)]
pub struct V3Message {
    pub global_data: MsgGlobalData,
    /// Encoded USM parameters (the content of msgSecurityParameters).
    pub security_params: Bytes,
    pub data: V3MessageData,
}

impl V3Message {
    /// Engine discovery probe: noAuthNoPriv, reportable, empty engine ID and
    /// user, empty GET (RFC 3414 Section 4).
    pub fn discovery_request(msg_id: i32) -> Self {
        Self {
            global_data: MsgGlobalData::new(
                msg_id,
                MsgFlags::new(SecurityLevel::NoAuthNoPriv, true),
            ),
            security_params: UsmSecurityParams::empty().encode(),
            data: V3MessageData::Plaintext(ScopedPdu::new(
                Bytes::new(),
                Pdu::get_request(msg_id, &[]),
            )),
        }
    }

    /// Plaintext scoped PDU, if the message is not encrypted.
    pub fn scoped_pdu(&self) -> Option<&ScopedPdu> {
        match &self.data {
            V3MessageData::Plaintext(scoped) => Some(scoped),
            V3MessageData::Encrypted(_) => None,
        }
    }

    pub fn msg_id(&self) -> i32 {
        self.global_data.msg_id
    }

    pub fn security_level(&self) -> SecurityLevel {
        self.global_data.msg_flags.security_level
    }

    /// Encode to BER.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            match &self.data {
                V3MessageData::Plaintext(scoped) => scoped.encode(buf),
                V3MessageData::Encrypted(ciphertext) => buf.push_octet_string(ciphertext),
            }
            buf.push_octet_string(&self.security_params);
            self.global_data.encode(buf);
            buf.push_integer(3);
        });
        buf.finish()
    }

    /// Decode the remainder after the version field.
    pub(crate) fn decode_from_sequence(seq: &mut Decoder) -> Result<Self> {
        let global_data = MsgGlobalData::decode(seq)?;
        let security_params = seq.read_octet_string()?;

        let at = seq.offset();
        let data = match seq.peek_tag() {
            Some(tag::universal::SEQUENCE) => {
                if global_data.msg_flags.security_level.requires_priv() {
                    return Err(Error::decode(at, DecodeErrorKind::ExpectedEncryption));
                }
                V3MessageData::Plaintext(ScopedPdu::decode(seq)?)
            }
            Some(tag::universal::OCTET_STRING) => {
                if !global_data.msg_flags.security_level.requires_priv() {
                    return Err(Error::decode(at, DecodeErrorKind::UnexpectedEncryption));
                }
                V3MessageData::Encrypted(seq.read_octet_string()?)
            }
            Some(actual) => {
                return Err(Error::decode(
                    at,
                    DecodeErrorKind::UnexpectedTag {
                        expected: tag::universal::SEQUENCE,
                        actual,
                    },
                ));
            }
            None => return Err(Error::decode(at, DecodeErrorKind::TruncatedData)),
        };

        Ok(Self {
            global_data,
            security_params,
            data,
        })
    }
}
