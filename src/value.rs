//! SNMP value types.
//!
//! [`Value`] covers the SMIv2 base types plus the three exception markers an
//! agent may put in place of a value. Turning values into the strings the
//! caller layer stores is [`codec::decode_value`](crate::codec::decode_value).

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// SNMP value.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// INTEGER (signed 32-bit)
    Integer(i32),
    /// OCTET STRING (arbitrary bytes)
    OctetString(Bytes),
    /// NULL
    Null,
    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),
    /// IpAddress (4 bytes, network order)
    IpAddress([u8; 4]),
    /// Counter32
    Counter32(u32),
    /// Gauge32 / Unsigned32
    Gauge32(u32),
    /// TimeTicks (hundredths of a second)
    TimeTicks(u32),
    /// Opaque (legacy wrapped BER)
    Opaque(Bytes),
    /// Counter64 (SNMPv2c/v3 only)
    Counter64(u64),
    /// The agent has no such object.
    NoSuchObject,
    /// The object exists but this instance does not.
    NoSuchInstance,
    /// Nothing further in the agent's MIB view.
    EndOfMibView,
    /// Any other tag, kept verbatim.
    Unknown { tag: u8, data: Bytes },
}

impl Value {
    /// Check whether this is one of the exception markers.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Check for noSuchObject/noSuchInstance (the "missing" exceptions).
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::NoSuchObject | Value::NoSuchInstance)
    }

    /// Get as i32 if this is an Integer.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Get raw bytes of an OctetString or Opaque.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(v) | Value::Opaque(v) => Some(v),
            _ => None,
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            Value::Integer(v) => buf.push_integer(*v),
            Value::OctetString(data) => buf.push_octet_string(data),
            Value::Null => buf.push_null(),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid),
            Value::IpAddress(addr) => buf.push_ip_address(*addr),
            Value::Counter32(v) => buf.push_unsigned32(tag::application::COUNTER32, *v),
            Value::Gauge32(v) => buf.push_unsigned32(tag::application::GAUGE32, *v),
            Value::TimeTicks(v) => buf.push_unsigned32(tag::application::TIMETICKS, *v),
            Value::Opaque(data) => buf.push_tlv(tag::application::OPAQUE, data),
            Value::Counter64(v) => buf.push_integer64(*v),
            Value::NoSuchObject => buf.push_tlv(tag::context::NO_SUCH_OBJECT, &[]),
            Value::NoSuchInstance => buf.push_tlv(tag::context::NO_SUCH_INSTANCE, &[]),
            Value::EndOfMibView => buf.push_tlv(tag::context::END_OF_MIB_VIEW, &[]),
            Value::Unknown { tag: t, data } => buf.push_tlv(*t, data),
        }
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let start = decoder.offset();
        let t = decoder.read_tag()?;
        let len = decoder.read_length()?;

        match t {
            tag::universal::INTEGER => Ok(Value::Integer(decoder.read_integer_value(len)?)),
            tag::universal::OCTET_STRING => Ok(Value::OctetString(decoder.read_bytes(len)?)),
            tag::universal::NULL => {
                if len != 0 {
                    return Err(Error::decode(start, DecodeErrorKind::InvalidNull));
                }
                Ok(Value::Null)
            }
            tag::universal::OBJECT_IDENTIFIER => {
                Ok(Value::ObjectIdentifier(decoder.read_oid_value(len)?))
            }
            tag::application::IP_ADDRESS => {
                if len != 4 {
                    return Err(Error::decode(
                        start,
                        DecodeErrorKind::InvalidIpAddressLength { length: len },
                    ));
                }
                let b = decoder.read_bytes(4)?;
                Ok(Value::IpAddress([b[0], b[1], b[2], b[3]]))
            }
            tag::application::COUNTER32 => {
                Ok(Value::Counter32(decoder.read_unsigned32_value(len)?))
            }
            tag::application::GAUGE32 => Ok(Value::Gauge32(decoder.read_unsigned32_value(len)?)),
            tag::application::TIMETICKS => {
                Ok(Value::TimeTicks(decoder.read_unsigned32_value(len)?))
            }
            tag::application::OPAQUE => Ok(Value::Opaque(decoder.read_bytes(len)?)),
            tag::application::COUNTER64 => {
                Ok(Value::Counter64(decoder.read_integer64_value(len)?))
            }
            tag::context::NO_SUCH_OBJECT => {
                decoder.read_bytes(len)?;
                Ok(Value::NoSuchObject)
            }
            tag::context::NO_SUCH_INSTANCE => {
                decoder.read_bytes(len)?;
                Ok(Value::NoSuchInstance)
            }
            tag::context::END_OF_MIB_VIEW => {
                decoder.read_bytes(len)?;
                Ok(Value::EndOfMibView)
            }
            tag::universal::OCTET_STRING_CONSTRUCTED => Err(Error::decode(
                start,
                DecodeErrorKind::ConstructedOctetString,
            )),
            other => Ok(Value::Unknown {
                tag: other,
                data: decoder.read_bytes(len)?,
            }),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(data) => match std::str::from_utf8(data) {
                Ok(s) => write!(f, "{}", s),
                Err(_) => write!(f, "{}", crate::codec::hex_octets(data)),
            },
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::IpAddress(a) => write!(f, "{}.{}.{}.{}", a[0], a[1], a[2], a[3]),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => write!(f, "{}", v),
            Value::Opaque(data) => write!(f, "Opaque({})", crate::codec::hex_octets(data)),
            Value::Counter64(v) => write!(f, "{}", v),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
            Value::Unknown { tag, data } => {
                write!(f, "Unknown(0x{:02X}, {})", tag, crate::codec::hex_octets(data))
            }
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}

impl From<std::net::Ipv4Addr> for Value {
    fn from(addr: std::net::Ipv4Addr) -> Self {
        Value::IpAddress(addr.octets())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    fn decode(bytes: &[u8]) -> Result<Value> {
        Value::decode(&mut Decoder::from_slice(bytes))
    }

    #[test]
    fn test_decode_application_types() {
        assert_eq!(
            decode(&[0x40, 0x04, 192, 168, 127, 253]).unwrap(),
            Value::IpAddress([192, 168, 127, 253])
        );
        assert_eq!(decode(&[0x42, 0x01, 0x05]).unwrap(), Value::Gauge32(5));
        assert_eq!(decode(&[0x43, 0x02, 0x01, 0x00]).unwrap(), Value::TimeTicks(256));
    }

    #[test]
    fn test_decode_exceptions() {
        assert_eq!(decode(&[0x80, 0x00]).unwrap(), Value::NoSuchObject);
        assert_eq!(decode(&[0x81, 0x00]).unwrap(), Value::NoSuchInstance);
        assert_eq!(decode(&[0x82, 0x00]).unwrap(), Value::EndOfMibView);
        assert!(Value::NoSuchInstance.is_missing());
        assert!(!Value::EndOfMibView.is_missing());
        assert!(Value::EndOfMibView.is_exception());
    }

    #[test]
    fn test_reject_constructed_octet_string() {
        assert!(matches!(
            decode(&[0x24, 0x03, 0x04, 0x01, 0x41]),
            Err(Error::Decode {
                kind: DecodeErrorKind::ConstructedOctetString,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_ip_length() {
        assert!(decode(&[0x40, 0x03, 1, 2, 3]).is_err());
    }

    #[test]
    fn test_unknown_tag_preserved() {
        let value = decode(&[0x47, 0x02, 0xDE, 0xAD]).unwrap();
        assert_eq!(
            value,
            Value::Unknown {
                tag: 0x47,
                data: Bytes::from_static(&[0xDE, 0xAD])
            }
        );
        let mut buf = EncodeBuf::new();
        value.encode(&mut buf);
        assert_eq!(&buf.finish()[..], &[0x47, 0x02, 0xDE, 0xAD]);
    }

    #[test]
    fn test_encode_oid_value() {
        let mut buf = EncodeBuf::new();
        Value::from(oid!(1, 3, 6, 1)).encode(&mut buf);
        assert_eq!(&buf.finish()[..], &[0x06, 0x03, 0x2B, 0x06, 0x01]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::NoSuchObject.to_string(), "noSuchObject");
        assert_eq!(Value::IpAddress([10, 0, 0, 1]).to_string(), "10.0.0.1");
        assert_eq!(Value::from("eth0").to_string(), "eth0");
    }
}
