//! Ordered SET transactions.
//!
//! A transaction is a list of [`SetEntry`] triples applied one SET request
//! at a time, in order. The first entry that fails to bind or that the agent
//! rejects stops the transaction; entries before it stay applied. Switches
//! need this ordering: a VLAN row must be created before its port members
//! are written, for example.

use std::net::Ipv4Addr;

use bytes::Bytes;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::pdu::Pdu;
use crate::session::Session;
use crate::transport::Transport;
use crate::value::Value;
use crate::varbind::VarBind;

/// One SET: OID, value as text, and a net-snmp type character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetEntry {
    pub oid: String,
    pub value: String,
    pub type_char: char,
}

impl SetEntry {
    pub fn new(oid: impl Into<String>, value: impl Into<String>, type_char: char) -> Self {
        Self {
            oid: oid.into(),
            value: value.into(),
            type_char,
        }
    }

    /// Bind the textual value to its declared type.
    pub fn to_varbind(&self) -> Result<VarBind> {
        let oid = Oid::parse(&self.oid)?;
        let set_type = SetType::try_from(self.type_char)?;
        Ok(VarBind::new(oid, set_type.parse_value(&self.value)?))
    }
}

/// SET value types, keyed by the type characters `snmpset` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetType {
    /// `i`
    Integer,
    /// `u`, sent as Gauge32.
    Unsigned,
    /// `c`
    Counter,
    /// `t`
    TimeTicks,
    /// `a`
    IpAddress,
    /// `o`
    Oid,
    /// `s`
    String,
    /// `x`: hex octets, optional `0x`, whitespace ignored.
    HexString,
    /// `d`: decimal octets separated by spaces or dots.
    DecimalString,
    /// `n`
    Null,
    /// `b`: bit numbers separated by spaces or commas; bit 0 is the MSB of
    /// the first octet.
    Bits,
}

impl TryFrom<char> for SetType {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        Ok(match c {
            'i' => SetType::Integer,
            'u' => SetType::Unsigned,
            'c' => SetType::Counter,
            't' => SetType::TimeTicks,
            'a' => SetType::IpAddress,
            'o' => SetType::Oid,
            's' => SetType::String,
            'x' => SetType::HexString,
            'd' => SetType::DecimalString,
            'n' => SetType::Null,
            'b' => SetType::Bits,
            _ => return Err(Error::invalid_set_value(c, "", "unknown type character")),
        })
    }
}

impl SetType {
    pub fn as_char(self) -> char {
        match self {
            SetType::Integer => 'i',
            SetType::Unsigned => 'u',
            SetType::Counter => 'c',
            SetType::TimeTicks => 't',
            SetType::IpAddress => 'a',
            SetType::Oid => 'o',
            SetType::String => 's',
            SetType::HexString => 'x',
            SetType::DecimalString => 'd',
            SetType::Null => 'n',
            SetType::Bits => 'b',
        }
    }

    /// Parse `text` as a value of this type.
    pub fn parse_value(self, text: &str) -> Result<Value> {
        let invalid = |reason| Error::invalid_set_value(self.as_char(), text, reason);
        let trimmed = text.trim();

        Ok(match self {
            SetType::Integer => {
                Value::Integer(trimmed.parse().map_err(|_| invalid("not a 32-bit integer"))?)
            }
            SetType::Unsigned => {
                Value::Gauge32(trimmed.parse().map_err(|_| invalid("not an unsigned integer"))?)
            }
            SetType::Counter => {
                Value::Counter32(trimmed.parse().map_err(|_| invalid("not an unsigned integer"))?)
            }
            SetType::TimeTicks => {
                Value::TimeTicks(trimmed.parse().map_err(|_| invalid("not an unsigned integer"))?)
            }
            SetType::IpAddress => {
                let addr: Ipv4Addr = trimmed.parse().map_err(|_| invalid("not an IPv4 address"))?;
                Value::IpAddress(addr.octets())
            }
            SetType::Oid => Value::ObjectIdentifier(
                Oid::parse(trimmed).map_err(|_| invalid("not a numeric OID"))?,
            ),
            SetType::String => Value::OctetString(Bytes::copy_from_slice(text.as_bytes())),
            SetType::HexString => Value::OctetString(parse_hex(trimmed).ok_or_else(|| {
                invalid("not a hex string")
            })?),
            SetType::DecimalString => {
                let octets = trimmed
                    .split(|c: char| c == '.' || c.is_whitespace())
                    .filter(|part| !part.is_empty())
                    .map(|part| part.parse::<u8>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|_| invalid("octets must be 0-255"))?;
                Value::OctetString(Bytes::from(octets))
            }
            SetType::Null => Value::Null,
            SetType::Bits => Value::OctetString(
                parse_bits(trimmed).ok_or_else(|| invalid("not a list of bit numbers"))?,
            ),
        })
    }
}

fn parse_hex(text: &str) -> Option<Bytes> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let digits: Vec<u8> = digits.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 || !digits.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }

    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect::<Option<Vec<u8>>>()
        .map(Bytes::from)
}

fn parse_bits(text: &str) -> Option<Bytes> {
    let bits = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u16>().ok())
        .collect::<Option<Vec<u16>>>()?;

    let len = bits.iter().max().map_or(0, |&max| usize::from(max) / 8 + 1);
    let mut octets = vec![0u8; len];
    for bit in bits {
        octets[usize::from(bit) / 8] |= 0x80 >> (bit % 8);
    }
    Some(Bytes::from(octets))
}

impl<T: Transport> Session<T> {
    /// Apply `entries` in order, one SET request each.
    ///
    /// Stops at the first failure and returns [`Error::SetFailed`] with the
    /// failing entry and the entries already applied. Nothing is rolled back.
    #[instrument(
        level = "debug",
        skip_all,
        fields(snmp.target = %self.target(), entries = entries.len())
    )]
    pub async fn set_many(&mut self, entries: &[SetEntry]) -> Result<()> {
        let target = self.target();
        let mut applied = Vec::with_capacity(entries.len());

        for entry in entries {
            if let Err(source) = self.set_one(entry).await {
                tracing::warn!(
                    target: "snmp_southbound::set",
                    {
                        snmp.target = %target,
                        snmp.oid = %entry.oid,
                        applied = applied.len(),
                        error = %source,
                    },
                    "set transaction stopped"
                );
                return Err(Error::SetFailed {
                    target,
                    failed: Box::new(entry.clone()),
                    applied,
                    source: Box::new(source),
                });
            }

            tracing::debug!(
                target: "snmp_southbound::set",
                {
                    snmp.target = %target,
                    snmp.oid = %entry.oid,
                    value = %entry.value,
                    type_char = %entry.type_char,
                },
                "applied"
            );
            applied.push(entry.clone());
        }
        Ok(())
    }

    async fn set_one(&mut self, entry: &SetEntry) -> Result<()> {
        let varbind = entry.to_varbind()?;
        let id = self.next_request_id();
        self.request(Pdu::set_request(id, vec![varbind])).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ErrorStatus};
    use crate::oid;
    use crate::transport::{MockTransport, ResponseBuilder};
    use crate::version::Version;
    use std::time::Duration;

    fn bind(value: &str, type_char: char) -> Result<Value> {
        SetEntry::new("1.3.6.1.2.1.1.5.0", value, type_char)
            .to_varbind()
            .map(|vb| vb.value)
    }

    #[test]
    fn test_bind_numeric_types() {
        assert_eq!(bind("4", 'i').unwrap(), Value::Integer(4));
        assert_eq!(bind("-1", 'i').unwrap(), Value::Integer(-1));
        assert_eq!(bind("100", 'u').unwrap(), Value::Gauge32(100));
        assert_eq!(bind("7", 'c').unwrap(), Value::Counter32(7));
        assert_eq!(bind("360000", 't').unwrap(), Value::TimeTicks(360000));
        assert!(bind("abc", 'i').is_err());
        assert!(bind("-1", 'u').is_err());
    }

    #[test]
    fn test_bind_addresses_and_oids() {
        assert_eq!(bind("192.168.127.1", 'a').unwrap(), Value::IpAddress([192, 168, 127, 1]));
        assert_eq!(
            bind("1.3.6.1.4.1.8691", 'o').unwrap(),
            Value::ObjectIdentifier(oid!(1, 3, 6, 1, 4, 1, 8691))
        );
        assert!(bind("300.1.1.1", 'a').is_err());
    }

    #[test]
    fn test_bind_octet_strings() {
        assert_eq!(bind("VLAN 10", 's').unwrap(), Value::from("VLAN 10"));
        assert_eq!(
            bind("0xC0 80", 'x').unwrap(),
            Value::OctetString(Bytes::from_static(&[0xC0, 0x80]))
        );
        assert_eq!(
            bind("16.0.0.6.232.144", 'd').unwrap(),
            Value::OctetString(Bytes::from_static(&[16, 0, 0, 6, 232, 144]))
        );
        assert!(bind("0xABC", 'x').is_err());
        assert!(bind("1 256", 'd').is_err());
    }

    #[test]
    fn test_bind_bits_msb_first() {
        assert_eq!(
            bind("0,9", 'b').unwrap(),
            Value::OctetString(Bytes::from_static(&[0x80, 0x40]))
        );
        assert_eq!(bind("", 'b').unwrap(), Value::OctetString(Bytes::new()));
    }

    #[test]
    fn test_unknown_type_char() {
        let err = bind("1", 'z').unwrap_err();
        assert!(matches!(err, Error::InvalidSetValue { type_char: 'z', .. }));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[tokio::test]
    async fn test_set_stops_at_first_failure() {
        let mock = MockTransport::new("192.0.2.40:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 3, 1, 5, 10), Value::Integer(4))
                .build_v2c(b"private"),
        );
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 3, 1, 1, 10), Value::from("v10"))
                .error_status(ErrorStatus::NotWritable)
                .error_index(1)
                .build_v2c(b"private"),
        );

        let mut session = Session::new(
            mock.clone(),
            Version::V2c,
            Bytes::from_static(b"private"),
            Duration::from_millis(100),
            0,
        );
        let entries = [
            SetEntry::new("1.3.6.1.2.1.17.7.1.4.3.1.5.10", "4", 'i'),
            SetEntry::new("1.3.6.1.2.1.17.7.1.4.3.1.1.10", "v10", 's'),
            SetEntry::new("1.3.6.1.2.1.17.7.1.4.3.1.2.10", "0x03", 'x'),
        ];

        let err = session.set_many(&entries).await.unwrap_err();
        let (failed, applied) = err.set_failure().unwrap();
        assert_eq!(failed, &entries[1]);
        assert_eq!(applied, &entries[..1]);
        assert_eq!(err.kind(), ErrorKind::Agent);
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_bind_failure_sends_nothing_further() {
        let mock = MockTransport::new("192.0.2.40:161".parse().unwrap());
        let mut session = Session::new(
            mock.clone(),
            Version::V2c,
            Bytes::from_static(b"private"),
            Duration::from_millis(100),
            0,
        );
        let entries = [SetEntry::new("1.3.6.1.2.1.1.5.0", "not-a-number", 'i')];

        let err = session.set_many(&entries).await.unwrap_err();
        assert!(matches!(err.root(), Error::InvalidSetValue { .. }));
        assert!(mock.requests().is_empty());
    }
}
