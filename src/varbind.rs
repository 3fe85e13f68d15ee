//! Variable binding (VarBind): an OID paired with a value.

use crate::ber::{Decoder, EncodeBuf};
use crate::error::Result;
use crate::oid::Oid;
use crate::value::Value;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// VarBind with a NULL value, as sent in GET/GETNEXT/GETBULK requests.
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            self.value.encode(buf);
            buf.push_oid(&self.oid);
        });
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let oid = seq.read_oid()?;
        let value = Value::decode(&mut seq)?;
        Ok(VarBind { oid, value })
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Encode a VarBindList.
pub fn encode_varbind_list(buf: &mut EncodeBuf, varbinds: &[VarBind]) {
    buf.push_sequence(|buf| {
        for vb in varbinds.iter().rev() {
            vb.encode(buf);
        }
    });
}

/// Decode a VarBindList.
pub fn decode_varbind_list(decoder: &mut Decoder) -> Result<Vec<VarBind>> {
    let mut seq = decoder.read_sequence()?;
    let mut varbinds = Vec::new();
    while !seq.is_empty() {
        varbinds.push(VarBind::decode(&mut seq)?);
    }
    Ok(varbinds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn test_list_keeps_order() {
        let varbinds = vec![
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 1), Value::Integer(1)),
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 2), Value::Integer(2)),
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, 3), Value::EndOfMibView),
        ];

        let mut buf = EncodeBuf::new();
        encode_varbind_list(&mut buf, &varbinds);
        let decoded = decode_varbind_list(&mut Decoder::new(buf.finish())).unwrap();

        assert_eq!(decoded, varbinds);
    }

    #[test]
    fn test_null_varbind_wire_form() {
        let mut buf = EncodeBuf::new();
        VarBind::null(oid!(1, 3, 6, 1)).encode(&mut buf);
        assert_eq!(
            &buf.finish()[..],
            &[0x30, 0x07, 0x06, 0x03, 0x2B, 0x06, 0x01, 0x05, 0x00]
        );
    }

    #[test]
    fn test_empty_list() {
        let mut buf = EncodeBuf::new();
        encode_varbind_list(&mut buf, &[]);
        let bytes = buf.finish();
        assert_eq!(&bytes[..], &[0x30, 0x00]);
        assert!(decode_varbind_list(&mut Decoder::new(bytes)).unwrap().is_empty());
    }

    #[test]
    fn test_display() {
        let vb = VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("tsn-sw1"));
        assert_eq!(vb.to_string(), "1.3.6.1.2.1.1.5.0 = tsn-sw1");
    }
}
