//! SNMP Protocol Data Units.
//!
//! The engine only originates GET, GETNEXT, GETBULK and SET; it accepts
//! Response and Report PDUs back.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list};

/// PDU type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduType {
    GetRequest,
    GetNextRequest,
    Response,
    SetRequest,
    GetBulkRequest,
    Report,
}

impl PduType {
    /// Create from tag byte.
    pub fn from_tag(t: u8) -> Option<Self> {
        match t {
            tag::pdu::GET_REQUEST => Some(Self::GetRequest),
            tag::pdu::GET_NEXT_REQUEST => Some(Self::GetNextRequest),
            tag::pdu::RESPONSE => Some(Self::Response),
            tag::pdu::SET_REQUEST => Some(Self::SetRequest),
            tag::pdu::GET_BULK_REQUEST => Some(Self::GetBulkRequest),
            tag::pdu::REPORT => Some(Self::Report),
            _ => None,
        }
    }

    /// Get the tag byte.
    pub fn tag(self) -> u8 {
        match self {
            Self::GetRequest => tag::pdu::GET_REQUEST,
            Self::GetNextRequest => tag::pdu::GET_NEXT_REQUEST,
            Self::Response => tag::pdu::RESPONSE,
            Self::SetRequest => tag::pdu::SET_REQUEST,
            Self::GetBulkRequest => tag::pdu::GET_BULK_REQUEST,
            Self::Report => tag::pdu::REPORT,
        }
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetRequest => write!(f, "GetRequest"),
            Self::GetNextRequest => write!(f, "GetNextRequest"),
            Self::Response => write!(f, "Response"),
            Self::SetRequest => write!(f, "SetRequest"),
            Self::GetBulkRequest => write!(f, "GetBulkRequest"),
            Self::Report => write!(f, "Report"),
        }
    }
}

/// PDU for request/response operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    pub pdu_type: PduType,
    pub request_id: i32,
    /// Error status; non-repeaters for GETBULK.
    pub error_status: i32,
    /// 1-based index of the offending varbind; max-repetitions for GETBULK.
    pub error_index: i32,
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    fn request(pdu_type: PduType, request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            pdu_type,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds,
        }
    }

    /// GET request with NULL-valued varbinds.
    pub fn get_request(request_id: i32, oids: &[Oid]) -> Self {
        let varbinds = oids.iter().cloned().map(VarBind::null).collect();
        Self::request(PduType::GetRequest, request_id, varbinds)
    }

    /// GETNEXT request with NULL-valued varbinds.
    pub fn get_next_request(request_id: i32, oids: &[Oid]) -> Self {
        let varbinds = oids.iter().cloned().map(VarBind::null).collect();
        Self::request(PduType::GetNextRequest, request_id, varbinds)
    }

    /// SET request.
    pub fn set_request(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self::request(PduType::SetRequest, request_id, varbinds)
    }

    /// GETBULK request.
    pub fn get_bulk(
        request_id: i32,
        non_repeaters: i32,
        max_repetitions: i32,
        oids: &[Oid],
    ) -> Self {
        Self {
            pdu_type: PduType::GetBulkRequest,
            request_id,
            error_status: non_repeaters,
            error_index: max_repetitions,
            varbinds: oids.iter().cloned().map(VarBind::null).collect(),
        }
    }

    /// Response PDU (agent side; used by the mock agent and tests).
    pub fn response(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self::request(PduType::Response, request_id, varbinds)
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_integer(self.error_index);
            buf.push_integer(self.error_status);
            buf.push_integer(self.request_id);
        });
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let start = decoder.offset();
        let t = decoder.read_tag()?;
        let pdu_type = PduType::from_tag(t)
            .ok_or_else(|| Error::decode(start, DecodeErrorKind::UnknownPduType(t)))?;
        let len = decoder.read_length()?;
        let mut body = decoder.sub_decoder(len)?;

        let request_id = body.read_integer()?;
        let error_status = body.read_integer()?;
        let error_index = body.read_integer()?;
        let varbinds = decode_varbind_list(&mut body)?;

        Ok(Pdu {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }

    /// Check if this is an error response.
    pub fn is_error(&self) -> bool {
        self.error_status != 0
    }

    /// Error status as an enum.
    pub fn error_status_enum(&self) -> ErrorStatus {
        ErrorStatus::from_i32(self.error_status)
    }

    /// OID of the varbind `error_index` points at, if it is in range.
    pub fn error_oid(&self) -> Option<Oid> {
        let index = usize::try_from(self.error_index).ok()?.checked_sub(1)?;
        self.varbinds.get(index).map(|vb| vb.oid.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::value::Value;

    #[test]
    fn test_get_bulk_header_fields() {
        let pdu = Pdu::get_bulk(9, 0, 5, &[oid!(1, 3, 6, 1, 2, 1, 17)]);
        let mut buf = EncodeBuf::new();
        pdu.encode(&mut buf);
        let bytes = buf.finish();

        assert_eq!(bytes[0], 0xA5);
        let decoded = Pdu::decode(&mut Decoder::new(bytes)).unwrap();
        assert_eq!(decoded.error_status, 0);
        assert_eq!(decoded.error_index, 5);
        assert_eq!(decoded.varbinds[0].value, Value::Null);
    }

    #[test]
    fn test_error_oid() {
        let mut pdu = Pdu::response(
            1,
            vec![
                VarBind::new(oid!(1, 3, 6, 1, 1), Value::Integer(1)),
                VarBind::new(oid!(1, 3, 6, 1, 2), Value::Integer(2)),
            ],
        );
        pdu.error_status = ErrorStatus::WrongValue.as_i32();
        pdu.error_index = 2;
        assert!(pdu.is_error());
        assert_eq!(pdu.error_oid(), Some(oid!(1, 3, 6, 1, 2)));

        pdu.error_index = 0;
        assert_eq!(pdu.error_oid(), None);
        pdu.error_index = 3;
        assert_eq!(pdu.error_oid(), None);
    }

    #[test]
    fn test_unknown_pdu_tag() {
        // Trap-PDU (0xA4) is never expected by a manager session
        let mut d = Decoder::from_slice(&[0xA4, 0x00]);
        assert!(matches!(
            Pdu::decode(&mut d),
            Err(Error::Decode {
                offset: 0,
                kind: DecodeErrorKind::UnknownPduType(0xA4)
            })
        ));
    }
}
