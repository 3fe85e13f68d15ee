//! USM security parameters (RFC 3414 Section 2.4).
//!
//! ```text
//! UsmSecurityParameters ::= SEQUENCE {
//!     msgAuthoritativeEngineID     OCTET STRING,
//!     msgAuthoritativeEngineBoots  INTEGER (0..2147483647),
//!     msgAuthoritativeEngineTime   INTEGER (0..2147483647),
//!     msgUserName                  OCTET STRING (SIZE(0..32)),
//!     msgAuthenticationParameters  OCTET STRING,
//!     msgPrivacyParameters         OCTET STRING
//! }
//! ```

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct UsmSecurityParams {
    pub engine_id: Bytes,
    pub engine_boots: u32,
    pub engine_time: u32,
    pub username: Bytes,
    pub auth_params: Bytes,
    pub priv_params: Bytes,
}

impl UsmSecurityParams {
    pub fn new(
        engine_id: impl Into<Bytes>,
        engine_boots: u32,
        engine_time: u32,
        username: impl Into<Bytes>,
    ) -> Self {
        Self {
            engine_id: engine_id.into(),
            engine_boots,
            engine_time,
            username: username.into(),
            auth_params: Bytes::new(),
            priv_params: Bytes::new(),
        }
    }

    /// All-empty parameters, as sent in the discovery probe.
    pub fn empty() -> Self {
        Self::new(Bytes::new(), 0, 0, Bytes::new())
    }

    /// Zeroed msgAuthenticationParameters of `mac_len` bytes, patched after encoding.
    pub fn with_auth_placeholder(mut self, mac_len: usize) -> Self {
        self.auth_params = Bytes::from(vec![0u8; mac_len]);
        self
    }

    pub fn with_priv_params(mut self, priv_params: Bytes) -> Self {
        self.priv_params = priv_params;
        self
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            buf.push_octet_string(&self.priv_params);
            buf.push_octet_string(&self.auth_params);
            buf.push_octet_string(&self.username);
            buf.push_unsigned32(tag::universal::INTEGER, self.engine_time);
            buf.push_unsigned32(tag::universal::INTEGER, self.engine_boots);
            buf.push_octet_string(&self.engine_id);
        });
        buf.finish()
    }

    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;

        let engine_id = seq.read_octet_string()?;
        let engine_boots = read_non_negative(&mut seq)?;
        let engine_time = read_non_negative(&mut seq)?;
        let username = seq.read_octet_string()?;
        let auth_params = seq.read_octet_string()?;
        let priv_params = seq.read_octet_string()?;

        Ok(Self {
            engine_id,
            engine_boots,
            engine_time,
            username,
            auth_params,
            priv_params,
        })
    }

    /// Locate msgAuthenticationParameters inside a whole encoded v3 message.
    ///
    /// Returns the absolute `(offset, length)` of the parameter's content.
    pub fn find_auth_params(message: &Bytes) -> Option<(usize, usize)> {
        let mut outer = Decoder::new(message.clone());
        let mut msg = outer.read_sequence().ok()?;
        msg.skip_tlv().ok()?; // msgVersion
        msg.skip_tlv().ok()?; // msgGlobalData

        let len = msg.expect_tag(tag::universal::OCTET_STRING).ok()?;
        let mut params = msg.sub_decoder(len).ok()?;
        let mut usm = params.read_sequence().ok()?;
        for _ in 0..4 {
            usm.skip_tlv().ok()?;
        }

        let auth_len = usm.expect_tag(tag::universal::OCTET_STRING).ok()?;
        Some((usm.offset(), auth_len))
    }
}

fn read_non_negative(seq: &mut Decoder) -> Result<u32> {
    let at = seq.offset();
    let value = seq.read_integer()?;
    u32::try_from(value).map_err(|_| Error::decode(at, DecodeErrorKind::IntegerOverflow))
}
