//! Mock transport for testing.
//!
//! A programmable stand-in for an agent: queue canned responses, timeouts and
//! I/O errors, then run a session against it and inspect what was sent.

use super::Transport;
use crate::ber::Decoder;
use crate::error::{Error, ErrorStatus, Result};
use crate::message::{
    CommunityMessage, Message, MsgFlags, MsgGlobalData, ScopedPdu, SecurityLevel, V3Message,
    V3MessageData,
};
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::v3::{LocalizedKey, PrivKey, UsmSecurityParams, auth};
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;
use bytes::Bytes;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Computes a response from the raw request datagram.
pub type Responder = Arc<dyn Fn(&Bytes) -> Bytes + Send + Sync>;

/// Canned behavior for one `recv` call.
#[derive(Clone)]
pub enum MockResponse {
    /// Response whose request id (and v3 msgID) is rewritten to match the request.
    Data(Bytes),
    /// Response returned verbatim.
    RawData(Bytes),
    /// Response computed from the request.
    Reply(Responder),
    Timeout,
    IoError(String),
}

impl std::fmt::Debug for MockResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Data(data) => f.debug_tuple("Data").field(data).finish(),
            Self::RawData(data) => f.debug_tuple("RawData").field(data).finish(),
            Self::Reply(_) => f.write_str("Reply(..)"),
            Self::Timeout => f.write_str("Timeout"),
            Self::IoError(msg) => f.debug_tuple("IoError").field(msg).finish(),
        }
    }
}

/// A request the session sent.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub data: Bytes,
    /// PDU request id (community) or msgID (v3), when decodable.
    pub request_id: Option<i32>,
}

impl RecordedRequest {
    pub fn message(&self) -> Result<Message> {
        Message::decode(self.data.clone())
    }

    /// The PDU, for community and plaintext v3 requests.
    pub fn pdu(&self) -> Option<Pdu> {
        match self.message().ok()? {
            Message::Community(m) => Some(m.pdu),
            Message::V3(m) => m.scoped_pdu().map(|s| s.pdu.clone()),
        }
    }
}

struct MockTransportInner {
    target: SocketAddr,
    responses: VecDeque<MockResponse>,
    requests: Vec<RecordedRequest>,
}

/// Programmable transport. Clones share state.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

impl MockTransport {
    pub fn new(target: SocketAddr) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockTransportInner {
                target,
                responses: VecDeque::new(),
                requests: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn queue(&self, response: MockResponse) {
        self.lock().responses.push_back(response);
    }

    pub fn queue_response(&self, data: impl Into<Bytes>) {
        self.queue(MockResponse::Data(data.into()));
    }

    pub fn queue_raw_response(&self, data: impl Into<Bytes>) {
        self.queue(MockResponse::RawData(data.into()));
    }

    pub fn queue_reply<F>(&self, reply: F)
    where
        F: Fn(&Bytes) -> Bytes + Send + Sync + 'static,
    {
        self.queue(MockResponse::Reply(Arc::new(reply)));
    }

    pub fn queue_timeout(&self) {
        self.queue(MockResponse::Timeout);
    }

    pub fn queue_io_error(&self, msg: impl Into<String>) {
        self.queue(MockResponse::IoError(msg.into()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn queued_response_count(&self) -> usize {
        self.lock().responses.len()
    }

    fn extract_request_id(data: &Bytes) -> Option<i32> {
        match Message::decode(data.clone()).ok()? {
            Message::Community(m) => Some(m.pdu.request_id),
            Message::V3(m) => Some(m.msg_id()),
        }
    }

    fn patch_response_request_id(data: Bytes, id: i32) -> Bytes {
        let Ok(msg) = Message::decode(data.clone()) else {
            return data;
        };
        match msg {
            Message::Community(mut m) => {
                m.pdu.request_id = id;
                m.encode()
            }
            Message::V3(mut m) => {
                // Encrypted or authenticated responses cannot be rewritten
                if m.security_level() != SecurityLevel::NoAuthNoPriv {
                    return data;
                }
                m.global_data.msg_id = id;
                if let V3MessageData::Plaintext(scoped) = &mut m.data {
                    scoped.pdu.request_id = id;
                }
                m.encode()
            }
        }
    }
}

impl Transport for MockTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        let data = Bytes::copy_from_slice(data);
        let request_id = Self::extract_request_id(&data);
        self.lock().requests.push(RecordedRequest { data, request_id });
        Ok(())
    }

    async fn recv(&self, request_id: i32, timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        let (response, target, last) = {
            let mut inner = self.lock();
            (
                inner.responses.pop_front(),
                inner.target,
                inner.requests.last().cloned(),
            )
        };

        match response {
            Some(MockResponse::Data(data)) => {
                let patched = match last.as_ref().and_then(|r| r.request_id) {
                    Some(id) => Self::patch_response_request_id(data, id),
                    None => data,
                };
                Ok((patched, target))
            }
            Some(MockResponse::RawData(data)) => Ok((data, target)),
            Some(MockResponse::Reply(reply)) => {
                let request = last.map(|r| r.data).unwrap_or_default();
                Ok((reply(&request), target))
            }
            Some(MockResponse::IoError(msg)) => Err(Error::Io {
                target: Some(target),
                source: std::io::Error::other(msg),
            }),
            Some(MockResponse::Timeout) | None => Err(Error::Timeout {
                target: Some(target),
                elapsed: timeout,
                request_id,
                retries: 0,
            }),
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.lock().target
    }

    fn local_addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }
}

/// Builds agent responses for the mock transport.
pub struct ResponseBuilder {
    request_id: i32,
    varbinds: Vec<VarBind>,
    error_status: i32,
    error_index: i32,
}

impl ResponseBuilder {
    pub fn new(request_id: i32) -> Self {
        Self {
            request_id,
            varbinds: Vec::new(),
            error_status: 0,
            error_index: 0,
        }
    }

    pub fn varbind(mut self, oid: Oid, value: Value) -> Self {
        self.varbinds.push(VarBind::new(oid, value));
        self
    }

    pub fn error_status(mut self, status: ErrorStatus) -> Self {
        self.error_status = status.as_i32();
        self
    }

    pub fn error_index(mut self, index: i32) -> Self {
        self.error_index = index;
        self
    }

    pub fn pdu(self) -> Pdu {
        Pdu {
            pdu_type: PduType::Response,
            request_id: self.request_id,
            error_status: self.error_status,
            error_index: self.error_index,
            varbinds: self.varbinds,
        }
    }

    pub fn build_v2c(self, community: &[u8]) -> Bytes {
        CommunityMessage::new(Version::V2c, community, self.pdu()).encode()
    }

    pub fn build_v1(self, community: &[u8]) -> Bytes {
        CommunityMessage::new(Version::V1, community, self.pdu()).encode()
    }

    /// Unauthenticated v3 Report as sent in answer to engine discovery.
    pub fn build_v3_discovery_report(engine_id: &[u8], boots: u32, time: u32) -> Bytes {
        let engine_id = Bytes::copy_from_slice(engine_id);
        let usm = UsmSecurityParams::new(engine_id.clone(), boots, time, Bytes::new());
        let report = usm_report(0, usm_stats_oid(4));
        plain_v3(0, usm, engine_id, report)
    }
}

fn usm_stats_oid(counter: u32) -> Oid {
    Oid::from_slice(&[1, 3, 6, 1, 6, 3, 15, 1, 1, counter, 0])
}

fn usm_report(request_id: i32, oid: Oid) -> Pdu {
    Pdu {
        pdu_type: PduType::Report,
        request_id,
        error_status: 0,
        error_index: 0,
        varbinds: vec![VarBind::new(oid, Value::Counter32(1))],
    }
}

fn plain_v3(msg_id: i32, usm: UsmSecurityParams, context_engine_id: Bytes, pdu: Pdu) -> Bytes {
    V3Message {
        global_data: MsgGlobalData::new(msg_id, MsgFlags::new(SecurityLevel::NoAuthNoPriv, false)),
        security_params: usm.encode(),
        data: V3MessageData::Plaintext(ScopedPdu::new(context_engine_id, pdu)),
    }
    .encode()
}

/// Simulated USM agent: answers v3 requests with correctly authenticated
/// and encrypted responses.
#[derive(Debug, Clone)]
pub struct MockUsmAgent {
    pub engine_id: Bytes,
    pub boots: u32,
    pub time: u32,
    pub username: Bytes,
    pub auth_key: Option<LocalizedKey>,
    pub priv_key: Option<PrivKey>,
}

impl MockUsmAgent {
    pub fn new(engine_id: &[u8], boots: u32, time: u32, username: &str) -> Self {
        Self {
            engine_id: Bytes::copy_from_slice(engine_id),
            boots,
            time,
            username: Bytes::copy_from_slice(username.as_bytes()),
            auth_key: None,
            priv_key: None,
        }
    }

    pub fn with_keys(mut self, auth_key: LocalizedKey, priv_key: Option<PrivKey>) -> Self {
        self.auth_key = Some(auth_key);
        self.priv_key = priv_key;
        self
    }

    fn request_ids(request: &Bytes) -> Result<(i32, i32)> {
        match Message::decode(request.clone())? {
            Message::V3(m) => {
                let request_id = m.scoped_pdu().map(|s| s.pdu.request_id).unwrap_or(0);
                Ok((m.msg_id(), request_id))
            }
            Message::Community(m) => Ok((m.pdu.request_id, m.pdu.request_id)),
        }
    }

    /// Report carrying engine ID, boots and time for a discovery probe.
    pub fn discovery_report(&self, request: &Bytes) -> Result<Bytes> {
        self.report(request, 4)
    }

    /// Unauthenticated Report for `usmStats.<counter>.0`.
    pub fn report(&self, request: &Bytes, counter: u32) -> Result<Bytes> {
        let (msg_id, request_id) = Self::request_ids(request)?;
        let usm =
            UsmSecurityParams::new(self.engine_id.clone(), self.boots, self.time, Bytes::new());
        Ok(plain_v3(
            msg_id,
            usm,
            self.engine_id.clone(),
            usm_report(request_id, usm_stats_oid(counter)),
        ))
    }

    /// Answer `request` with `response`, at the security level the keys allow.
    pub fn respond(&self, request: &Bytes, mut response: Pdu) -> Result<Bytes> {
        let msg = match Message::decode(request.clone())? {
            Message::V3(msg) => msg,
            other => {
                return Err(Error::VersionMismatch {
                    expected: Version::V3,
                    actual: other.version(),
                });
            }
        };
        let usm = UsmSecurityParams::decode(msg.security_params.clone())?;

        let scoped = match &msg.data {
            V3MessageData::Plaintext(scoped) => scoped.clone(),
            V3MessageData::Encrypted(ciphertext) => {
                let key = self.priv_key.as_ref().ok_or(Error::decrypt(
                    None,
                    crate::error::CryptoErrorKind::NoPrivKey,
                ))?;
                let plaintext =
                    key.decrypt(ciphertext, usm.engine_boots, usm.engine_time, &usm.priv_params)?;
                ScopedPdu::decode(&mut Decoder::new(plaintext))?
            }
        };
        response.request_id = scoped.pdu.request_id;

        let mut params = UsmSecurityParams::new(
            self.engine_id.clone(),
            self.boots,
            self.time,
            self.username.clone(),
        );
        let level = match (&self.auth_key, &self.priv_key) {
            (None, _) => SecurityLevel::NoAuthNoPriv,
            (Some(_), None) => SecurityLevel::AuthNoPriv,
            (Some(_), Some(_)) => SecurityLevel::AuthPriv,
        };
        if let Some(key) = &self.auth_key {
            params = params.with_auth_placeholder(key.mac_len());
        }

        let out_scoped = ScopedPdu::new(self.engine_id.clone(), response);
        let data = match &self.priv_key {
            Some(key) => {
                let (ciphertext, salt) =
                    key.encrypt(&out_scoped.encode_to_bytes(), self.boots, self.time, 0x5A5A)?;
                params = params.with_priv_params(salt);
                V3MessageData::Encrypted(ciphertext)
            }
            None => V3MessageData::Plaintext(out_scoped),
        };

        let encoded = V3Message {
            global_data: MsgGlobalData::new(msg.msg_id(), MsgFlags::new(level, false)),
            security_params: params.encode(),
            data,
        }
        .encode();

        let Some(key) = &self.auth_key else {
            return Ok(encoded);
        };
        let (offset, _) = UsmSecurityParams::find_auth_params(&encoded)
            .ok_or(Error::auth(None, crate::error::AuthErrorKind::AuthParamsNotFound))?;
        let mut signed = encoded.to_vec();
        auth::authenticate_message(key, &mut signed, offset)?;
        Ok(Bytes::from(signed))
    }
}
