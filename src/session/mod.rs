//! SNMP sessions.
//!
//! A [`Session`] is one device conversation: a transport bound to the agent,
//! the credentials selected for the call and, for SNMPv3, the discovered
//! engine and localized keys. Sessions are opened by [`SessionBuilder`],
//! owned by exactly one operation and closed when dropped.
//!
//! Every request goes through one retry loop. A timeout resends the same
//! request up to `retries` times; a datagram answering an earlier request is
//! discarded without consuming an attempt.

mod builder;

pub use builder::{DEFAULT_RETRIES, SessionBuilder};

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;
use tracing::{Span, instrument};

use crate::ber::Decoder;
use crate::error::{AuthErrorKind, CryptoErrorKind, EncodeErrorKind, Error, Result};
use crate::message::{
    CommunityMessage, Message, MsgFlags, MsgGlobalData, ScopedPdu, SecurityLevel, V3Message,
    V3MessageData,
};
use crate::pdu::Pdu;
use crate::transport::{Transport, UdpTransport};
use crate::v3::{
    EngineState, SaltCounter, UsmReport, UsmSecurityParams, UsmUser, auth,
    parse_discovery_response,
};
use crate::version::Version;

/// Largest request the engine will put on the wire.
const MAX_MESSAGE_SIZE: usize = crate::message::DEFAULT_MSG_MAX_SIZE as usize;

static NEXT_REQUEST_ID: AtomicI32 = AtomicI32::new(1);

/// Process-wide request ids, positive and never zero.
fn next_request_id() -> i32 {
    loop {
        let id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed) & 0x7FFF_FFFF;
        if id != 0 {
            return id;
        }
    }
}

/// What the retry loop does with a received datagram.
enum Step<R> {
    Done(R),
    /// Not an answer to the outstanding request; keep waiting.
    Ignore,
    /// Resend now, remembering why in case attempts run out.
    Resend(Error),
}

/// USM state of an SNMPv3 session.
struct V3State {
    username: Bytes,
    level: SecurityLevel,
    engine: EngineState,
    user: Arc<UsmUser>,
    salt: SaltCounter,
}

/// A live session with one agent.
pub struct Session<T: Transport = UdpTransport> {
    transport: T,
    target: SocketAddr,
    version: Version,
    community: Bytes,
    v3: Option<V3State>,
    timeout: Duration,
    retries: u32,
}

impl<T: Transport> Session<T> {
    pub(crate) fn new(
        transport: T,
        version: Version,
        community: Bytes,
        timeout: Duration,
        retries: u32,
    ) -> Self {
        let target = transport.peer_addr();
        Self {
            transport,
            target,
            version,
            community,
            v3: None,
            timeout,
            retries,
        }
    }

    /// Agent address.
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Community selected for this session's intent. Empty for SNMPv3.
    pub fn community(&self) -> &[u8] {
        &self.community
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// USM security level, for SNMPv3 sessions.
    pub fn security_level(&self) -> Option<SecurityLevel> {
        self.v3.as_ref().map(|v3| v3.level)
    }

    /// Authoritative engine ID discovered when the session opened.
    pub fn engine_id(&self) -> Option<&Bytes> {
        self.v3.as_ref().map(|v3| &v3.engine.engine_id)
    }

    pub(crate) fn next_request_id(&self) -> i32 {
        next_request_id()
    }

    /// Send `pdu` and return the agent's response.
    ///
    /// A non-zero error status in the response becomes [`Error::Snmp`].
    #[instrument(
        level = "debug",
        skip_all,
        fields(
            snmp.target = %self.target,
            snmp.request_id = pdu.request_id,
            snmp.pdu_type = %pdu.pdu_type,
            snmp.attempt = tracing::field::Empty,
        )
    )]
    pub(crate) async fn request(&mut self, pdu: Pdu) -> Result<Pdu> {
        let target = self.target;
        let response = if self.v3.is_some() {
            self.request_v3(pdu).await
        } else {
            self.request_community(pdu).await
        }
        .map_err(|e| e.with_target(target))?;

        tracing::trace!(
            target: "snmp_southbound::session",
            {
                snmp.varbind_count = response.varbinds.len(),
                snmp.error_status = response.error_status,
            },
            "received {} response",
            response.pdu_type
        );

        if response.is_error() {
            return Err(Error::Snmp {
                target: Some(target),
                status: response.error_status_enum(),
                index: u32::try_from(response.error_index).unwrap_or(0),
                oid: response.error_oid(),
            });
        }
        Ok(response)
    }

    /// Retry loop shared by every exchange.
    ///
    /// `encode` runs once per attempt so SNMPv3 requests carry a current
    /// engine time and a fresh salt.
    async fn exchange<R>(
        &mut self,
        request_id: i32,
        mut encode: impl FnMut(&Self) -> Result<Bytes> + Send,
        mut accept: impl FnMut(&mut Self, Bytes) -> Result<Step<R>> + Send,
    ) -> Result<R> {
        let start = Instant::now();
        let mut last_error = None;

        for attempt in 0..=self.retries {
            Span::current().record("snmp.attempt", attempt);
            if attempt > 0 {
                tracing::debug!(
                    target: "snmp_southbound::session",
                    {
                        snmp.target = %self.target,
                        snmp.request_id = request_id,
                        snmp.attempt = attempt,
                    },
                    "retrying request"
                );
            }

            let data = encode(self)?;
            if data.len() > MAX_MESSAGE_SIZE {
                return Err(Error::MessageTooLarge {
                    size: data.len(),
                    max: MAX_MESSAGE_SIZE,
                });
            }
            self.transport.send(&data).await?;

            let deadline = Instant::now() + self.timeout;
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                let received = if remaining.is_zero() {
                    Err(self.timeout_error(request_id, remaining))
                } else {
                    self.transport
                        .recv(request_id, remaining)
                        .await
                        .map(|(data, _)| data)
                };

                match received.and_then(|data| accept(self, data)) {
                    Ok(Step::Done(result)) => return Ok(result),
                    Ok(Step::Ignore) => continue,
                    Ok(Step::Resend(reason)) => {
                        last_error = Some(reason);
                        break;
                    }
                    Err(e @ Error::Timeout { .. }) => {
                        tracing::debug!(
                            target: "snmp_southbound::session",
                            {
                                snmp.target = %self.target,
                                snmp.request_id = request_id,
                                snmp.attempt = attempt,
                            },
                            "request timed out"
                        );
                        last_error = Some(e);
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Err(match last_error {
            Some(Error::Timeout { .. }) | None => Error::Timeout {
                target: Some(self.target),
                elapsed: start.elapsed(),
                request_id,
                retries: self.retries,
            },
            Some(reason) => reason,
        })
    }

    fn timeout_error(&self, request_id: i32, elapsed: Duration) -> Error {
        Error::Timeout {
            target: Some(self.target),
            elapsed,
            request_id,
            retries: 0,
        }
    }

    async fn request_community(&mut self, pdu: Pdu) -> Result<Pdu> {
        let request_id = pdu.request_id;
        let data = CommunityMessage::new(self.version, &self.community, pdu).encode();

        self.exchange(
            request_id,
            move |_| Ok(data.clone()),
            move |session, response| session.accept_community(response, request_id),
        )
        .await
    }

    fn accept_community(&self, data: Bytes, request_id: i32) -> Result<Step<Pdu>> {
        let message = match Message::decode(data)? {
            Message::Community(message) if message.version == self.version => message,
            other => {
                return Err(Error::VersionMismatch {
                    expected: self.version,
                    actual: other.version(),
                });
            }
        };

        if message.pdu.request_id != request_id {
            tracing::debug!(
                target: "snmp_southbound::session",
                {
                    snmp.target = %self.target,
                    snmp.request_id = request_id,
                    stale_request_id = message.pdu.request_id,
                },
                "discarding response to an earlier request"
            );
            return Ok(Step::Ignore);
        }
        Ok(Step::Done(message.pdu))
    }

    /// Discover the agent's authoritative engine with an empty, unauthenticated probe.
    pub(crate) async fn discover_engine(&mut self) -> Result<EngineState> {
        let msg_id = next_request_id();
        let probe = V3Message::discovery_request(msg_id).encode();

        let engine = self
            .exchange(
                msg_id,
                move |_| Ok(probe.clone()),
                move |_, response| match Message::decode(response)? {
                    Message::V3(message) if message.msg_id() == msg_id => {
                        parse_discovery_response(&message.security_params).map(Step::Done)
                    }
                    Message::V3(_) => Ok(Step::Ignore),
                    other => Err(Error::VersionMismatch {
                        expected: Version::V3,
                        actual: other.version(),
                    }),
                },
            )
            .await
            .map_err(|e| e.with_target(self.target))?;

        tracing::debug!(
            target: "snmp_southbound::usm",
            {
                snmp.target = %self.target,
                snmp.engine_id = %crate::codec::hex_octets(&engine.engine_id),
                snmp.engine_boots = engine.engine_boots,
                snmp.engine_time = engine.engine_time,
            },
            "discovered engine"
        );
        Ok(engine)
    }

    /// Switch the session to SNMPv3 with keys localized to `engine`.
    pub(crate) fn install_usm(
        &mut self,
        username: Bytes,
        level: SecurityLevel,
        engine: EngineState,
        user: Arc<UsmUser>,
    ) -> Result<()> {
        self.v3 = Some(V3State {
            username,
            level,
            engine,
            user,
            salt: SaltCounter::new()?,
        });
        Ok(())
    }

    async fn request_v3(&mut self, pdu: Pdu) -> Result<Pdu> {
        let request_id = pdu.request_id;
        self.exchange(
            request_id,
            |session| session.encode_v3(&pdu),
            move |session, response| session.accept_v3(response, request_id),
        )
        .await
    }

    /// Encode, encrypt and sign a request. msgID and request-id are equal.
    fn encode_v3(&self, pdu: &Pdu) -> Result<Bytes> {
        let v3 = self
            .v3
            .as_ref()
            .ok_or_else(|| Error::encode(EncodeErrorKind::EngineNotDiscovered))?;

        let engine_id = v3.engine.engine_id.clone();
        let boots = v3.engine.engine_boots;
        let time = v3.engine.estimated_time();
        let scoped = ScopedPdu::new(engine_id.clone(), pdu.clone());
        let mut params = UsmSecurityParams::new(engine_id, boots, time, v3.username.clone());

        let data = if v3.level.requires_priv() {
            let key = v3
                .user
                .priv_key
                .as_ref()
                .ok_or_else(|| Error::encode(EncodeErrorKind::NoPrivKey))?;
            let (ciphertext, salt) =
                key.encrypt(&scoped.encode_to_bytes(), boots, time, v3.salt.next())?;
            params = params.with_priv_params(salt);
            V3MessageData::Encrypted(ciphertext)
        } else {
            V3MessageData::Plaintext(scoped)
        };

        let auth_key = if v3.level.requires_auth() {
            let key = v3
                .user
                .auth_key
                .as_ref()
                .ok_or_else(|| Error::encode(EncodeErrorKind::MissingAuthKey))?;
            params = params.with_auth_placeholder(key.mac_len());
            Some(key)
        } else {
            None
        };

        let encoded = V3Message {
            global_data: MsgGlobalData::new(pdu.request_id, MsgFlags::new(v3.level, true)),
            security_params: params.encode(),
            data,
        }
        .encode();

        let Some(key) = auth_key else {
            return Ok(encoded);
        };
        let (offset, _) = UsmSecurityParams::find_auth_params(&encoded)
            .ok_or_else(|| Error::encode(EncodeErrorKind::MissingAuthParams))?;
        let mut signed = encoded.to_vec();
        auth::authenticate_message(key, &mut signed, offset)?;
        Ok(Bytes::from(signed))
    }

    /// Authenticate, decrypt and classify a v3 response.
    fn accept_v3(&mut self, data: Bytes, msg_id: i32) -> Result<Step<Pdu>> {
        let target = self.target;
        let v3 = self
            .v3
            .as_mut()
            .ok_or_else(|| Error::encode(EncodeErrorKind::EngineNotDiscovered))?;

        let message = match Message::decode(data.clone())? {
            Message::V3(message) => message,
            other => {
                return Err(Error::VersionMismatch {
                    expected: Version::V3,
                    actual: other.version(),
                });
            }
        };
        if message.msg_id() != msg_id {
            return Ok(Step::Ignore);
        }
        let usm = UsmSecurityParams::decode(message.security_params.clone())?;

        let authenticated = message.security_level().requires_auth();
        if authenticated {
            let key = v3
                .user
                .auth_key
                .as_ref()
                .ok_or_else(|| Error::auth(Some(target), AuthErrorKind::NoAuthKey))?;
            let (offset, len) = UsmSecurityParams::find_auth_params(&data)
                .ok_or_else(|| Error::auth(Some(target), AuthErrorKind::AuthParamsNotFound))?;
            auth::verify_message(key, &data, offset, len)?;
        }

        let scoped = match message.data {
            V3MessageData::Plaintext(scoped) => scoped,
            V3MessageData::Encrypted(ciphertext) => {
                let key = v3
                    .user
                    .priv_key
                    .as_ref()
                    .ok_or_else(|| Error::decrypt(Some(target), CryptoErrorKind::NoPrivKey))?;
                let plaintext = key.decrypt(
                    &ciphertext,
                    usm.engine_boots,
                    usm.engine_time,
                    &usm.priv_params,
                )?;
                ScopedPdu::decode(&mut Decoder::new(plaintext))?
            }
        };

        // Agents send most Reports unauthenticated; they are accepted at any level.
        if let Some(report) = UsmReport::classify(&scoped.pdu) {
            tracing::debug!(
                target: "snmp_southbound::usm",
                { snmp.target = %target, snmp.request_id = msg_id, ?report },
                "received report"
            );
            return match report {
                UsmReport::NotInTimeWindow => {
                    v3.engine.resync(usm.engine_boots, usm.engine_time);
                    Ok(Step::Resend(Error::NotInTimeWindow {
                        target: Some(target),
                    }))
                }
                other => Err(other.into_error(target)),
            };
        }

        if v3.level.requires_auth() && !authenticated {
            return Err(Error::auth(
                Some(target),
                AuthErrorKind::UnauthenticatedResponse,
            ));
        }
        if authenticated {
            v3.engine.update_time(usm.engine_boots, usm.engine_time);
        }
        if scoped.pdu.request_id != msg_id {
            return Err(Error::RequestIdMismatch {
                expected: msg_id,
                actual: scoped.pdu.request_id,
            });
        }
        Ok(Step::Done(scoped.pdu))
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        tracing::debug!(
            target: "snmp_southbound::session",
            { snmp.target = %self.target },
            "session closed"
        );
    }
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("target", &self.target)
            .field("version", &self.version)
            .field("security_level", &self.security_level())
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}
