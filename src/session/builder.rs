//! Opening sessions from connection profiles.
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use std::time::Duration;
//! # use snmp_southbound::{DeviceConnectionProfile, Intent, SessionBuilder, UsmCredentialCache};
//! # async fn example() -> snmp_southbound::Result<()> {
//! let cache = Arc::new(UsmCredentialCache::new());
//! let profile = DeviceConnectionProfile::v2c("192.168.127.253", "public", "private");
//!
//! let session = SessionBuilder::new(cache)
//!     .retries(1)
//!     .build(&profile, Duration::from_secs(2), Intent::Read)
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::profile::{DeviceConnectionProfile, Intent};
use crate::southbound::{Connector, UdpConnector};
use crate::transport::{Transport, UdpTransport};
use crate::v3::{UsmCredentialCache, UsmUser};
use crate::version::Version;

use super::Session;

/// Retries per request unless configured otherwise.
pub const DEFAULT_RETRIES: u32 = 2;

/// Opens [`Session`]s.
///
/// Holds the credential cache shared by every SNMPv3 session the engine
/// opens, so keys are localized once per `(username, engineID)`.
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    cache: Arc<UsmCredentialCache>,
    retries: u32,
}

impl SessionBuilder {
    pub fn new(cache: Arc<UsmCredentialCache>) -> Self {
        Self {
            cache,
            retries: DEFAULT_RETRIES,
        }
    }

    /// Set the number of resends after a timeout.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Open a UDP session to the device in `profile`.
    pub async fn build(
        &self,
        profile: &DeviceConnectionProfile,
        timeout: Duration,
        intent: Intent,
    ) -> Result<Session<UdpTransport>> {
        self.build_with(&UdpConnector, profile, timeout, intent)
            .await
    }

    /// Open a session over the transport `connector` produces.
    pub async fn build_with<C: Connector>(
        &self,
        connector: &C,
        profile: &DeviceConnectionProfile,
        timeout: Duration,
        intent: Intent,
    ) -> Result<Session<C::Transport>> {
        profile.validate()?;
        let target = resolve(profile).await?;
        let transport = connector.connect(target).await.map_err(|e| Error::Connect {
            target: Some(target),
            source: Box::new(e),
        })?;
        self.build_with_transport(transport, profile, timeout, intent)
            .await
    }

    /// Open a session over an already bound transport.
    ///
    /// For SNMPv3 this runs engine discovery and localizes the profile's
    /// passwords to the discovered engine, refreshing the credential cache.
    pub async fn build_with_transport<T: Transport>(
        &self,
        transport: T,
        profile: &DeviceConnectionProfile,
        timeout: Duration,
        intent: Intent,
    ) -> Result<Session<T>> {
        profile.validate()?;

        if profile.version != Version::V3 {
            let community = Bytes::copy_from_slice(profile.community(intent).as_bytes());
            let session =
                Session::new(transport, profile.version, community, timeout, self.retries);
            tracing::debug!(
                target: "snmp_southbound::session",
                { snmp.target = %session.target(), snmp.version = %profile.version, ?intent },
                "session opened"
            );
            return Ok(session);
        }

        let mut session = Session::new(transport, Version::V3, Bytes::new(), timeout, self.retries);
        let target = session.target();
        let engine = session.discover_engine().await.map_err(|e| Error::Connect {
            target: Some(target),
            source: Box::new(e),
        })?;

        let level = profile.security_level();
        let auth = profile
            .auth
            .protocol()
            .map(|protocol| (protocol, profile.auth_password.as_bytes()));
        let privacy = profile
            .privacy
            .protocol()
            .map(|protocol| (protocol, profile.priv_password.as_bytes()));
        let user = self
            .cache
            .refresh(&profile.username, &engine.engine_id, || {
                UsmUser::derive(auth, privacy, &engine.engine_id)
            })
            .map_err(|e| e.with_target(target))?;

        let username = Bytes::copy_from_slice(profile.username.as_bytes());
        session.install_usm(username, level, engine, user)?;

        tracing::debug!(
            target: "snmp_southbound::session",
            { snmp.target = %target, snmp.version = %Version::V3, snmp.security_level = ?level },
            "session opened"
        );
        Ok(session)
    }
}

/// Resolve the profile's host to the first address it names.
async fn resolve(profile: &DeviceConnectionProfile) -> Result<SocketAddr> {
    let io_error = |source| Error::Connect {
        target: None,
        source: Box::new(Error::Io {
            target: None,
            source,
        }),
    };

    tokio::net::lookup_host((profile.host.as_str(), profile.port))
        .await
        .map_err(io_error)?
        .next()
        .ok_or_else(|| {
            io_error(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not resolve address",
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::message::SecurityLevel;
    use crate::profile::{AuthKind, PrivKind};
    use crate::transport::{MockTransport, MockUsmAgent, ResponseBuilder};

    const ENGINE_ID: &[u8] = b"\x80\x00\x1f\x88\x80switch-01";

    fn mock() -> MockTransport {
        MockTransport::new("192.0.2.20:161".parse().unwrap())
    }

    #[tokio::test]
    async fn test_community_selected_by_intent() {
        let cache = Arc::new(UsmCredentialCache::new());
        let profile = DeviceConnectionProfile::v2c("192.0.2.20", "ro-comm", "rw-comm");
        let builder = SessionBuilder::new(cache);

        let read = builder
            .build_with_transport(mock(), &profile, Duration::from_secs(1), Intent::Read)
            .await
            .unwrap();
        assert_eq!(read.community(), b"ro-comm");

        let write = builder
            .build_with_transport(mock(), &profile, Duration::from_secs(1), Intent::Write)
            .await
            .unwrap();
        assert_eq!(write.community(), b"rw-comm");
        assert_eq!(write.retries(), DEFAULT_RETRIES);
    }

    #[tokio::test]
    async fn test_v3_discovery_populates_cache() {
        let cache = Arc::new(UsmCredentialCache::new());
        let transport = mock();
        transport.queue_response(ResponseBuilder::build_v3_discovery_report(ENGINE_ID, 3, 1200));

        let profile = DeviceConnectionProfile::v3("192.0.2.20", "admin")
            .with_auth(AuthKind::Sha1, "authpass123")
            .with_privacy(PrivKind::Aes, "privpass123");
        let session = SessionBuilder::new(cache.clone())
            .build_with_transport(transport, &profile, Duration::from_secs(1), Intent::Read)
            .await
            .unwrap();

        assert_eq!(session.security_level(), Some(SecurityLevel::AuthPriv));
        assert_eq!(session.engine_id().map(|id| id.as_ref()), Some(ENGINE_ID));
        let user = cache.get("admin", &Bytes::from_static(ENGINE_ID)).unwrap();
        assert!(user.auth_key.is_some() && user.priv_key.is_some());
    }

    #[tokio::test]
    async fn test_v3_discovery_timeout_is_connect_error() {
        let profile = DeviceConnectionProfile::v3("192.0.2.20", "admin");
        let err = SessionBuilder::new(Arc::new(UsmCredentialCache::new()))
            .retries(0)
            .build_with_transport(mock(), &profile, Duration::from_millis(50), Intent::Read)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connect);
        assert!(matches!(err.root(), Error::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_short_password_rejected_after_discovery() {
        let cache = Arc::new(UsmCredentialCache::new());
        let transport = mock();
        transport.queue_response(ResponseBuilder::build_v3_discovery_report(ENGINE_ID, 1, 10));

        let profile =
            DeviceConnectionProfile::v3("192.0.2.20", "admin").with_auth(AuthKind::Md5, "short");
        let err = SessionBuilder::new(cache.clone())
            .build_with_transport(transport, &profile, Duration::from_secs(1), Intent::Read)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Crypto);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_mock_agent_discovery_reply() {
        let agent = MockUsmAgent::new(ENGINE_ID, 7, 99, "admin");
        let transport = mock();
        transport.queue_reply(move |request| agent.discovery_report(request).unwrap());

        let profile = DeviceConnectionProfile::v3("192.0.2.20", "admin");
        let session = SessionBuilder::new(Arc::new(UsmCredentialCache::new()))
            .build_with_transport(transport, &profile, Duration::from_secs(1), Intent::Write)
            .await
            .unwrap();
        assert_eq!(session.security_level(), Some(SecurityLevel::NoAuthNoPriv));
    }
}
