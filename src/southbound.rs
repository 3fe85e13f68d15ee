//! One-call device operations.
//!
//! [`Southbound`] is the surface the configuration layer calls: every method
//! opens a session with the timeout and community its operation class needs,
//! runs exactly one engine operation and drops the session before returning.
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use snmp_southbound::{DeviceConnectionProfile, EngineConfig, Southbound, UsmCredentialCache};
//! # async fn example() -> snmp_southbound::Result<()> {
//! let southbound = Southbound::new(Arc::new(UsmCredentialCache::new()), EngineConfig::default());
//! let profile = DeviceConnectionProfile::v2c("192.168.127.253", "public", "private");
//!
//! let names = southbound.get_list(&profile, &["1.3.6.1.2.1.1.5.0"]).await?;
//! let vlans = southbound.bulk_walk(&profile, "1.3.6.1.2.1.17.7.1.4.3.1.1").await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::{EngineConfig, OperationClass};
use crate::error::{Operation, Result};
use crate::profile::DeviceConnectionProfile;
use crate::session::{Session, SessionBuilder};
use crate::set::SetEntry;
use crate::transport::{Transport, UdpTransport};
use crate::v3::UsmCredentialCache;
use crate::walk::{OidValueMap, WalkOutcome};

/// Produces a bound transport for a resolved agent address.
pub trait Connector: Send + Sync {
    type Transport: Transport;

    fn connect(&self, target: SocketAddr) -> impl Future<Output = Result<Self::Transport>> + Send;
}

/// Connects over UDP.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpConnector;

impl Connector for UdpConnector {
    type Transport = UdpTransport;

    async fn connect(&self, target: SocketAddr) -> Result<UdpTransport> {
        UdpTransport::connect(target).await
    }
}

/// Every session opened through a mock shares its response queue.
#[cfg(any(test, feature = "testing"))]
impl Connector for crate::transport::MockTransport {
    type Transport = Self;

    async fn connect(&self, _target: SocketAddr) -> Result<Self> {
        Ok(self.clone())
    }
}

/// Session-per-call facade over the engine.
#[derive(Debug, Clone)]
pub struct Southbound<C = UdpConnector> {
    connector: C,
    cache: Arc<UsmCredentialCache>,
    config: EngineConfig,
}

impl Southbound<UdpConnector> {
    pub fn new(cache: Arc<UsmCredentialCache>, config: EngineConfig) -> Self {
        Self::with_connector(UdpConnector, cache, config)
    }
}

impl<C: Connector> Southbound<C> {
    pub fn with_connector(
        connector: C,
        cache: Arc<UsmCredentialCache>,
        config: EngineConfig,
    ) -> Self {
        Self {
            connector,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<UsmCredentialCache> {
        &self.cache
    }

    async fn open(
        &self,
        profile: &DeviceConnectionProfile,
        class: OperationClass,
        operation: Operation,
        oid: Option<&str>,
    ) -> Result<Session<C::Transport>> {
        SessionBuilder::new(self.cache.clone())
            .retries(self.config.retries)
            .build_with(
                &self.connector,
                profile,
                self.config.timeouts.for_class(class),
                class.intent(),
            )
            .await
            .map_err(|e| match e.target() {
                Some(target) => e.in_operation(operation, target, oid),
                None => e,
            })
    }

    /// GET each OID, with the read timeout and read community.
    pub async fn get_list<S: AsRef<str>>(
        &self,
        profile: &DeviceConnectionProfile,
        oids: &[S],
    ) -> Result<OidValueMap> {
        let mut session = self.open(profile, OperationClass::Read, Operation::Get, None).await?;
        session.get(oids).await
    }

    /// GETNEXT walk, with the read timeout and read community.
    pub async fn walk(&self, profile: &DeviceConnectionProfile, oid: &str) -> Result<WalkOutcome> {
        let mut session = self
            .open(profile, OperationClass::Read, Operation::WalkNext, Some(oid))
            .await?;
        session.walk_next(oid).await
    }

    /// GETBULK walk, with the bulk timeout and read community.
    pub async fn bulk_walk(
        &self,
        profile: &DeviceConnectionProfile,
        oid: &str,
    ) -> Result<WalkOutcome> {
        let mut session = self
            .open(profile, OperationClass::Bulk, Operation::WalkBulk, Some(oid))
            .await?;
        session.walk_bulk(oid, self.config.max_repetitions).await
    }

    /// Ordered SET transaction, with the write timeout and write community.
    pub async fn set(&self, profile: &DeviceConnectionProfile, entries: &[SetEntry]) -> Result<()> {
        let mut session = self
            .open(profile, OperationClass::Write, Operation::Set, None)
            .await?;
        session.set_many(entries).await
    }
}
