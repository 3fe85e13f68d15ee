//! Common test fixtures and constants.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use snmp_southbound::transport::{MockTransport, ResponseBuilder};
use snmp_southbound::{
    DeviceConnectionProfile, EngineConfig, Oid, Southbound, Timeouts, UsmCredentialCache, Value,
    oid,
};

// =============================================================================
// Bridge and interface MIB OIDs used by the TSN configuration layer
// =============================================================================

/// ifOperStatus column: 1.3.6.1.2.1.2.2.1.8
pub const IF_OPER_STATUS: &str = "1.3.6.1.2.1.2.2.1.8";

/// dot1qVlanStaticName column: 1.3.6.1.2.1.17.7.1.4.3.1.1
pub const VLAN_STATIC_NAME: &str = "1.3.6.1.2.1.17.7.1.4.3.1.1";

/// dot1qVlanStaticEgressPorts column: 1.3.6.1.2.1.17.7.1.4.3.1.2
pub const VLAN_EGRESS_PORTS: &str = "1.3.6.1.2.1.17.7.1.4.3.1.2";

/// dot1qVlanStaticRowStatus column: 1.3.6.1.2.1.17.7.1.4.3.1.5
pub const VLAN_ROW_STATUS: &str = "1.3.6.1.2.1.17.7.1.4.3.1.5";

pub fn if_oper_status(index: u32) -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 8, index)
}

pub fn if_admin_status(index: u32) -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 7, index)
}

pub fn vlan_static_name(vid: u32) -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 3, 1, 1, vid)
}

pub fn vlan_egress_ports(vid: u32) -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 3, 1, 2, vid)
}

pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}

// =============================================================================
// Device and credentials
// =============================================================================

pub const SWITCH_HOST: &str = "127.0.0.1";

pub fn switch_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 161))
}

/// V2c read community
pub const COMMUNITY_RO: &str = "public";
/// V2c write community
pub const COMMUNITY_RW: &str = "private";

/// Auth password for V3 users
pub const AUTH_PASSWORD: &str = "authpass123";
/// Privacy password for V3 users
pub const PRIV_PASSWORD: &str = "privpass123";

pub const V3_USER: &str = "admin";

/// Authoritative engine ID of the simulated switch.
pub const ENGINE_ID: &[u8] = b"\x80\x00\x1f\x88\x80tsn-switch";

pub fn v2c_profile() -> DeviceConnectionProfile {
    DeviceConnectionProfile::v2c(SWITCH_HOST, COMMUNITY_RO, COMMUNITY_RW)
}

pub fn v1_profile() -> DeviceConnectionProfile {
    DeviceConnectionProfile::v1(SWITCH_HOST, COMMUNITY_RO, COMMUNITY_RW)
}

// =============================================================================
// Mock agent helpers
// =============================================================================

pub fn mock() -> MockTransport {
    MockTransport::new(switch_addr())
}

/// Short timeouts and no retries, so exhausted queues fail fast.
pub fn fast_config() -> EngineConfig {
    EngineConfig::default()
        .timeouts(Timeouts {
            read: Duration::from_millis(50),
            bulk: Duration::from_millis(50),
            write: Duration::from_millis(50),
        })
        .retries(0)
}

pub fn southbound(mock: &MockTransport) -> Southbound<MockTransport> {
    Southbound::with_connector(mock.clone(), Arc::new(UsmCredentialCache::new()), fast_config())
}

/// Single-varbind v2c response.
pub fn v2c_reply(oid: Oid, value: Value) -> Bytes {
    ResponseBuilder::new(1)
        .varbind(oid, value)
        .build_v2c(COMMUNITY_RO.as_bytes())
}

/// Multi-varbind v2c response.
pub fn v2c_batch(varbinds: impl IntoIterator<Item = (Oid, Value)>) -> Bytes {
    varbinds
        .into_iter()
        .fold(ResponseBuilder::new(1), |builder, (oid, value)| {
            builder.varbind(oid, value)
        })
        .build_v2c(COMMUNITY_RO.as_bytes())
}
