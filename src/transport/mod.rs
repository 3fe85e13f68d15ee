//! Transport layer abstraction.
//!
//! Sessions are generic over [`Transport`]: [`UdpTransport`] talks to real
//! agents, [`MockTransport`] (feature `testing`) replays canned responses.

mod udp;

#[cfg(any(test, feature = "testing"))]
mod mock;

pub use udp::*;

#[cfg(any(test, feature = "testing"))]
pub use mock::*;

use crate::error::Result;
use bytes::Bytes;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

/// Datagram transport bound to one agent.
pub trait Transport: Send + Sync {
    /// Send one request datagram to the peer.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Wait up to `timeout` for the next datagram from the peer.
    ///
    /// `request_id` is only used for diagnostics; matching the response to
    /// the request is the session's job.
    ///
    /// Returns (response_data, actual_source_address)
    fn recv(
        &self,
        request_id: i32,
        timeout: Duration,
    ) -> impl Future<Output = Result<(Bytes, SocketAddr)>> + Send;

    /// The agent address this transport sends to and receives from.
    fn peer_addr(&self) -> SocketAddr;

    /// Local bind address.
    fn local_addr(&self) -> SocketAddr;
}
