//! UDP transport.

use super::Transport;
use crate::error::{Error, Result};
use crate::util::{RECV_BUFFER_SIZE, bind_ephemeral_udp_socket};
use bytes::Bytes;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

/// Largest datagram accepted from an agent.
const MAX_DATAGRAM: usize = 65535;

/// Connected UDP socket owned by one session.
///
/// The socket is `connect`ed, so the kernel drops datagrams from any address
/// other than the agent.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    target: SocketAddr,
    local_addr: SocketAddr,
}

impl UdpTransport {
    pub async fn connect(target: SocketAddr) -> Result<Self> {
        let io_err = |source: std::io::Error| Error::Io {
            target: Some(target),
            source,
        };

        let socket = bind_ephemeral_udp_socket(target, Some(RECV_BUFFER_SIZE)).map_err(io_err)?;
        socket.connect(target).await.map_err(io_err)?;
        let local_addr = socket.local_addr().map_err(io_err)?;

        tracing::debug!(
            target: "snmp_southbound::session",
            { snmp.target = %target, snmp.local_addr = %local_addr },
            "UDP transport connected"
        );

        Ok(Self {
            socket,
            target,
            local_addr,
        })
    }
}

impl Transport for UdpTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        tracing::trace!(
            target: "snmp_southbound::session",
            { snmp.target = %self.target, snmp.bytes = data.len() },
            "UDP send"
        );
        self.socket.send(data).await.map_err(|e| Error::Io {
            target: Some(self.target),
            source: e,
        })?;
        Ok(())
    }

    async fn recv(&self, request_id: i32, recv_timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        let mut buf = vec![0u8; MAX_DATAGRAM];

        match timeout(recv_timeout, self.socket.recv(&mut buf)).await {
            Ok(Ok(len)) => {
                buf.truncate(len);
                tracing::trace!(
                    target: "snmp_southbound::session",
                    { snmp.target = %self.target, snmp.bytes = len },
                    "UDP recv complete"
                );
                Ok((Bytes::from(buf), self.target))
            }
            Ok(Err(e)) => Err(Error::Io {
                target: Some(self.target),
                source: e,
            }),
            Err(_) => Err(Error::Timeout {
                target: Some(self.target),
                elapsed: recv_timeout,
                request_id,
                retries: 0,
            }),
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.target
    }

    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}
