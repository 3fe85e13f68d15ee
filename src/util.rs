//! Internal utilities.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

/// Receive buffer requested for session sockets. The kernel may cap it at
/// `net.core.rmem_max`.
pub(crate) const RECV_BUFFER_SIZE: usize = 64 * 1024;

/// Create a UDP socket on an ephemeral port, in the address family of `target`.
///
/// IPv6 sockets are dual-stack (`IPV6_V6ONLY = false`) so IPv4-mapped targets
/// work too.
pub(crate) fn bind_ephemeral_udp_socket(
    target: SocketAddr,
    recv_buffer_size: Option<usize>,
) -> io::Result<UdpSocket> {
    let (domain, bind_addr) = if target.is_ipv6() {
        (
            Domain::IPV6,
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        )
    } else {
        (
            Domain::IPV4,
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        )
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    if target.is_ipv6() {
        socket.set_only_v6(false)?;
    }

    if let Some(size) = recv_buffer_size {
        // Ignore errors - kernel will cap at rmem_max
        let _ = socket.set_recv_buffer_size(size);
    }

    // Must be non-blocking before handing it to tokio
    socket.set_nonblocking(true)?;
    socket.bind(&bind_addr.into())?;

    UdpSocket::from_std(socket.into())
}
