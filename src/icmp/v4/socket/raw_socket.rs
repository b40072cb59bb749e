use super::{TSocket, Transport};
use crate::ping_error::PingError;
use socket2::{Domain, Protocol, Type};
use std::io::{self, Read};
use std::time::Duration;

/// Raw IPv4 socket restricted to ICMP. Needs root or `CAP_NET_RAW`.
///
/// Reads on a raw socket return the whole IP datagram, header included.
pub struct RawSocket {
    socket: socket2::Socket,
}

impl RawSocket {
    pub fn new() -> Result<Self, PingError> {
        let socket = socket2::Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))
            .map_err(|e| PingError::socket_open(&e))?;
        tracing::trace!("opened raw ICMP socket");
        Ok(RawSocket { socket })
    }
}

impl Drop for RawSocket {
    fn drop(&mut self) {
        tracing::trace!("closing raw ICMP socket");
    }
}

impl TSocket for RawSocket {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    fn recv(&self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        self.socket.set_read_timeout(Some(timeout))?;
        (&self.socket).read(buf)
    }
}

/// Opens one [`RawSocket`] per probe.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawSocketTransport;

impl Transport for RawSocketTransport {
    type Socket = RawSocket;

    fn open(&self) -> Result<RawSocket, PingError> {
        RawSocket::new()
    }
}
