use crate::ping_error::PingError;
use std::{io, time::Duration};

pub(crate) mod raw_socket;

/// An open ICMP socket.
///
/// Dropping the socket closes it.
pub trait TSocket: Send {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize>;

    /// Block for at most `timeout` and copy one received datagram, IPv4 header included, into
    /// `buf`. A wait without data ends in `WouldBlock` or `TimedOut`.
    fn recv(&self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;
}

/// Opens a fresh socket for every probe, so a wedged socket never outlives its probe.
pub trait Transport {
    type Socket: TSocket;

    fn open(&self) -> Result<Self::Socket, PingError>;
}
