use super::socket::TSocket;
use super::Ttl;
use crate::ping_error::{PingError, PingErrorKind};
use crate::StopCondition;
use pnet_packet::icmp::{echo_request::MutableEchoRequestPacket, IcmpCode, IcmpPacket, IcmpTypes};
use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::Packet;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

/// Type, code, checksum, identifier and sequence number.
pub const ECHO_HEADER_SIZE: usize = 8;

/// Replies are read with a fixed 20-byte IPv4 header in front of the ICMP message.
pub const IPV4_HEADER_SIZE: usize = 20;

// Room for the IP header on top of the request size.
const RECEIVE_BUFFER_HEADROOM: usize = 32;

// Upper bound for one blocking read, so a stop request is noticed while waiting for a reply.
const RECEIVE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Fields read from an echo reply.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReplyInfo {
    /// Total length reported in the IP header minus the fixed IP header size.
    pub payload_length: usize,
    pub ttl: Ttl,
    pub source: Ipv4Addr,
}

/// Build an echo request of exactly `size` bytes.
///
/// The header is type 8, code 0, identifier 0 and sequence number 0, followed by zeroed filler.
/// With zeroed filler the checksum always comes out as `0xf7ff`.
pub fn encode_echo_request(size: usize) -> Result<Vec<u8>, PingError> {
    let mut package = MutableEchoRequestPacket::owned(vec![0u8; size]).ok_or_else(|| {
        PingError::new(PingErrorKind::Encode, format!("could not create ICMP package of {size} bytes"))
    })?;
    package.set_icmp_type(IcmpTypes::EchoRequest);
    package.set_icmp_code(IcmpCode::new(0));
    package.set_identifier(0);
    package.set_sequence_number(0);

    package.set_checksum(0_u16);
    let icmp_package = IcmpPacket::new(package.packet())
        .ok_or_else(|| PingError::new(PingErrorKind::Encode, "could not read back ICMP package"))?;
    let checksum = pnet_packet::icmp::checksum(&icmp_package);
    package.set_checksum(checksum);
    Ok(package.packet().to_vec())
}

/// Read length, TTL and source address from a reply that still carries its IPv4 header.
///
/// Offsets are fixed: total length at bytes 2-3, TTL at byte 8, source address at bytes 12-15.
/// Returns `None` when fewer than [`IPV4_HEADER_SIZE`] bytes are given.
pub fn decode_echo_reply(bytes: &[u8]) -> Option<ReplyInfo> {
    let ipv4_package = Ipv4Packet::new(bytes)?;
    Some(ReplyInfo {
        payload_length: usize::from(ipv4_package.get_total_length()).saturating_sub(IPV4_HEADER_SIZE),
        ttl: ipv4_package.get_ttl().into(),
        source: ipv4_package.get_source(),
    })
}

/// Whether the ICMP message following the fixed IP header is an echo reply (type 0).
pub fn is_echo_reply(bytes: &[u8]) -> bool {
    bytes
        .get(IPV4_HEADER_SIZE..)
        .and_then(IcmpPacket::new)
        .map_or(false, |icmp_package| icmp_package.get_icmp_type() == IcmpTypes::EchoReply)
}

#[derive(Debug)]
pub(crate) enum Received {
    Reply { bytes: Vec<u8>, receive_time: Instant },
    Timeout,
    Failed(io::Error),
    Interrupted,
}

/// One open socket, used for exactly one probe.
pub(crate) struct IcmpV4<S> {
    socket: S,
}

impl<S> IcmpV4<S>
where
    S: TSocket,
{
    pub(crate) fn new(socket: S) -> IcmpV4<S> {
        IcmpV4 { socket }
    }

    /// Send `package` and return the instant taken right before handing it to the socket.
    pub(crate) fn send_to(&self, ipv4: Ipv4Addr, package: &[u8]) -> Result<Instant, PingError> {
        let addr: socket2::SockAddr = SocketAddr::new(IpAddr::V4(ipv4), 0).into();
        let start_time = Instant::now();
        self.socket.send_to(package, &addr).map_err(|e| PingError::send(&e))?;
        Ok(start_time)
    }

    /// Wait up to `wait` for an echo reply for a request of `request_size` bytes.
    ///
    /// Other ICMP messages arriving in the meantime are skipped. Any read error other than a
    /// timeout ends the wait with `Failed`.
    pub(crate) fn receive(&self, request_size: usize, wait: Duration, stop_condition: &StopCondition) -> Received {
        let deadline = Instant::now() + wait;
        let mut buf = vec![0u8; request_size + RECEIVE_BUFFER_HEADROOM];
        loop {
            if stop_condition.get_should_stop() {
                return Received::Interrupted;
            }
            let now = Instant::now();
            if now >= deadline {
                return Received::Timeout;
            }
            let slice = (deadline - now).min(RECEIVE_POLL_INTERVAL).max(Duration::from_millis(1));
            match self.socket.recv(&mut buf, slice) {
                Ok(n) => {
                    let receive_time = Instant::now();
                    let bytes = &buf[..n];
                    if is_echo_reply(bytes) {
                        return Received::Reply { bytes: bytes.to_vec(), receive_time };
                    }
                    tracing::trace!("skipping {} byte ICMP message that is not an echo reply", n);
                }
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {}
                Err(e) => return Received::Failed(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icmp::v4::socket::tests::{echo_reply_bytes, MockReply, OnSend, TransportMock};
    use crate::icmp::v4::socket::Transport;

    #[test]
    fn encode_sets_fixed_header() {
        let package = encode_echo_request(64).unwrap();

        assert_eq!(64, package.len());
        assert_eq!([8, 0, 0xf7, 0xff, 0, 0, 0, 0], package[..ECHO_HEADER_SIZE]);
        assert!(package[ECHO_HEADER_SIZE..].iter().all(|b| *b == 0));
    }

    #[test]
    fn encode_minimum_size_is_header_only() {
        let package = encode_echo_request(ECHO_HEADER_SIZE).unwrap();

        assert_eq!(vec![8, 0, 0xf7, 0xff, 0, 0, 0, 0], package);
    }

    #[test]
    fn encoded_checksum_verifies() {
        let package = encode_echo_request(100).unwrap();
        let icmp_package = IcmpPacket::new(&package).unwrap();

        assert_eq!(0xf7ff, icmp_package.get_checksum());
        assert_eq!(0xf7ff, pnet_packet::icmp::checksum(&icmp_package));
    }

    #[test]
    fn encode_below_header_size_fails() {
        let error = encode_echo_request(4).unwrap_err();

        assert_eq!(PingErrorKind::Encode, error.kind);
    }

    #[test]
    fn decode_reads_fixed_offsets() {
        let bytes = echo_reply_bytes(64, Ttl(57), Ipv4Addr::new(10, 1, 2, 3));

        let reply = decode_echo_reply(&bytes).unwrap();

        assert_eq!(64, reply.payload_length);
        assert_eq!(Ttl(57), reply.ttl);
        assert_eq!(Ipv4Addr::new(10, 1, 2, 3), reply.source);
    }

    #[test]
    fn decode_raw_layout() {
        let mut bytes = vec![0u8; IPV4_HEADER_SIZE + ECHO_HEADER_SIZE];
        bytes[0] = 0x45;
        bytes[2..4].copy_from_slice(&0x0054_u16.to_be_bytes());
        bytes[8] = 0xfe;
        bytes[12..16].copy_from_slice(&[192, 168, 1, 254]);

        let reply = decode_echo_reply(&bytes).unwrap();

        assert_eq!(0x54 - IPV4_HEADER_SIZE, reply.payload_length);
        assert_eq!(Ttl(254), reply.ttl);
        assert_eq!(Ipv4Addr::new(192, 168, 1, 254), reply.source);
    }

    #[test]
    fn decode_too_short_is_none() {
        assert!(decode_echo_reply(&[0x45, 0, 0, 28]).is_none());
    }

    #[test]
    fn echo_request_is_not_a_reply() {
        let mut bytes = echo_reply_bytes(8, Ttl(64), Ipv4Addr::LOCALHOST);
        assert!(is_echo_reply(&bytes));

        bytes[IPV4_HEADER_SIZE] = 8;
        assert!(!is_echo_reply(&bytes));
        assert!(!is_echo_reply(&bytes[..IPV4_HEADER_SIZE]));
    }

    #[test]
    fn send_to_hands_package_to_socket() {
        let transport = TransportMock::new(OnSend::ReturnDefault, vec![]);
        let icmpv4 = IcmpV4::new(transport.open().unwrap());
        let addr = Ipv4Addr::new(127, 0, 0, 1);

        let result = icmpv4.send_to(addr, &encode_echo_request(64).unwrap());

        assert!(result.is_ok());
        transport.should_send_number_of_messages(1).should_send_to_address(&IpAddr::V4(addr));
    }

    #[test]
    fn send_failure_is_send_error() {
        let transport = TransportMock::new(OnSend::ReturnErr, vec![]);
        let icmpv4 = IcmpV4::new(transport.open().unwrap());

        let error = icmpv4.send_to(Ipv4Addr::LOCALHOST, &encode_echo_request(64).unwrap()).unwrap_err();

        assert_eq!(PingErrorKind::Send, error.kind);
    }

    #[test]
    fn receive_skips_non_reply_messages() {
        let transport = TransportMock::new(
            OnSend::ReturnDefault,
            vec![MockReply::Request, MockReply::reply(Duration::ZERO, 64, Ipv4Addr::LOCALHOST)],
        );
        let icmpv4 = IcmpV4::new(transport.open().unwrap());

        let received = icmpv4.receive(64, Duration::from_millis(500), &StopCondition::new());

        match received {
            Received::Reply { bytes, .. } => assert_eq!(Ipv4Addr::LOCALHOST, decode_echo_reply(&bytes).unwrap().source),
            other => panic!("expected a reply, got {other:?}"),
        }
    }

    #[test]
    fn receive_times_out() {
        let transport = TransportMock::new(OnSend::ReturnDefault, vec![MockReply::Silent]);
        let icmpv4 = IcmpV4::new(transport.open().unwrap());
        let start = Instant::now();

        let received = icmpv4.receive(64, Duration::from_millis(50), &StopCondition::new());

        assert!(matches!(received, Received::Timeout));
        more_asserts::assert_ge!(start.elapsed(), Duration::from_millis(50));
    }

    #[test]
    fn receive_reports_read_failure() {
        let transport = TransportMock::new(OnSend::ReturnDefault, vec![MockReply::Error]);
        let icmpv4 = IcmpV4::new(transport.open().unwrap());

        let received = icmpv4.receive(64, Duration::from_millis(500), &StopCondition::new());

        assert!(matches!(received, Received::Failed(_)));
    }

    #[test]
    fn receive_observes_stop_condition() {
        let transport = TransportMock::new(OnSend::ReturnDefault, vec![MockReply::Silent]);
        let icmpv4 = IcmpV4::new(transport.open().unwrap());
        let stop_condition = StopCondition::new();
        stop_condition.set_should_stop();

        let received = icmpv4.receive(64, Duration::from_secs(5), &stop_condition);

        assert!(matches!(received, Received::Interrupted));
    }
}
