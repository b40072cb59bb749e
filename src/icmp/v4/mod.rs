mod icmpv4;
pub use icmpv4::{decode_echo_reply, encode_echo_request, is_echo_reply, ReplyInfo, ECHO_HEADER_SIZE, IPV4_HEADER_SIZE};
pub(crate) use icmpv4::{IcmpV4, Received};

pub mod socket;
pub use socket::raw_socket::{RawSocket, RawSocketTransport};
pub use socket::{TSocket, Transport};

mod ttl;
pub use ttl::Ttl;
