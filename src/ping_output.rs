use crate::icmp::v4::ReplyInfo;
use std::fmt;
use std::time::Duration;

/// Result of one probe attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    Received { rtt: Duration, reply: ReplyInfo },
    /// No reply within the wait, or a read error on the socket.
    Lost,
}

/// The per-probe status line.
impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Received { rtt, reply } => write!(
                f,
                "Reply from {}: bytes={} time={}ms TTL={}",
                reply.source,
                reply.payload_length,
                rtt.as_millis(),
                reply.ttl
            ),
            ProbeOutcome::Lost => write!(f, "Request timed out."),
        }
    }
}
