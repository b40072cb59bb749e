use crate::icmp::v4::ECHO_HEADER_SIZE;
use std::net::Ipv4Addr;
use std::time::Duration;

pub const MIN_PACKET_SIZE: usize = ECHO_HEADER_SIZE;
pub const DEFAULT_PACKET_SIZE: usize = 64;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(2000);

/// Settings for one ping run. Read-only once the run starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeConfig {
    target: Ipv4Addr,
    packet_size: usize,
    interval: Duration,
    count: Option<u64>,
    run_timeout: Option<Duration>,
    reply_timeout: Duration,
}

impl ProbeConfig {
    /// Unbounded run against `target` with 64 byte packets, one per second.
    pub fn new(target: Ipv4Addr) -> Self {
        ProbeConfig {
            target,
            packet_size: DEFAULT_PACKET_SIZE,
            interval: DEFAULT_INTERVAL,
            count: None,
            run_timeout: None,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    /// Sizes below [`MIN_PACKET_SIZE`] are raised to it.
    #[must_use]
    pub fn with_packet_size(mut self, packet_size: usize) -> Self {
        if packet_size < MIN_PACKET_SIZE {
            tracing::warn!("packet size {} raised to {}", packet_size, MIN_PACKET_SIZE);
        }
        self.packet_size = packet_size.max(MIN_PACKET_SIZE);
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Stop after `count` probes. Zero means no limit.
    #[must_use]
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = (count > 0).then_some(count);
        self
    }

    /// Stop sending once the run has lasted longer than `run_timeout`.
    #[must_use]
    pub fn with_run_timeout(mut self, run_timeout: Duration) -> Self {
        self.run_timeout = Some(run_timeout);
        self
    }

    /// How long a single probe waits for its reply.
    #[must_use]
    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    pub fn target(&self) -> Ipv4Addr {
        self.target
    }

    pub fn packet_size(&self) -> usize {
        self.packet_size
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn count(&self) -> Option<u64> {
        self.count
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout
    }

    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }
}
