use crate::ping_output::ProbeOutcome;
use std::time::Duration;

/// Counters and round-trip extrema for one run.
///
/// `sent` is counted when a request leaves the socket, `received` or `lost` once its probe
/// resolves, so `sent == received + lost` between probes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PingStatistics {
    sent: u64,
    received: u64,
    lost: u64,
    min_rtt: Duration,
    max_rtt: Duration,
    total_rtt: Duration,
}

impl Default for PingStatistics {
    fn default() -> Self {
        PingStatistics {
            sent: 0,
            received: 0,
            lost: 0,
            min_rtt: Duration::MAX,
            max_rtt: Duration::ZERO,
            total_rtt: Duration::ZERO,
        }
    }
}

/// Final view of a run, as printed in the report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PingSummary {
    pub sent: u64,
    pub received: u64,
    pub lost: u64,
    pub loss_percent: f64,
    pub min_rtt: Duration,
    pub max_rtt: Duration,
    pub avg_rtt: Duration,
}

impl PingStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sent(&mut self) {
        self.sent += 1;
    }

    pub fn record_received(&mut self, rtt: Duration) {
        self.received += 1;
        self.min_rtt = self.min_rtt.min(rtt);
        self.max_rtt = self.max_rtt.max(rtt);
        self.total_rtt = self.total_rtt.saturating_add(rtt);
    }

    pub fn record_lost(&mut self) {
        self.lost += 1;
    }

    pub fn record(&mut self, outcome: &ProbeOutcome) {
        match outcome {
            ProbeOutcome::Received { rtt, .. } => self.record_received(*rtt),
            ProbeOutcome::Lost => self.record_lost(),
        }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn lost(&self) -> u64 {
        self.lost
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn summarize(&self) -> PingSummary {
        let loss_percent = if self.sent == 0 {
            0.0
        } else {
            (100.0 * (1.0 - self.received as f64 / self.sent as f64)).clamp(0.0, 100.0)
        };
        let avg_rtt = if self.received == 0 {
            Duration::ZERO
        } else {
            let avg_nanos = self.total_rtt.as_nanos() / u128::from(self.received);
            Duration::from_nanos(u64::try_from(avg_nanos).unwrap_or(u64::MAX))
        };
        PingSummary {
            sent: self.sent,
            received: self.received,
            lost: self.lost,
            loss_percent,
            min_rtt: if self.received == 0 { Duration::ZERO } else { self.min_rtt },
            max_rtt: self.max_rtt,
            avg_rtt,
        }
    }
}
