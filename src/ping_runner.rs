use crate::icmp::v4::{decode_echo_reply, encode_echo_request, IcmpV4, Received, Transport};
use crate::ping_config::ProbeConfig;
use crate::ping_error::PingError;
use crate::ping_output::ProbeOutcome;
use crate::ping_statistics::PingStatistics;
use crate::utils::lock;
use crate::StopCondition;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Why a run ended without a fatal error.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RunEnd {
    /// The probe count was reached or the run timeout elapsed.
    Completed,
    /// The stop condition was set from outside.
    Interrupted,
}

/// The probe loop: one request in flight at a time, one socket per probe.
///
/// Every outcome goes into the shared [`PingStatistics`]; printing the final report is left to
/// [`crate::PingReport`].
pub struct PingRunner<T> {
    config: ProbeConfig,
    transport: T,
    statistics: Arc<Mutex<PingStatistics>>,
    stop_condition: StopCondition,
    states: Vec<State>,
}

impl<T> PingRunner<T>
where
    T: Transport,
{
    pub fn new(
        config: ProbeConfig,
        transport: T,
        statistics: Arc<Mutex<PingStatistics>>,
        stop_condition: StopCondition,
    ) -> Self {
        PingRunner { config, transport, statistics, stop_condition, states: vec![State::Idle] }
    }

    pub fn get_states(&self) -> Vec<State> {
        self.states.clone()
    }

    /// Probe until the count is reached, the run timeout elapses or the stop condition is set.
    ///
    /// A status line per probe goes to `output`. A lost reply is recorded and the loop goes on.
    /// Failing to open a socket or to send ends the run with `Err`; whatever was recorded up to
    /// that point stays in the statistics.
    pub fn run<W>(&mut self, output: &mut W) -> Result<RunEnd, PingError>
    where
        W: Write,
    {
        if self.states.last() != Some(&State::Idle) {
            tracing::warn!("PingRunner::run called more than once");
            return Ok(RunEnd::Completed);
        }
        self.states.push(State::Running);
        tracing::debug!("start probing {} with {:?}", self.config.target(), self.config);

        let start = Instant::now();
        let result = self.probe_until_stopped(start, output);

        self.states.push(State::Stopping);
        self.states.push(State::Stopped);
        match &result {
            Ok(run_end) => tracing::debug!("probing ended: {:?}", run_end),
            Err(e) => tracing::error!("probing aborted: {}", e),
        }
        result
    }

    fn probe_until_stopped<W>(&self, start: Instant, output: &mut W) -> Result<RunEnd, PingError>
    where
        W: Write,
    {
        loop {
            if self.stop_condition.get_should_stop() {
                return Ok(RunEnd::Interrupted);
            }
            if self.run_timeout_elapsed(start) {
                return Ok(RunEnd::Completed);
            }

            if self.probe_once(output)?.is_none() {
                return Ok(RunEnd::Interrupted);
            }

            if let Some(count) = self.config.count() {
                if lock(&self.statistics).sent() >= count {
                    return Ok(RunEnd::Completed);
                }
            }
            // The probe itself may have used up the remaining budget.
            if self.run_timeout_elapsed(start) {
                return Ok(RunEnd::Completed);
            }

            if self.stop_condition.wait_timeout(self.config.interval()) {
                return Ok(RunEnd::Interrupted);
            }
        }
    }

    /// Send one request and wait for its reply. `Ok(None)` means the stop condition was set; a
    /// probe interrupted after it was recorded as sent counts as neither received nor lost.
    fn probe_once<W>(&self, output: &mut W) -> Result<Option<ProbeOutcome>, PingError>
    where
        W: Write,
    {
        let package = encode_echo_request(self.config.packet_size())?;
        let icmpv4 = IcmpV4::new(self.transport.open()?);

        let send_time = icmpv4.send_to(self.config.target(), &package)?;
        {
            let mut statistics = lock(&self.statistics);
            if self.stop_condition.get_should_stop() {
                return Ok(None);
            }
            statistics.record_sent();
        }

        let outcome = match icmpv4.receive(package.len(), self.config.reply_timeout(), &self.stop_condition) {
            Received::Reply { bytes, receive_time } => match decode_echo_reply(&bytes) {
                Some(reply) => ProbeOutcome::Received { rtt: receive_time - send_time, reply },
                None => {
                    tracing::warn!("dropping truncated reply of {} bytes", bytes.len());
                    ProbeOutcome::Lost
                }
            },
            Received::Timeout => ProbeOutcome::Lost,
            Received::Failed(e) => {
                tracing::warn!("error receiving reply: {}", e);
                ProbeOutcome::Lost
            }
            Received::Interrupted => {
                tracing::trace!("interrupted while waiting for a reply");
                return Ok(None);
            }
        };

        // Once the stop condition is set the report may already have read the statistics, so
        // nothing is recorded or printed after that point.
        let mut statistics = lock(&self.statistics);
        if self.stop_condition.get_should_stop() {
            tracing::trace!("stopped before recording {:?}", outcome);
            return Ok(None);
        }
        statistics.record(&outcome);
        writeln!(output, "{outcome}")?;
        Ok(Some(outcome))
    }

    fn run_timeout_elapsed(&self, start: Instant) -> bool {
        self.config.run_timeout().map_or(false, |run_timeout| start.elapsed() > run_timeout)
    }
}
