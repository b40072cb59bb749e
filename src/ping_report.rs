use crate::ping_statistics::{PingStatistics, PingSummary};
use crate::utils::lock;
use std::io::{self, Write};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Prints the final report exactly once.
///
/// Both the end of a normal run and an interrupt handler call [`PingReport::report_once`]; the
/// first caller prints, later calls do nothing. The statistics are read under their lock, so the
/// report never sees a half-recorded probe.
pub struct PingReport<W> {
    target: Ipv4Addr,
    statistics: Arc<Mutex<PingStatistics>>,
    output: Mutex<W>,
    reported: AtomicBool,
}

impl<W> PingReport<W>
where
    W: Write,
{
    pub fn new(target: Ipv4Addr, statistics: Arc<Mutex<PingStatistics>>, output: W) -> Self {
        PingReport { target, statistics, output: Mutex::new(output), reported: AtomicBool::new(false) }
    }

    /// Returns `true` for the one call that printed the report.
    pub fn report_once(&self) -> bool {
        if self.reported.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            tracing::trace!("report already printed");
            return false;
        }
        let summary = lock(&self.statistics).summarize();
        let mut output = lock(&self.output);
        if let Err(e) = write_summary(&mut *output, self.target, &summary).and_then(|()| output.flush()) {
            tracing::error!("could not write ping statistics: {}", e);
        }
        true
    }

    pub fn into_output(self) -> W {
        self.output.into_inner().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Write the statistics block followed by the round-trip block. Times are whole milliseconds.
pub fn write_summary<W>(output: &mut W, target: Ipv4Addr, summary: &PingSummary) -> io::Result<()>
where
    W: Write + ?Sized,
{
    writeln!(output)?;
    writeln!(output, "Ping statistics for {target}:")?;
    writeln!(
        output,
        "    Packets: Sent = {}, Received = {}, Lost = {} ({:.1}% loss)",
        summary.sent, summary.received, summary.lost, summary.loss_percent
    )?;
    writeln!(output, "Approximate round trip times in milli-seconds:")?;
    writeln!(
        output,
        "    Minimum = {}ms, Maximum = {}ms, Average = {}ms",
        summary.min_rtt.as_millis(),
        summary.max_rtt.as_millis(),
        summary.avg_rtt.as_millis()
    )
}
