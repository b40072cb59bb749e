#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

//! ICMP echo based latency probing.
//!
//! [`PingRunner`] sends one echo request at a time over a fresh raw socket, waits a bounded time
//! for the reply and records every outcome in a shared [`PingStatistics`]. [`PingReport`] prints
//! the summary exactly once, whether the run completes, fails or is interrupted through its
//! [`StopCondition`].

pub use icmp::v4::{RawSocketTransport, ReplyInfo, Ttl};
pub use ping_config::*;
pub use ping_error::{GenericError, PingError, PingErrorKind};
pub use ping_output::ProbeOutcome;
pub use ping_report::{write_summary, PingReport};
pub use ping_runner::{PingRunner, RunEnd, State};
pub use ping_statistics::{PingStatistics, PingSummary};
pub use stop_condition::StopCondition;
pub use utils::lookup_host_v4;

pub mod icmp;
mod ping_config;
mod ping_error;
mod ping_output;
mod ping_report;
mod ping_runner;
mod ping_statistics;
mod stop_condition;
mod utils;
