use std::io;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ping_rtt::{
    lookup_host_v4, GenericError, PingReport, PingRunner, PingStatistics, ProbeConfig, RawSocketTransport,
    StopCondition, MIN_PACKET_SIZE,
};

#[derive(argh::FromArgs)]
/// ping-rtt - measure round-trip latency to a host with ICMP ECHO_REQUEST packets
struct Args {
    #[argh(option, short = 'c')]
    /// stop after <count> probes (default: until interrupted)
    count: Option<u64>,

    #[argh(option, short = 'i', default = "1")]
    /// seconds to wait between probes
    interval: u64,

    #[argh(option, short = 's', default = "64")]
    /// packet size in bytes, raised to 8 if smaller
    size: usize,

    #[argh(option, short = 't')]
    /// stop sending after <timeout> seconds
    timeout: Option<u64>,

    #[argh(switch, short = 'v')]
    /// log diagnostics to stderr
    verbose: bool,

    #[argh(positional)]
    /// host name or IPv4 address
    target: String,
}

fn main() -> Result<(), GenericError> {
    let args: Args = argh::from_env();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(if args.verbose { tracing::Level::TRACE } else { tracing::Level::WARN })
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let target = lookup_host_v4(&args.target)?;
    let config = probe_config(&args, target);

    if let Some(notice) = size_notice(args.size) {
        println!("{notice}");
    }
    println!("{}", banner(&args.target, target, config.packet_size()));

    let statistics = Arc::new(Mutex::new(PingStatistics::new()));
    let stop_condition = StopCondition::new();
    let report = Arc::new(PingReport::new(target, statistics.clone(), io::stdout()));

    let handler_stop_condition = stop_condition.clone();
    let handler_report = report.clone();
    ctrlc::set_handler(move || {
        tracing::trace!("interrupt received");
        handler_stop_condition.set_should_stop();
        handler_report.report_once();
    })?;

    let mut ping_runner = PingRunner::new(config, RawSocketTransport, statistics, stop_condition);
    let result = ping_runner.run(&mut io::stdout());
    report.report_once();
    result?;
    Ok(())
}

/// The first line printed, naming the host as given on the command line when it is not an address.
fn banner(host: &str, target: Ipv4Addr, packet_size: usize) -> String {
    if host.parse::<Ipv4Addr>().is_ok() {
        format!("\nPinging {target} with {packet_size} bytes of data:")
    } else {
        format!("\nPinging {host} [{target}] with {packet_size} bytes of data:")
    }
}

fn size_notice(size: usize) -> Option<String> {
    (size < MIN_PACKET_SIZE)
        .then(|| format!("Packet size must be => {MIN_PACKET_SIZE}. Packet size set to {MIN_PACKET_SIZE}."))
}

fn probe_config(args: &Args, target: Ipv4Addr) -> ProbeConfig {
    let mut config = ProbeConfig::new(target)
        .with_packet_size(args.size)
        .with_interval(Duration::from_secs(args.interval));
    if let Some(count) = args.count {
        config = config.with_count(count);
    }
    if let Some(timeout) = args.timeout {
        config = config.with_run_timeout(Duration::from_secs(timeout));
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["ping-rtt"], args).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&["127.0.0.1"]);
        let config = probe_config(&args, Ipv4Addr::LOCALHOST);

        assert_eq!(ProbeConfig::new(Ipv4Addr::LOCALHOST), config);
    }

    #[test]
    fn all_flags() {
        let args = parse(&["example.org", "-c", "4", "-i", "0", "-s", "3", "-t", "10"]);
        let config = probe_config(&args, Ipv4Addr::new(192, 0, 2, 1));

        assert_eq!(Some(4), config.count());
        assert_eq!(Duration::ZERO, config.interval());
        assert_eq!(8, config.packet_size());
        assert_eq!(Some(Duration::from_secs(10)), config.run_timeout());
        assert_eq!(Duration::from_millis(2000), config.reply_timeout());
    }

    #[test]
    fn banner_for_address() {
        assert_eq!("\nPinging 127.0.0.1 with 64 bytes of data:", banner("127.0.0.1", Ipv4Addr::LOCALHOST, 64));
    }

    #[test]
    fn banner_for_host_name() {
        assert_eq!(
            "\nPinging example.org [192.0.2.1] with 8 bytes of data:",
            banner("example.org", Ipv4Addr::new(192, 0, 2, 1), 8)
        );
    }

    #[test]
    fn size_notice_only_below_header_size() {
        assert_eq!(
            Some("Packet size must be => 8. Packet size set to 8.".to_string()),
            size_notice(3)
        );
        assert_eq!(None, size_notice(8));
        assert_eq!(None, size_notice(64));
    }

    #[test]
    fn non_numeric_count_is_rejected() {
        assert!(Args::from_args(&["ping-rtt"], &["127.0.0.1", "-c", "many"]).is_err());
    }

    #[test]
    fn target_is_required() {
        assert!(Args::from_args(&["ping-rtt"], &[]).is_err());
    }
}
