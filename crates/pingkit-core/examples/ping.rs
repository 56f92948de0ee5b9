use anyhow::anyhow;
use clap::Parser;
use pingkit_core::{Builder, ProbeOutcome, UNKNOWN_ERROR};
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::time::Duration;

/// A toy clone of ping.
///
/// *** This is for demonstration purposes only. ***
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, arg_required_else_help(true))]
struct Args {
    host: String,
    /// Number of probes to send.
    #[arg(short = 'c')]
    count: Option<usize>,
    /// Per-probe reply timeout in milliseconds.
    #[arg(short = 'W')]
    timeout: Option<u64>,
    /// Pause between probes in milliseconds.
    #[arg(short = 'i')]
    interval: Option<u64>,
    /// Enable trace logging.
    #[arg(short = 'v')]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("pingkit_core=trace")
            .init();
    }
    let hostname = args.host;
    let count = args.count.unwrap_or(10);
    let timeout = Duration::from_millis(args.timeout.unwrap_or(1000));
    let interval = Duration::from_millis(args.interval.unwrap_or(1000));
    let addr = resolve(&hostname)?;
    let pinger = Builder::new(addr)
        .max_probes(count)?
        .probe_timeout(timeout)
        .probe_interval(interval)
        .build()?;
    println!("PING {hostname} ({addr})");
    pinger.run_with(|report| match report.outcome {
        ProbeOutcome::Success(reply) => {
            let rtt_ms = reply.rtt.unwrap_or_default() * 1000_f64;
            println!(
                "reply from {addr}: icmp_seq={} time={rtt_ms:.3} ms",
                report.sequence.0
            );
        }
        ProbeOutcome::ProtocolError(reply) => {
            println!(
                "from {addr}: icmp_seq={} {}",
                report.sequence.0,
                reply.description.unwrap_or(UNKNOWN_ERROR)
            );
        }
        ProbeOutcome::IdentifierMismatch(_) | ProbeOutcome::Timeout => {
            println!("request timed out: icmp_seq={}", report.sequence.0);
        }
    })?;
    let summary = pinger.snapshot().summary();
    println!("--- {hostname} ping statistics ---");
    println!(
        "{:.1}% packet loss, rtt min/avg/max = {:.3}/{:.3}/{:.3} ms",
        summary.loss * 100_f64,
        summary.min * 1000_f64,
        summary.avg * 1000_f64,
        summary.max * 1000_f64
    );
    Ok(())
}

fn resolve(hostname: &str) -> anyhow::Result<Ipv4Addr> {
    let addrs: Vec<_> = (hostname, 0)
        .to_socket_addrs()
        .map_err(|_| anyhow!("ping: unknown host {}", hostname))?
        .filter_map(|addr| match addr {
            SocketAddr::V4(addr) => Some(*addr.ip()),
            SocketAddr::V6(_) => None,
        })
        .collect();
    match addrs.as_slice() {
        [] => Err(anyhow!("ping: no IPv4 address for {}", hostname)),
        [addr, ..] => Ok(*addr),
    }
}
