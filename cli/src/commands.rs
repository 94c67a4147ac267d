pub mod discover;
pub mod info;
pub mod scan;

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use netsweep_common::config::{self, Config, LivenessStrategy, ScanConfig};
use netsweep_common::network::port::PortRange;

#[derive(Parser)]
#[command(name = "netsweep", version)]
#[command(about = "Finds live hosts on the local subnet and the TCP ports they expose.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub scan: ScanArgs,

    /// Reduce output; repeat for less
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Show probe-level logs; repeat for more
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Skip the start-up banner
    #[arg(long, global = true)]
    pub no_banner: bool,

    /// Do not listen for 'q' while a sweep runs
    #[arg(long, global = true)]
    pub no_input: bool,

    /// Write the results to a file (.json, or plain text for anything else)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Directory for relative --output paths
    #[arg(long, global = true, env = "OUTPUT_DIRECTORY")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Seconds to wait for each host probe; a ping is cut off shortly after
    #[arg(long, global = true, env = "SCAN_TIMEOUT", value_parser = parse_seconds)]
    pub host_timeout: Option<Duration>,

    /// Seconds to wait for each port probe
    #[arg(long, global = true, env = "PORT_SCAN_TIMEOUT", value_parser = parse_seconds)]
    pub port_timeout: Option<Duration>,

    /// Host probes in flight at once
    #[arg(long, global = true, env = "SCAN_THREADS", value_parser = parse_count)]
    pub host_threads: Option<usize>,

    /// Port probes in flight at once
    #[arg(long, global = true, env = "PORT_SCAN_THREADS", value_parser = parse_count)]
    pub port_threads: Option<usize>,

    /// Do not look up hostnames
    #[arg(long, global = true)]
    pub no_dns: bool,

    /// Send PTR queries to this server instead of using the system resolver
    #[arg(long, global = true)]
    pub dns_server: Option<IpAddr>,

    /// Detect hosts with a TCP handshake instead of `ping`
    #[arg(long, global = true)]
    pub unprivileged: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show networking information about this device
    #[command(alias = "i")]
    Info,
    /// Discover live hosts on the local /24
    #[command(alias = "d")]
    Discover {
        /// Address whose /24 is swept; detected when omitted
        #[arg(short, long)]
        local: Option<Ipv4Addr>,
    },
    /// Scan the TCP ports of one host
    #[command(alias = "s")]
    Scan {
        /// IPv4 address, or the 1-based index of a host found by a discovery
        /// sweep that runs first
        target: ScanTarget,

        /// Ports to probe as `low-high`; the common service ports by default
        #[arg(short, long)]
        range: Option<PortRange>,

        /// Address whose /24 is swept when the target is an index
        #[arg(short, long)]
        local: Option<Ipv4Addr>,
    },
}

/// What `scan` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTarget {
    Address(Ipv4Addr),
    /// One-based position in a discovery result.
    Index(usize),
}

impl FromStr for ScanTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(addr) = s.parse::<Ipv4Addr>() {
            return Ok(ScanTarget::Address(addr));
        }
        match s.parse::<usize>() {
            Ok(0) => Err("device indices start at 1".to_string()),
            Ok(idx) => Ok(ScanTarget::Index(idx)),
            Err(_) => Err(format!("'{s}' is neither an IPv4 address nor a device index")),
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> Config {
        Config {
            no_banner: self.no_banner,
            quiet: self.quiet,
            disable_input: self.no_input,
            scan: self.scan.to_scan_config(),
        }
    }
}

impl ScanArgs {
    pub fn to_scan_config(&self) -> ScanConfig {
        let defaults = ScanConfig::default();
        ScanConfig {
            host_concurrency: self.host_threads.unwrap_or(defaults.host_concurrency),
            port_concurrency: self.port_threads.unwrap_or(defaults.port_concurrency),
            common_port_concurrency: self
                .port_threads
                .map(|n| n.min(config::DEFAULT_COMMON_PORT_CONCURRENCY))
                .unwrap_or(defaults.common_port_concurrency),
            host_timeout: self.host_timeout.unwrap_or(defaults.host_timeout),
            port_timeout: self.port_timeout.unwrap_or(defaults.port_timeout),
            no_dns: self.no_dns,
            dns_server: self.dns_server,
            liveness: if self.unprivileged {
                LivenessStrategy::Handshake
            } else {
                LivenessStrategy::Ping
            },
            ..defaults
        }
    }
}

/// Seconds, fractions allowed.
fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid number of seconds '{s}': {e}"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("timeout must be positive, got '{s}'"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}

/// Whole counts; `50.0` is accepted since the variables have always been
/// read as numbers.
fn parse_count(s: &str) -> Result<usize, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid count '{s}': {e}"))?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(format!("expected a whole number, got '{s}'"));
    }
    Ok(value as usize)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
