use std::net::IpAddr;
use std::time::Duration;

pub const DEFAULT_HOST_CONCURRENCY: usize = 50;
pub const DEFAULT_PORT_CONCURRENCY: usize = 100;
pub const DEFAULT_COMMON_PORT_CONCURRENCY: usize = 50;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_HOSTNAME_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_ARP_TIMEOUT: Duration = Duration::from_secs(5);

/// Terminal-facing settings.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Suppresses the version banner.
    pub no_banner: bool,
    /// 0 prints everything, 1 drops headers, 2 prints the summary only.
    pub quiet: u8,
    /// Disables the key listener that lets `q` stop a sweep early.
    pub disable_input: bool,
    pub scan: ScanConfig,
}

/// How a host is judged to be alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LivenessStrategy {
    /// Shell out to the platform `ping` utility.
    #[default]
    Ping,
    /// Unprivileged TCP handshake against a well-known port.
    Handshake,
}

/// Everything a sweep needs to know up front.
///
/// Built once and passed by value into the sweeper; nothing reads it from
/// process-wide state.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub host_concurrency: usize,
    pub port_concurrency: usize,
    pub common_port_concurrency: usize,
    pub host_timeout: Duration,
    pub port_timeout: Duration,
    pub hostname_timeout: Duration,
    pub arp_timeout: Duration,
    /// Skips reverse lookups entirely; every hostname stays unresolved.
    pub no_dns: bool,
    /// Sends PTR queries straight to this server instead of the system resolver.
    pub dns_server: Option<IpAddr>,
    pub liveness: LivenessStrategy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            host_concurrency: DEFAULT_HOST_CONCURRENCY,
            port_concurrency: DEFAULT_PORT_CONCURRENCY,
            common_port_concurrency: DEFAULT_COMMON_PORT_CONCURRENCY,
            host_timeout: DEFAULT_PROBE_TIMEOUT,
            port_timeout: DEFAULT_PROBE_TIMEOUT,
            hostname_timeout: DEFAULT_HOSTNAME_TIMEOUT,
            arp_timeout: DEFAULT_ARP_TIMEOUT,
            no_dns: false,
            dns_server: None,
            liveness: LivenessStrategy::default(),
        }
    }
}
