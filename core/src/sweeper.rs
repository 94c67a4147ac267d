//! # Sweeps
//!
//! The entry points of the crate. A [`Sweeper`] is built from an explicit
//! [`ScanConfig`] and a set of capabilities (probes, resolvers, vendor
//! lookup). Each sweep enumerates its candidates, hands them to a
//! [`Coordinator`] together with a probe closure, and lets the
//! [`Aggregator`] order what comes back.
//!
//! The capabilities are trait objects so tests and alternative front ends can
//! swap any of them without touching the sweep logic.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use netsweep_common::config::{LivenessStrategy, ScanConfig};
use netsweep_common::error::ScanError;
use netsweep_common::network::device::Device;
use netsweep_common::network::port::{self, PortRange, PortRecord};
use netsweep_common::network::range;
use netsweep_common::scanning::{
    HardwareAddressResolver, HostNameResolver, LivenessProber, PortProber,
};
use netsweep_common::session::{ScanSession, SweepTarget};
use netsweep_common::vendors::VendorRepository;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::aggregator::{Aggregator, SweepReport};
use crate::network::ping::PingProber;
use crate::network::tcp::{HandshakeProber, TcpConnectProber};
use crate::resolver::hostname::{PtrHostNameResolver, SystemHostNameResolver};
use crate::resolver::neighbor::NeighborCacheResolver;
use crate::scanner::{Coordinator, ProgressCallback};
use crate::vendors::MacOuiRepo;

pub struct Sweeper {
    cfg: ScanConfig,
    liveness: Arc<dyn LivenessProber>,
    ports: Arc<dyn PortProber>,
    hardware: Arc<dyn HardwareAddressResolver>,
    hostnames: Option<Arc<dyn HostNameResolver>>,
    vendors: Arc<dyn VendorRepository>,
    cancel: CancellationToken,
    on_progress: Option<ProgressCallback>,
}

impl Sweeper {
    /// Builds a sweeper backed by the real network implementations that
    /// `cfg` asks for.
    pub fn new(cfg: ScanConfig) -> Self {
        let liveness: Arc<dyn LivenessProber> = match cfg.liveness {
            LivenessStrategy::Ping => Arc::new(PingProber),
            LivenessStrategy::Handshake => Arc::new(HandshakeProber::default()),
        };
        let hostnames: Option<Arc<dyn HostNameResolver>> = match (cfg.no_dns, cfg.dns_server) {
            (true, _) => None,
            (false, Some(server)) => Some(Arc::new(PtrHostNameResolver::new(server))),
            (false, None) => Some(Arc::new(SystemHostNameResolver)),
        };

        Self {
            liveness,
            ports: Arc::new(TcpConnectProber),
            hardware: Arc::new(NeighborCacheResolver::new(cfg.arp_timeout)),
            hostnames,
            vendors: Arc::new(MacOuiRepo),
            cancel: CancellationToken::new(),
            on_progress: None,
            cfg,
        }
    }

    pub fn with_liveness(mut self, liveness: Arc<dyn LivenessProber>) -> Self {
        self.liveness = liveness;
        self
    }

    pub fn with_port_prober(mut self, ports: Arc<dyn PortProber>) -> Self {
        self.ports = ports;
        self
    }

    pub fn with_hardware_resolver(mut self, hardware: Arc<dyn HardwareAddressResolver>) -> Self {
        self.hardware = hardware;
        self
    }

    /// `None` skips hostname lookups entirely.
    pub fn with_hostname_resolver(mut self, hostnames: Option<Arc<dyn HostNameResolver>>) -> Self {
        self.hostnames = hostnames;
        self
    }

    pub fn with_vendor_repository(mut self, vendors: Arc<dyn VendorRepository>) -> Self {
        self.vendors = vendors;
        self
    }

    /// Token observed by every sweep this sweeper runs. Once cancelled, later
    /// sweeps dispatch nothing.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn on_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.cfg
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Probes every host of the /24 around `local` and returns the ones that
    /// answered, enriched and ordered by address.
    pub async fn scan_subnet(&self, local: Ipv4Addr) -> SweepReport<Device> {
        let probe_timeout: Duration = self.cfg.host_timeout;
        let limit: usize = self.cfg.host_concurrency;
        let session = ScanSession::start(SweepTarget::Subnet { local }, limit, probe_timeout);
        let candidates: Vec<Ipv4Addr> = range::subnet_candidates(local).collect();

        info!(
            "sweeping {} ({} candidates, {} at a time)",
            session.target(),
            candidates.len(),
            limit
        );

        let enricher = Enricher {
            hardware: self.hardware.clone(),
            hostnames: self.hostnames.clone(),
            vendors: self.vendors.clone(),
            arp_timeout: self.cfg.arp_timeout,
            hostname_timeout: self.cfg.hostname_timeout,
        };
        let mut coordinator =
            Coordinator::new(limit, self.cancel.clone()).with_progress(self.on_progress.clone());

        let dispatch = coordinator
            .run(candidates.iter().copied(), |addr| {
                let liveness = self.liveness.clone();
                let enricher = enricher.clone();
                let cancel = self.cancel.clone();
                async move {
                    if !liveness.probe(addr, probe_timeout).await {
                        debug!("{addr} did not respond");
                        return None;
                    }
                    debug!("{addr} is alive");

                    // Lookups may outlast the probe timeout; a cancelled sweep
                    // keeps the bare device instead of waiting for them.
                    let device = tokio::select! {
                        device = enricher.device(addr) => device,
                        _ = cancel.cancelled() => {
                            debug!("skipping lookups for {addr}, sweep cancelled");
                            Device::new(addr)
                        }
                    };
                    Some(device)
                }
            })
            .await;

        let report = Aggregator::new().finish(session, candidates.len(), dispatch);
        log_finished(&report);
        report
    }

    /// Probes every port in `low..=high` on `addr`.
    ///
    /// The bounds are checked before anything is dispatched.
    pub async fn scan_port_range(
        &self,
        addr: Ipv4Addr,
        low: u16,
        high: u16,
    ) -> Result<SweepReport<PortRecord>, ScanError> {
        let ports: PortRange = PortRange::new(low, high)?;
        let target = SweepTarget::Ports {
            address: addr,
            range: ports,
            common_only: false,
        };

        Ok(self
            .sweep_ports(addr, target, ports.iter().collect(), self.cfg.port_concurrency)
            .await)
    }

    /// Probes the curated set of commonly exposed service ports on `addr`.
    pub async fn scan_common_ports(&self, addr: Ipv4Addr) -> SweepReport<PortRecord> {
        let ports: PortRange = PortRange::common();
        let target = SweepTarget::Ports {
            address: addr,
            range: ports,
            common_only: true,
        };
        let candidates: Vec<u16> = ports.iter().filter(|p| port::is_common_port(*p)).collect();

        self.sweep_ports(addr, target, candidates, self.cfg.common_port_concurrency)
            .await
    }

    async fn sweep_ports(
        &self,
        address: Ipv4Addr,
        target: SweepTarget,
        candidates: Vec<u16>,
        limit: usize,
    ) -> SweepReport<PortRecord> {
        let probe_timeout: Duration = self.cfg.port_timeout;
        let session = ScanSession::start(target, limit, probe_timeout);

        info!(
            "scanning {} ({} ports, {} at a time)",
            session.target(),
            candidates.len(),
            limit
        );

        let mut coordinator =
            Coordinator::new(limit, self.cancel.clone()).with_progress(self.on_progress.clone());

        let dispatch = coordinator
            .run(candidates.iter().copied(), |port| {
                let prober = self.ports.clone();
                async move {
                    if prober.probe(address, port, probe_timeout).await {
                        debug!("{address}:{port} is open");
                        Some(PortRecord::new(port))
                    } else {
                        None
                    }
                }
            })
            .await;

        let report = Aggregator::new().finish(session, candidates.len(), dispatch);
        log_finished(&report);
        report
    }
}

/// Best-effort lookups that turn a live address into a [`Device`].
#[derive(Clone)]
struct Enricher {
    hardware: Arc<dyn HardwareAddressResolver>,
    hostnames: Option<Arc<dyn HostNameResolver>>,
    vendors: Arc<dyn VendorRepository>,
    arp_timeout: Duration,
    hostname_timeout: Duration,
}

impl Enricher {
    async fn device(&self, addr: Ipv4Addr) -> Device {
        let hardware = async {
            timeout(self.arp_timeout, self.hardware.resolve(addr))
                .await
                .ok()
                .flatten()
        };
        let hostname = async {
            match &self.hostnames {
                Some(resolver) => {
                    timeout(self.hostname_timeout, resolver.resolve(addr, self.hostname_timeout))
                        .await
                        .ok()
                        .flatten()
                }
                None => None,
            }
        };
        let (mac, hostname) = tokio::join!(hardware, hostname);
        let vendor: Option<String> = mac.and_then(|mac| self.vendors.get_vendor(mac));

        Device::new(addr)
            .with_mac(mac)
            .with_hostname(hostname)
            .with_vendor(vendor)
    }
}

fn log_finished<T>(report: &SweepReport<T>) {
    let summary = report.summary();
    if summary.cancelled {
        info!(
            "{} cancelled after {} of {} probes, {} found",
            report.session().target(),
            summary.dispatched,
            summary.candidates,
            summary.found
        );
    } else {
        info!(
            "{} finished in {:.2}s, {} found",
            report.session().target(),
            summary.elapsed.as_secs_f64(),
            summary.found
        );
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
