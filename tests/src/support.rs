use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use netsweep_common::config::ScanConfig;
use netsweep_common::scanning::{HardwareAddressResolver, LivenessProber, PortProber};
use netsweep_common::vendors::VendorRepository;
use netsweep_core::Sweeper;
use pnet::util::MacAddr;
use tokio_util::sync::CancellationToken;

/// Counts probes and the highest number seen running at once.
#[derive(Default)]
pub struct Gauge {
    probes: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    /// Returns the zero-based index of the probe that just started.
    fn enter(&self) -> usize {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.probes.fetch_add(1, Ordering::SeqCst)
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Cancels a token once a given number of probes has started.
struct Tripwire {
    after: usize,
    token: CancellationToken,
}

impl Tripwire {
    fn check(&self, probe_index: usize) {
        if probe_index + 1 >= self.after {
            self.token.cancel();
        }
    }
}

/// Delay rule for fake probes.
#[derive(Clone, Copy)]
pub enum Latency {
    None,
    Fixed(Duration),
    /// Lower keys answer later, so completion order is the reverse of
    /// dispatch order.
    Descending { base: Duration, max_key: u32 },
}

impl Latency {
    fn for_key(self, key: u32) -> Duration {
        match self {
            Latency::None => Duration::ZERO,
            Latency::Fixed(delay) => delay,
            Latency::Descending { base, max_key } => base * max_key.saturating_sub(key),
        }
    }
}

pub struct FakeHosts {
    alive: HashSet<Ipv4Addr>,
    latency: Latency,
    tripwire: Option<Tripwire>,
    pub gauge: Gauge,
}

impl FakeHosts {
    pub fn new(alive: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        Self {
            alive: alive.into_iter().collect(),
            latency: Latency::None,
            tripwire: None,
            gauge: Gauge::default(),
        }
    }

    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    pub fn cancel_after(mut self, after: usize, token: CancellationToken) -> Self {
        self.tripwire = Some(Tripwire { after, token });
        self
    }
}

#[async_trait]
impl LivenessProber for FakeHosts {
    async fn probe(&self, addr: Ipv4Addr, _timeout: Duration) -> bool {
        let idx = self.gauge.enter();
        if let Some(tripwire) = &self.tripwire {
            tripwire.check(idx);
        }
        tokio::time::sleep(self.latency.for_key(u32::from(addr.octets()[3]))).await;
        self.gauge.exit();
        self.alive.contains(&addr)
    }
}

pub struct FakePorts {
    open: HashSet<u16>,
    latency: Latency,
    tripwire: Option<Tripwire>,
    pub gauge: Gauge,
}

impl FakePorts {
    pub fn new(open: impl IntoIterator<Item = u16>) -> Self {
        Self {
            open: open.into_iter().collect(),
            latency: Latency::None,
            tripwire: None,
            gauge: Gauge::default(),
        }
    }

    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    pub fn cancel_after(mut self, after: usize, token: CancellationToken) -> Self {
        self.tripwire = Some(Tripwire { after, token });
        self
    }
}

#[async_trait]
impl PortProber for FakePorts {
    async fn probe(&self, _addr: Ipv4Addr, port: u16, _timeout: Duration) -> bool {
        let idx = self.gauge.enter();
        if let Some(tripwire) = &self.tripwire {
            tripwire.check(idx);
        }
        tokio::time::sleep(self.latency.for_key(u32::from(port))).await;
        self.gauge.exit();
        self.open.contains(&port)
    }
}

/// The neighbour cache never has an entry.
pub struct EmptyNeighborCache;

#[async_trait]
impl HardwareAddressResolver for EmptyNeighborCache {
    async fn resolve(&self, _addr: Ipv4Addr) -> Option<MacAddr> {
        None
    }
}

/// Every host has the same hardware address.
pub struct FixedNeighborCache(pub MacAddr);

#[async_trait]
impl HardwareAddressResolver for FixedNeighborCache {
    async fn resolve(&self, _addr: Ipv4Addr) -> Option<MacAddr> {
        Some(self.0)
    }
}

pub struct NoVendors;

impl VendorRepository for NoVendors {
    fn get_vendor(&self, _mac: MacAddr) -> Option<String> {
        None
    }
}

pub fn scan_config(host_concurrency: usize, port_concurrency: usize) -> ScanConfig {
    ScanConfig {
        host_concurrency,
        port_concurrency,
        no_dns: true,
        ..ScanConfig::default()
    }
}

/// A sweeper with no real network access.
pub fn offline_sweeper(cfg: ScanConfig, hosts: Arc<FakeHosts>, ports: Arc<FakePorts>) -> Sweeper {
    Sweeper::new(cfg)
        .with_liveness(hosts)
        .with_port_prober(ports)
        .with_hardware_resolver(Arc::new(EmptyNeighborCache))
        .with_hostname_resolver(None)
        .with_vendor_repository(Arc::new(NoVendors))
}

pub fn lan(host: u8) -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 50, host)
}
