use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use netsweep_common::config::LivenessStrategy;
use netsweep_common::scanning::HardwareAddressResolver;
use netsweep_core::network::tcp::HandshakeProber;
use netsweep_core::Sweeper;
use pnet::util::MacAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::support::{
    lan, offline_sweeper, scan_config, FakeHosts, FakePorts, FixedNeighborCache, Latency,
    NoVendors,
};

fn addresses(devices: &[netsweep_common::network::device::Device]) -> Vec<Ipv4Addr> {
    devices.iter().map(|d| d.address()).collect()
}

/// Never answers within any sane timeout.
struct StalledNeighborCache;

#[async_trait]
impl HardwareAddressResolver for StalledNeighborCache {
    async fn resolve(&self, _addr: Ipv4Addr) -> Option<MacAddr> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Some(MacAddr::new(1, 2, 3, 4, 5, 6))
    }
}

#[tokio::test]
async fn devices_are_ordered_by_address_not_by_completion() {
    let hosts = Arc::new(
        FakeHosts::new([lan(200), lan(3), lan(10), lan(77)]).with_latency(Latency::Descending {
            base: Duration::from_millis(1),
            max_key: 255,
        }),
    );
    let sweeper = offline_sweeper(scan_config(254, 1), hosts.clone(), Arc::new(FakePorts::new([])));

    let report = sweeper.scan_subnet(lan(1)).await;

    assert_eq!(
        addresses(report.items()),
        vec![lan(3), lan(10), lan(77), lan(200)]
    );
    assert_eq!(hosts.gauge.probes(), 254);
    assert!(!report.summary().cancelled);
}

#[tokio::test]
async fn silent_subnet_yields_an_empty_report() {
    let hosts = Arc::new(FakeHosts::new([]));
    let sweeper = offline_sweeper(scan_config(32, 1), hosts.clone(), Arc::new(FakePorts::new([])));

    let report = sweeper.scan_subnet(lan(9)).await;

    assert!(report.is_empty());
    let summary = report.summary();
    assert_eq!(summary.candidates, 254);
    assert_eq!(summary.dispatched, 254);
    assert_eq!(summary.negatives, 254);
    assert_eq!(summary.failures, 0);
    assert_eq!(hosts.gauge.probes(), 254);
}

#[tokio::test]
async fn missing_hardware_address_keeps_the_device() {
    let hosts = Arc::new(FakeHosts::new([lan(5)]));
    let sweeper = offline_sweeper(scan_config(16, 1), hosts, Arc::new(FakePorts::new([])));

    let report = sweeper.scan_subnet(lan(1)).await;

    assert_eq!(report.len(), 1);
    let device = &report.items()[0];
    assert_eq!(device.address(), lan(5));
    assert_eq!(device.hardware_address_label(), "Unknown");
    assert_eq!(device.hostname_label(), "Unknown");
    assert_eq!(device.vendor(), None);
}

#[tokio::test]
async fn stalled_hardware_lookup_is_cut_off() {
    let mut cfg = scan_config(16, 1);
    cfg.arp_timeout = Duration::from_millis(50);

    let hosts = Arc::new(FakeHosts::new([lan(5), lan(6)]));
    let sweeper = offline_sweeper(cfg, hosts, Arc::new(FakePorts::new([])))
        .with_hardware_resolver(Arc::new(StalledNeighborCache));

    let report = tokio::time::timeout(Duration::from_secs(10), sweeper.scan_subnet(lan(1)))
        .await
        .expect("sweep should not wait for the stalled resolver");

    assert_eq!(addresses(report.items()), vec![lan(5), lan(6)]);
    assert!(report.items().iter().all(|d| d.hardware_address().is_none()));
}

#[tokio::test]
async fn resolved_hardware_address_is_attached() {
    let mac = MacAddr::new(0x00, 0x00, 0x0c, 0x12, 0x34, 0x56);
    let hosts = Arc::new(FakeHosts::new([lan(8)]));
    let sweeper = offline_sweeper(scan_config(16, 1), hosts, Arc::new(FakePorts::new([])))
        .with_hardware_resolver(Arc::new(FixedNeighborCache(mac)))
        .with_vendor_repository(Arc::new(NoVendors));

    let report = sweeper.scan_subnet(lan(1)).await;

    assert_eq!(report.items()[0].hardware_address(), Some(&mac));
    assert_eq!(report.items()[0].hardware_address_label(), "00:00:0C:12:34:56");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_probes_never_exceed_the_limit() {
    let hosts = Arc::new(
        FakeHosts::new((1..=254).map(lan)).with_latency(Latency::Fixed(Duration::from_millis(5))),
    );
    let sweeper = offline_sweeper(scan_config(8, 1), hosts.clone(), Arc::new(FakePorts::new([])));

    let report = sweeper.scan_subnet(lan(1)).await;

    assert_eq!(report.len(), 254);
    assert!(hosts.gauge.peak() <= 8, "peak was {}", hosts.gauge.peak());
    assert!(hosts.gauge.peak() > 1, "probes never overlapped");
}

#[tokio::test]
async fn cancelled_sweep_returns_a_subset() {
    let cancel = CancellationToken::new();
    let alive: Vec<Ipv4Addr> = (1..=254).map(lan).collect();
    let hosts = Arc::new(FakeHosts::new(alive.clone()).cancel_after(10, cancel.clone()));
    let sweeper = offline_sweeper(scan_config(1, 1), hosts.clone(), Arc::new(FakePorts::new([])))
        .with_cancellation(cancel);

    let report = sweeper.scan_subnet(lan(1)).await;

    let summary = report.summary();
    assert!(summary.cancelled);
    assert_eq!(summary.dispatched, 10);
    assert_eq!(hosts.gauge.probes(), 10);
    assert!(report.len() <= 10);
    assert!(report.items().iter().all(|d| alive.contains(&d.address())));
    assert!(report.items().windows(2).all(|w| w[0].address() < w[1].address()));
}

#[tokio::test]
async fn cancellation_does_not_wait_for_slow_lookups() {
    let cancel = CancellationToken::new();
    let mut cfg = scan_config(1, 1);
    cfg.host_timeout = Duration::from_millis(100);

    let hosts = Arc::new(FakeHosts::new((1..=254).map(lan)).cancel_after(1, cancel.clone()));
    let sweeper = offline_sweeper(cfg, hosts.clone(), Arc::new(FakePorts::new([])))
        .with_hardware_resolver(Arc::new(StalledNeighborCache))
        .with_cancellation(cancel);

    let started = Instant::now();
    let report = sweeper.scan_subnet(lan(1)).await;
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_secs(1),
        "cancelled sweep took {elapsed:?}"
    );
    assert!(report.summary().cancelled);
    assert_eq!(hosts.gauge.probes(), 1);
    assert_eq!(addresses(report.items()), vec![lan(1)]);
    assert!(report.items()[0].hardware_address().is_none());
}

#[tokio::test]
async fn cancelled_sweeper_dispatches_nothing_later() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let hosts = Arc::new(FakeHosts::new([lan(4)]));
    let sweeper = offline_sweeper(scan_config(8, 1), hosts.clone(), Arc::new(FakePorts::new([])))
        .with_cancellation(cancel);

    let report = sweeper.scan_subnet(lan(1)).await;

    assert!(report.is_empty());
    assert!(report.summary().cancelled);
    assert_eq!(hosts.gauge.probes(), 0);
}

#[tokio::test]
async fn repeated_sweeps_agree() {
    let hosts = Arc::new(
        FakeHosts::new([lan(2), lan(50), lan(254)]).with_latency(Latency::Descending {
            base: Duration::from_micros(200),
            max_key: 255,
        }),
    );
    let sweeper = offline_sweeper(scan_config(64, 1), hosts, Arc::new(FakePorts::new([])));

    let first = sweeper.scan_subnet(lan(1)).await.into_items();
    let second = sweeper.scan_subnet(lan(1)).await.into_items();

    assert_eq!(first, second);
    assert_eq!(addresses(&first), vec![lan(2), lan(50), lan(254)]);
}

/// Handshake liveness against a listener on loopback. Every other loopback
/// address refuses the connection, which also counts as alive.
#[tokio::test]
#[ignore]
async fn handshake_sweep_finds_loopback_listener() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut cfg = scan_config(64, 1);
    cfg.liveness = LivenessStrategy::Handshake;
    cfg.host_timeout = Duration::from_millis(300);

    let sweeper = Sweeper::new(cfg)
        .with_liveness(Arc::new(HandshakeProber::new(port)))
        .with_hardware_resolver(Arc::new(FixedNeighborCache(MacAddr::zero())))
        .with_hostname_resolver(None);

    let report = sweeper.scan_subnet(Ipv4Addr::LOCALHOST).await;

    assert!(report
        .items()
        .iter()
        .any(|d| d.address() == Ipv4Addr::LOCALHOST));
}
