use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use netsweep_common::error::ScanError;
use netsweep_common::network::port::{PortRecord, COMMON_PORTS};
use netsweep_core::Sweeper;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::support::{lan, offline_sweeper, scan_config, FakeHosts, FakePorts, Latency};

fn ports(records: &[PortRecord]) -> Vec<u16> {
    records.iter().map(PortRecord::port).collect()
}

fn port_sweeper(cfg_limit: usize, prober: Arc<FakePorts>) -> Sweeper {
    offline_sweeper(scan_config(1, cfg_limit), Arc::new(FakeHosts::new([])), prober)
}

#[tokio::test]
async fn only_open_ports_inside_the_range_are_reported() {
    let prober = Arc::new(FakePorts::new([80, 443, 8080]));
    let sweeper = port_sweeper(16, prober.clone());

    let report = sweeper.scan_port_range(lan(20), 20, 85).await.unwrap();

    assert_eq!(ports(report.items()), vec![80]);
    assert_eq!(report.items()[0].service(), "HTTP");
    assert_eq!(prober.gauge.probes(), 66);
    assert_eq!(report.summary().negatives, 65);
}

#[tokio::test]
async fn results_are_sorted_whatever_the_completion_order() {
    let prober = Arc::new(FakePorts::new([85, 22, 53, 21]).with_latency(Latency::Descending {
        base: Duration::from_millis(1),
        max_key: 100,
    }));
    let sweeper = port_sweeper(100, prober);

    let report = sweeper.scan_port_range(lan(20), 20, 85).await.unwrap();

    assert_eq!(ports(report.items()), vec![21, 22, 53, 85]);
}

#[tokio::test]
async fn single_port_range_hits_a_real_listener() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut cfg = scan_config(1, 4);
    cfg.port_timeout = Duration::from_secs(2);
    let sweeper = Sweeper::new(cfg).with_hostname_resolver(None);

    let report = sweeper
        .scan_port_range(Ipv4Addr::LOCALHOST, port, port)
        .await
        .unwrap();

    assert_eq!(ports(report.items()), vec![port]);
    assert_eq!(report.summary().dispatched, 1);
}

#[tokio::test]
async fn invalid_bounds_are_rejected_before_any_probe() {
    let prober = Arc::new(FakePorts::new([80]));
    let sweeper = port_sweeper(16, prober.clone());

    let reversed = sweeper.scan_port_range(lan(20), 100, 50).await;
    assert_eq!(
        reversed.unwrap_err(),
        ScanError::InvalidRange { low: 100, high: 50 }
    );
    assert!(sweeper.scan_port_range(lan(20), 0, 80).await.is_err());
    assert!(sweeper.scan_port_range(lan(20), 0, 0).await.is_err());

    assert_eq!(prober.gauge.probes(), 0);
}

#[tokio::test]
async fn top_of_the_port_space_is_accepted() {
    let prober = Arc::new(FakePorts::new([65535]));
    let sweeper = port_sweeper(16, prober.clone());

    let report = sweeper.scan_port_range(lan(20), 65530, 65535).await.unwrap();

    assert_eq!(ports(report.items()), vec![65535]);
    assert_eq!(prober.gauge.probes(), 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_probes_never_exceed_the_limit() {
    let prober = Arc::new(
        FakePorts::new((1..=300).filter(|p| p % 7 == 0))
            .with_latency(Latency::Fixed(Duration::from_millis(3))),
    );
    let sweeper = port_sweeper(12, prober.clone());

    let report = sweeper.scan_port_range(lan(20), 1, 300).await.unwrap();

    assert_eq!(report.len(), 42);
    assert_eq!(prober.gauge.probes(), 300);
    assert!(prober.gauge.peak() <= 12, "peak was {}", prober.gauge.peak());
}

#[tokio::test]
async fn common_ports_probe_exactly_the_curated_set() {
    let prober = Arc::new(FakePorts::new([22, 443, 5000]));
    let sweeper = port_sweeper(100, prober.clone());

    let report = sweeper.scan_common_ports(lan(20)).await;

    assert_eq!(prober.gauge.probes(), COMMON_PORTS.len());
    assert_eq!(report.summary().candidates, COMMON_PORTS.len());
    assert_eq!(ports(report.items()), vec![22, 443]);
}

#[tokio::test]
async fn repeated_scans_agree() {
    let prober = Arc::new(FakePorts::new([25, 110, 143]).with_latency(Latency::Descending {
        base: Duration::from_micros(100),
        max_key: 200,
    }));
    let sweeper = port_sweeper(32, prober);

    let first = sweeper.scan_port_range(lan(20), 1, 200).await.unwrap().into_items();
    let second = sweeper.scan_port_range(lan(20), 1, 200).await.unwrap().into_items();

    assert_eq!(first, second);
}

#[tokio::test]
async fn cancelled_scan_returns_a_subset() {
    let cancel = CancellationToken::new();
    let prober = Arc::new(FakePorts::new(1..=1000).cancel_after(25, cancel.clone()));
    let sweeper = port_sweeper(1, prober.clone()).with_cancellation(cancel);

    let report = sweeper.scan_port_range(lan(20), 1, 1000).await.unwrap();

    let summary = report.summary();
    assert!(summary.cancelled);
    assert_eq!(summary.candidates, 1000);
    assert_eq!(summary.dispatched, 25);
    assert_eq!(prober.gauge.probes(), 25);
    assert!(report.len() <= 25);
    assert!(report.items().iter().all(|r| (1..=25).contains(&r.port())));
}
