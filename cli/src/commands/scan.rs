use std::net::Ipv4Addr;
use std::path::Path;

use anyhow::bail;
use netsweep_common::config::Config;
use netsweep_common::network::port::{COMMON_PORTS, PortRange, PortRecord};
use netsweep_common::network::range;
use netsweep_common::{success, warn};
use netsweep_core::{SweepReport, Sweeper};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info_span};

use super::ScanTarget;
use super::discover;
use crate::export::{self, ExportFormat};
use crate::terminal::{format, input::InputHandle, print, spinner};
use crate::mprint;

pub async fn scan(
    target: ScanTarget,
    ports: Option<PortRange>,
    local: Option<Ipv4Addr>,
    cfg: &Config,
    cancel: &CancellationToken,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let address: Ipv4Addr = select_target(target, local, cfg, cancel).await?;
    if cancel.is_cancelled() {
        bail!("cancelled before scanning {address}");
    }

    let report: SweepReport<PortRecord> = sweep_ports(address, ports, cfg, cancel).await?;

    scan_ends(&report, address, cfg);

    if let Some(path) = output {
        let contents = export::render_ports(&report, address, ExportFormat::for_path(path))?;
        export::write(path, &contents)?;
        success!("Results saved to {}", path.display());
    }
    Ok(())
}

/// Literal addresses are used as given; an index picks from a fresh host
/// sweep.
async fn select_target(
    target: ScanTarget,
    local: Option<Ipv4Addr>,
    cfg: &Config,
    cancel: &CancellationToken,
) -> anyhow::Result<Ipv4Addr> {
    let idx: usize = match target {
        ScanTarget::Address(address) => return Ok(address),
        ScanTarget::Index(idx) => idx,
    };

    print::header("selecting target", cfg.quiet);
    let local: Ipv4Addr = discover::resolve_local(local, cfg);
    let devices = discover::sweep_subnet(local, cfg, cancel).await.into_items();

    let Some(device) = devices.get(idx - 1) else {
        bail!(
            "no device #{idx}: the sweep of {} found {} host(s)",
            range::subnet_label(local),
            devices.len()
        );
    };

    if cfg.quiet == 0 {
        print::tree_head(idx - 1, &format::device_title(device));
        print::as_tree_one_level(format::device_to_details(device));
    }
    Ok(device.address())
}

async fn sweep_ports(
    address: Ipv4Addr,
    ports: Option<PortRange>,
    cfg: &Config,
    cancel: &CancellationToken,
) -> anyhow::Result<SweepReport<PortRecord>> {
    let span = info_span!("port_scan");
    let total: usize = match ports {
        Some(ports) => ports.len(),
        None => COMMON_PORTS.len(),
    };
    let progress = spinner::attach(&span, total, "open ports");

    let _input: Option<InputHandle> = if cfg.disable_input {
        None
    } else {
        InputHandle::start(cancel.clone())
    };

    let sweeper = Sweeper::new(cfg.scan.clone())
        .with_cancellation(cancel.clone())
        .on_progress(progress);

    let report = match ports {
        Some(ports) => {
            sweeper
                .scan_port_range(address, ports.low(), ports.high())
                .instrument(span)
                .await?
        }
        None => sweeper.scan_common_ports(address).instrument(span).await,
    };
    Ok(report)
}

fn scan_ends(report: &SweepReport<PortRecord>, address: Ipv4Addr, cfg: &Config) {
    if report.summary().cancelled {
        warn!(
            "Scan cancelled after {} of {} ports, showing partial results",
            report.summary().dispatched,
            report.summary().candidates
        );
    }

    if report.is_empty() {
        print::header("NO OPEN PORTS", cfg.quiet);
        if cfg.quiet < 2 {
            print::no_results();
        }
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header(&format!("open ports on {address}"), cfg.quiet);
    match cfg.quiet {
        2 => {}
        _ => print::as_tree_one_level(report.items().iter().map(format::port_to_detail).collect()),
    }

    let summary = report.summary();
    print::completion(
        "Scan",
        summary.found,
        "open ports",
        "found",
        summary.elapsed,
        cfg.quiet,
    );
}
