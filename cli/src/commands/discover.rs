use std::net::Ipv4Addr;
use std::path::Path;

use colored::*;
use netsweep_common::config::Config;
use netsweep_common::network::device::Device;
use netsweep_common::network::interface::{self, LocalAddrSource};
use netsweep_common::network::range;
use netsweep_common::{success, warn};
use netsweep_core::{SweepReport, Sweeper};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info_span};

use crate::export::{self, ExportFormat};
use crate::terminal::{colors, format, input::InputHandle, print, spinner};
use crate::mprint;

pub async fn discover(
    local: Option<Ipv4Addr>,
    cfg: &Config,
    cancel: &CancellationToken,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let local: Ipv4Addr = resolve_local(local, cfg);
    let report: SweepReport<Device> = sweep_subnet(local, cfg, cancel).await;

    discovery_ends(&report, cfg);

    if let Some(path) = output {
        let contents = export::render_devices(&report, local, ExportFormat::for_path(path))?;
        export::write(path, &contents)?;
        success!("Results saved to {}", path.display());
    }
    Ok(())
}

/// Runs a host sweep with a progress bar and the key listener attached.
pub async fn sweep_subnet(
    local: Ipv4Addr,
    cfg: &Config,
    cancel: &CancellationToken,
) -> SweepReport<Device> {
    let span = info_span!("discovery");
    let total: usize = range::subnet_candidates(local).count();
    let progress = spinner::attach(&span, total, "hosts");

    let _input: Option<InputHandle> = if cfg.disable_input {
        None
    } else {
        InputHandle::start(cancel.clone())
    };

    let sweeper = Sweeper::new(cfg.scan.clone())
        .with_cancellation(cancel.clone())
        .on_progress(progress);

    sweeper.scan_subnet(local).instrument(span).await
}

/// The explicit address wins; otherwise the best guess from the interfaces.
pub fn resolve_local(local: Option<Ipv4Addr>, cfg: &Config) -> Ipv4Addr {
    if let Some(local) = local {
        return local;
    }

    let (local, source) = interface::detect_local_ipv4();
    match source {
        LocalAddrSource::Fallback => {
            warn!("Could not detect a local address, assuming {local}");
        }
        _ if cfg.quiet == 0 => {
            print::aligned_line("Local IPv4", local.to_string().color(colors::IPV4_ADDR));
            print::aligned_line("Subnet", range::subnet_label(local));
        }
        _ => {}
    }
    local
}

fn discovery_ends(report: &SweepReport<Device>, cfg: &Config) {
    if report.summary().cancelled {
        warn!(
            "Sweep cancelled after {} of {} hosts, showing partial results",
            report.summary().dispatched,
            report.summary().candidates
        );
    }

    if report.is_empty() {
        no_hosts_found(cfg);
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("Network Discovery", cfg.quiet);
    print_devices(report.items(), cfg);
    print_summary(report, cfg);
}

fn no_hosts_found(cfg: &Config) {
    print::header("ZERO HOSTS DETECTED", cfg.quiet);
    if cfg.quiet < 2 {
        print::no_results();
    }
}

fn print_devices(devices: &[Device], cfg: &Config) {
    for (idx, device) in devices.iter().enumerate() {
        match cfg.quiet {
            2 => {}
            1 => print::tree_head(idx, &format!("{}", device.address())),
            _ => {
                print::tree_head(idx, &format::device_title(device));
                print::as_tree_one_level(format::device_to_details(device));
                if idx + 1 != devices.len() {
                    mprint!();
                }
            }
        }
    }
}

fn print_summary(report: &SweepReport<Device>, cfg: &Config) {
    let summary = report.summary();
    print::completion(
        "Discovery",
        summary.found,
        "active hosts",
        "identified",
        summary.elapsed,
        cfg.quiet,
    );
}
