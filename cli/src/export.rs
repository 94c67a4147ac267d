//! Writes sweep reports to disk.
//!
//! A `.json` path gets a structured document; anything else gets the plain
//! text layout.

use std::fmt::Write as _;
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context;
use chrono::{DateTime, Local};
use netsweep_common::network::device::Device;
use netsweep_common::network::port::PortRecord;
use netsweep_common::network::range;
use netsweep_common::session::ScanSession;
use netsweep_core::SweepReport;
use serde::Serialize;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const RULE_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
}

impl ExportFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Text,
        }
    }
}

/// Relative paths land under `output_dir` when one is configured.
pub fn resolve_path(path: &Path, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

#[derive(Serialize)]
struct SessionExport {
    target: String,
    concurrency_limit: usize,
    probe_timeout_ms: u128,
    started_at: String,
    finished_at: Option<String>,
    elapsed_secs: f64,
    candidates: usize,
    dispatched: usize,
    failures: usize,
    cancelled: bool,
}

#[derive(Serialize)]
struct DeviceExport<'a> {
    address: Ipv4Addr,
    hardware_address: String,
    hostname: &'a str,
    vendor: Option<&'a str>,
    status: String,
}

#[derive(Serialize)]
struct PortExport {
    port: u16,
    service: &'static str,
    state: &'static str,
}

#[derive(Serialize)]
struct DiscoveryExport<'a> {
    session: SessionExport,
    local_address: Ipv4Addr,
    network_range: String,
    devices: Vec<DeviceExport<'a>>,
}

#[derive(Serialize)]
struct PortScanExport {
    session: SessionExport,
    address: Ipv4Addr,
    open_ports: Vec<PortExport>,
}

fn timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(TIME_FORMAT).to_string()
}

fn session_export<T>(report: &SweepReport<T>) -> SessionExport {
    let session: &ScanSession = report.session();
    let summary = report.summary();
    SessionExport {
        target: session.target().to_string(),
        concurrency_limit: session.concurrency_limit(),
        probe_timeout_ms: session.probe_timeout().as_millis(),
        started_at: timestamp(session.started_at()),
        finished_at: session.finished_at().map(timestamp),
        elapsed_secs: summary.elapsed.as_secs_f64(),
        candidates: summary.candidates,
        dispatched: summary.dispatched,
        failures: summary.failures,
        cancelled: summary.cancelled,
    }
}

pub fn render_devices(
    report: &SweepReport<Device>,
    local: Ipv4Addr,
    format: ExportFormat,
) -> anyhow::Result<String> {
    match format {
        ExportFormat::Json => {
            let doc = DiscoveryExport {
                session: session_export(report),
                local_address: local,
                network_range: range::subnet_label(local),
                devices: report
                    .items()
                    .iter()
                    .map(|device| DeviceExport {
                        address: device.address(),
                        hardware_address: device.hardware_address_label(),
                        hostname: device.hostname_label(),
                        vendor: device.vendor(),
                        status: device.status().to_string(),
                    })
                    .collect(),
            };
            serde_json::to_string_pretty(&doc).context("serializing discovery results")
        }
        ExportFormat::Text => {
            let mut out = String::new();
            writeln!(out, "Network Scan Results")?;
            writeln!(out, "===================")?;
            writeln!(out, "Scan Time: {}", timestamp(report.session().started_at()))?;
            writeln!(out, "Network Range: {}", range::subnet_label(local))?;
            writeln!(out, "Local IP: {local}")?;
            writeln!(out)?;
            for device in report.items() {
                writeln!(out, "IP: {}", device.address())?;
                writeln!(out, "MAC: {}", device.hardware_address_label())?;
                writeln!(out, "Hostname: {}", device.hostname_label())?;
                if let Some(vendor) = device.vendor() {
                    writeln!(out, "Vendor: {vendor}")?;
                }
                writeln!(out, "Status: {}", device.status())?;
                writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
            }
            Ok(out)
        }
    }
}

pub fn render_ports(
    report: &SweepReport<PortRecord>,
    address: Ipv4Addr,
    format: ExportFormat,
) -> anyhow::Result<String> {
    match format {
        ExportFormat::Json => {
            let doc = PortScanExport {
                session: session_export(report),
                address,
                open_ports: report
                    .items()
                    .iter()
                    .map(|record| PortExport {
                        port: record.port(),
                        service: record.service(),
                        state: "open",
                    })
                    .collect(),
            };
            serde_json::to_string_pretty(&doc).context("serializing port scan results")
        }
        ExportFormat::Text => {
            let mut out = String::new();
            writeln!(out, "Port Scan Results")?;
            writeln!(out, "================")?;
            writeln!(out, "Target IP: {address}")?;
            writeln!(out, "Scan Time: {}", timestamp(report.session().started_at()))?;
            writeln!(
                out,
                "Scan Duration: {:.2} seconds",
                report.summary().elapsed.as_secs_f64()
            )?;
            writeln!(out)?;
            writeln!(out, "Open Ports ({}):", report.len())?;
            writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
            for record in report.items() {
                writeln!(out, "Port {}: {} (OPEN)", record.port(), record.service())?;
            }
            Ok(out)
        }
    }
}

/// Writes `contents` to `path`, creating missing parent directories.
pub fn write(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("writing results to {}", path.display()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
