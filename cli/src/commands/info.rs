use colored::*;
use netsweep_common::config::{Config, LivenessStrategy, ScanConfig};
use netsweep_common::network::interface::{self, LocalAddrSource};
use netsweep_common::network::range;
use pnet::datalink::NetworkInterface;

use crate::mprint;
use crate::terminal::{colors, format, print};

const INTERFACE_LIMIT: usize = 8;

pub fn info(cfg: &Config) -> anyhow::Result<()> {
    print::print(&format!(
        "{}",
        "netsweep finds live hosts on the local subnet and the TCP ports they expose."
            .color(colors::TEXT_DEFAULT)
    ));
    mprint!();

    print::aligned_line("Version", env!("CARGO_PKG_VERSION"));

    print_local_network();
    print_sweep_settings(&cfg.scan);
    print_network_interfaces(&interface::get_prioritized_interfaces(INTERFACE_LIMIT));

    print::end_of_program();
    Ok(())
}

fn print_local_network() {
    print::header("local network", 0);
    let (local, source) = interface::detect_local_ipv4();

    let source: ColoredString = match source {
        LocalAddrSource::Interface => "LAN interface".green(),
        LocalAddrSource::Route => "default route".yellow(),
        LocalAddrSource::Fallback => "fallback, nothing detected".red(),
    };
    print::aligned_line("Local IPv4", local.to_string().color(colors::IPV4_ADDR));
    print::aligned_line("Detected", source);
    print::aligned_line("Subnet", range::subnet_label(local));
}

fn print_sweep_settings(scan: &ScanConfig) {
    print::header("sweep settings", 0);
    let liveness: &str = match scan.liveness {
        LivenessStrategy::Ping => "ping",
        LivenessStrategy::Handshake => "tcp handshake",
    };
    let hostnames: String = match (scan.no_dns, scan.dns_server) {
        (true, _) => "disabled".to_string(),
        (false, Some(server)) => format!("PTR via {server}"),
        (false, None) => "system resolver".to_string(),
    };

    print::aligned_line("Liveness", liveness);
    print::aligned_line("Hostnames", hostnames);
    print::aligned_line(
        "Host probe",
        format!(
            "{} at a time, {:.2}s timeout",
            scan.host_concurrency,
            scan.host_timeout.as_secs_f64()
        ),
    );
    print::aligned_line(
        "Port probe",
        format!(
            "{} at a time ({} for common ports), {:.2}s timeout",
            scan.port_concurrency,
            scan.common_port_concurrency,
            scan.port_timeout.as_secs_f64()
        ),
    );
}

fn print_network_interfaces(interfaces: &[NetworkInterface]) {
    print::header("network interfaces", 0);
    if interfaces.is_empty() {
        print::print_status("No usable interfaces found");
        return;
    }

    for (idx, intf) in interfaces.iter().enumerate() {
        print::tree_head(idx, &intf.name);
        print::as_tree_one_level(format::interface_to_details(intf));
        if idx + 1 != interfaces.len() {
            mprint!();
        }
    }
}
