use colored::*;
use netsweep_common::network::device::Device;
use netsweep_common::network::mac;
use netsweep_common::network::port::PortRecord;
use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::IpNetwork;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn device_to_details(device: &Device) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![(
        "IPv4".to_string(),
        device.address().to_string().color(colors::IPV4_ADDR),
    )];

    let mac_value: ColoredString = match device.hardware_address() {
        Some(mac_addr) => mac::format_hardware_address(mac_addr).color(colors::MAC_ADDR),
        None => mac::UNKNOWN.color(colors::UNKNOWN),
    };
    details.push(("MAC".to_string(), mac_value));

    if let Some(vendor) = device.vendor() {
        details.push(("Vendor".to_string(), vendor.color(colors::VENDOR)));
    }

    details.push(("Status".to_string(), device.status().to_string().green()));
    details
}

/// Title line of a device tree.
pub fn device_title(device: &Device) -> String {
    match device.hostname() {
        Some(hostname) => hostname.to_string(),
        None => format!("{} (no hostname)", device.address()),
    }
}

pub fn port_to_detail(record: &PortRecord) -> Detail {
    let service: ColoredString = match record.service() {
        mac::UNKNOWN => mac::UNKNOWN.color(colors::UNKNOWN),
        known => known.color(colors::SERVICE),
    };
    let value: ColoredString = format!("{} {}", "open".color(colors::PORT_OPEN), service).normal();
    (format!("{}/tcp", record.port()), value)
}

pub fn interface_to_details(intf: &NetworkInterface) -> Vec<Detail> {
    let mut details: Vec<Detail> = intf
        .ips
        .iter()
        .filter_map(|ip_network| match ip_network {
            IpNetwork::V4(net) => {
                let address: ColoredString = net.ip().to_string().color(colors::IPV4_ADDR);
                let prefix: ColoredString = net.prefix().to_string().color(colors::IPV4_PREFIX);
                let value: ColoredString = format!("{address}/{prefix}").color(colors::SEPARATOR);
                Some(("IPv4".to_string(), value))
            }
            IpNetwork::V6(_) => None,
        })
        .collect();

    if let Some(mac_addr) = intf.mac {
        details.push((
            "MAC".to_string(),
            mac::format_hardware_address(&mac_addr).color(colors::MAC_ADDR),
        ));
    }

    let state: ColoredString = if intf.is_up() {
        "up".green()
    } else {
        "down".red()
    };
    details.push(("State".to_string(), state));
    details
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
