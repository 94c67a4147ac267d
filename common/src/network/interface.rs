//! Local interface inspection: which address a host sweep should start from.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use tracing::debug;

#[cfg(target_os = "linux")]
use linux_impl::{is_physical, is_wireless};
#[cfg(target_os = "macos")]
use macos_impl::{is_physical, is_wireless};
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
use fallback_impl::{is_physical, is_wireless};

/// Used when neither the interface table nor the routing trick yields an address.
pub const FALLBACK_LOCAL_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);

/// Public address the routing trick "connects" to. No packet is sent.
const ROUTE_PROBE_ADDR: Ipv4Addr = Ipv4Addr::new(8, 8, 8, 8);

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is operationally down.
    IsDown,
    /// Loopback or virtual interface.
    NotPhysical,
    NoMacAddress,
    /// Neighbour discovery needs broadcast.
    NotBroadcast,
    /// Point-to-point links (VPNs) have no LAN neighbourhood.
    IsPointToPoint,
    /// No private IPv4 address to sweep around.
    NoPrivateIpv4,
}

/// Where the local address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalAddrSource {
    Interface,
    Route,
    Fallback,
}

/// Private IPv4 network of the best viable LAN interface, wired first.
pub fn lan_network() -> Option<Ipv4Network> {
    let viable: Vec<NetworkInterface> = datalink::interfaces()
        .into_iter()
        .filter(|interface| match is_viable_lan_interface(interface, is_physical) {
            Ok(()) => true,
            Err(reason) => {
                debug!("skipping {}: {reason:?}", interface.name);
                false
            }
        })
        .collect();

    let interface: NetworkInterface = select_best_lan_interface(viable, is_wired)?;
    debug!("using {} for the local neighbourhood", interface.name);
    primary_private_ipv4(&interface)
}

/// Picks the address a host sweep should be centred on.
///
/// Tries the best LAN interface first, then the source address the kernel
/// would use to reach a public host, then [`FALLBACK_LOCAL_ADDR`].
pub fn detect_local_ipv4() -> (Ipv4Addr, LocalAddrSource) {
    if let Some(network) = lan_network() {
        return (network.ip(), LocalAddrSource::Interface);
    }

    match route_source_ipv4(ROUTE_PROBE_ADDR) {
        Some(addr) if !addr.is_unspecified() && !addr.is_loopback() => {
            (addr, LocalAddrSource::Route)
        }
        _ => (FALLBACK_LOCAL_ADDR, LocalAddrSource::Fallback),
    }
}

/// Returns usable interfaces, wired ones first.
pub fn get_prioritized_interfaces(limit: usize) -> Vec<NetworkInterface> {
    let mut interfaces: Vec<NetworkInterface> = datalink::interfaces()
        .into_iter()
        .filter(|i| i.is_up() && !i.is_loopback() && !i.ips.is_empty())
        .collect();

    interfaces.sort_by_key(|i| if is_wired(i) { 0 } else { 1 });
    interfaces.into_iter().take(limit).collect()
}

fn primary_private_ipv4(interface: &NetworkInterface) -> Option<Ipv4Network> {
    interface.ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) if v4.ip().is_private() => Some(*v4),
        _ => None,
    })
}

fn is_viable_lan_interface(
    interface: &NetworkInterface,
    is_physical: impl Fn(&NetworkInterface) -> bool,
) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() || !is_physical(interface) {
        return Err(ViabilityError::NotPhysical);
    }
    if interface.mac.is_none() {
        return Err(ViabilityError::NoMacAddress);
    }
    if !interface.is_broadcast() {
        return Err(ViabilityError::NotBroadcast);
    }
    if interface.is_point_to_point() {
        return Err(ViabilityError::IsPointToPoint);
    }
    if primary_private_ipv4(interface).is_none() {
        return Err(ViabilityError::NoPrivateIpv4);
    }
    Ok(())
}

fn select_best_lan_interface(
    interfaces: Vec<NetworkInterface>,
    is_wired: impl Fn(&NetworkInterface) -> bool,
) -> Option<NetworkInterface> {
    let wired = interfaces.iter().position(&is_wired).unwrap_or(0);
    interfaces.into_iter().nth(wired)
}

/// Source address the kernel would pick to reach `target`. Connecting a UDP
/// socket only sets its default peer.
fn route_source_ipv4(target: Ipv4Addr) -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((target, 80)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(addr) => Some(addr),
        IpAddr::V6(_) => None,
    }
}

fn is_wired(interface: &NetworkInterface) -> bool {
    is_physical(interface) && !is_wireless(interface)
}

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::path::Path;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/device", interface.name)).exists()
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/wireless", interface.name)).exists()
    }
}

#[cfg(target_os = "macos")]
mod macos_impl {
    use super::*;
    use std::collections::HashMap;
    use std::process::Command;
    use std::sync::OnceLock;

    /// Device name to "is Wi-Fi" for every hardware port `networksetup`
    /// knows. Listed once per process.
    fn hardware_ports() -> &'static HashMap<String, bool> {
        static PORTS: OnceLock<HashMap<String, bool>> = OnceLock::new();

        PORTS.get_or_init(|| {
            match Command::new("networksetup").arg("-listallhardwareports").output() {
                Ok(output) => parse_hardware_ports(&String::from_utf8_lossy(&output.stdout)),
                Err(e) => {
                    debug!("networksetup unavailable: {e}");
                    HashMap::new()
                }
            }
        })
    }

    /// Blocks look like `Hardware Port: Wi-Fi` followed by `Device: en0`.
    pub(super) fn parse_hardware_ports(listing: &str) -> HashMap<String, bool> {
        let mut ports = HashMap::new();
        let mut wireless = false;
        for line in listing.lines().map(str::trim) {
            if let Some(port) = line.strip_prefix("Hardware Port: ") {
                wireless = port.contains("Wi-Fi") || port.contains("AirPort");
            } else if let Some(device) = line.strip_prefix("Device: ") {
                ports.insert(device.to_string(), wireless);
            }
        }
        ports
    }

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        hardware_ports().contains_key(&interface.name)
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        hardware_ports()
            .get(&interface.name)
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod fallback_impl {
    use super::*;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        interface.mac.is_some()
    }

    pub fn is_wireless(_interface: &NetworkInterface) -> bool {
        false
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
