//! Hardware address lookup through the operating system's neighbour cache.
//!
//! A successful liveness probe leaves an entry in the ARP cache, so nothing is
//! sent on the wire here. On Linux the kernel table is read directly; when it
//! has no usable entry, `ip neigh`, then `arp`, then (on Windows) `getmac` are
//! asked in turn.

use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use netsweep_common::network::mac;
use netsweep_common::scanning::HardwareAddressResolver;
use pnet::util::MacAddr;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::trace;

const PROC_ARP_TABLE: &str = "/proc/net/arp";

/// `ATF_COM`: the kernel has a complete entry for the neighbour.
const ATF_COMPLETE: u32 = 0x2;

pub struct NeighborCacheResolver {
    command_timeout: Duration,
}

impl NeighborCacheResolver {
    pub fn new(command_timeout: Duration) -> Self {
        Self { command_timeout }
    }

    async fn from_kernel_table(&self, addr: Ipv4Addr) -> Option<MacAddr> {
        if !cfg!(target_os = "linux") {
            return None;
        }
        let contents: String = tokio::fs::read_to_string(PROC_ARP_TABLE).await.ok()?;
        parse_arp_table(&contents, addr)
    }

    /// `ip neigh show <addr>` for systems where the kernel table is not
    /// readable (Android 10+) and `arp` is often missing.
    async fn from_ip_neighbour(&self, addr: Ipv4Addr) -> Option<MacAddr> {
        if !cfg!(any(target_os = "linux", target_os = "android")) {
            return None;
        }
        let target: String = addr.to_string();
        let stdout: String = self.run("ip", &["neigh", "show", &target]).await?;
        parse_ip_neighbour_output(&stdout, addr)
    }

    async fn from_arp_command(&self, addr: Ipv4Addr) -> Option<MacAddr> {
        let flag: &str = if cfg!(target_os = "windows") { "-a" } else { "-n" };
        let target: String = addr.to_string();
        let stdout: String = self.run("arp", &[flag, &target]).await?;
        parse_arp_output(&stdout, addr)
    }

    /// `getmac /v` lists local adapters; only useful when `addr` is one of ours.
    async fn from_getmac(&self, addr: Ipv4Addr) -> Option<MacAddr> {
        if !cfg!(target_os = "windows") {
            return None;
        }
        let stdout: String = self.run("getmac", &["/v"]).await?;
        parse_arp_output(&stdout, addr)
    }

    /// Stdout of `program`, or `None` if it cannot run in time.
    async fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        match timeout(self.command_timeout, output).await {
            Ok(Ok(output)) => Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            Ok(Err(e)) => {
                trace!("{program} could not run: {e}");
                None
            }
            Err(_elapsed) => {
                trace!("{program} {} timed out", args.join(" "));
                None
            }
        }
    }
}

#[async_trait]
impl HardwareAddressResolver for NeighborCacheResolver {
    async fn resolve(&self, addr: Ipv4Addr) -> Option<MacAddr> {
        if let Some(mac) = self.from_kernel_table(addr).await {
            return Some(mac);
        }
        if let Some(mac) = self.from_ip_neighbour(addr).await {
            return Some(mac);
        }
        if let Some(mac) = self.from_arp_command(addr).await {
            return Some(mac);
        }
        self.from_getmac(addr).await
    }
}

/// Looks `addr` up in the text of `/proc/net/arp`.
///
/// ```text
/// IP address       HW type     Flags       HW address            Mask     Device
/// 192.168.1.1      0x1         0x2         a4:2b:b0:11:22:33     *        wlan0
/// ```
pub fn parse_arp_table(contents: &str, addr: Ipv4Addr) -> Option<MacAddr> {
    let wanted: String = addr.to_string();

    contents.lines().skip(1).find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [ip, _hw_type, flags, hw_addr, ..] = fields.as_slice() else {
            return None;
        };
        if *ip != wanted {
            return None;
        }
        let flags: u32 = u32::from_str_radix(flags.trim_start_matches("0x"), 16).ok()?;
        if flags & ATF_COMPLETE == 0 {
            return None;
        }
        mac::parse_hardware_address(hw_addr)
    })
}

/// Extracts the hardware address of `addr` from `arp` output, in any of the
/// BSD, Linux net-tools or Windows layouts.
pub fn parse_arp_output(stdout: &str, addr: Ipv4Addr) -> Option<MacAddr> {
    let wanted: String = addr.to_string();

    stdout
        .lines()
        .filter(|line| {
            line.split_whitespace()
                .any(|token| token.trim_matches(|c| c == '(' || c == ')') == wanted)
        })
        .flat_map(str::split_whitespace)
        .find_map(mac::parse_hardware_address)
}

/// Reads the address after `lladdr` in `ip neigh show` output.
///
/// ```text
/// 192.168.1.1 dev wlan0 lladdr a4:2b:b0:11:22:33 REACHABLE
/// ```
pub fn parse_ip_neighbour_output(stdout: &str, addr: Ipv4Addr) -> Option<MacAddr> {
    let wanted: String = addr.to_string();

    stdout.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        if tokens.next()? != wanted {
            return None;
        }
        tokens
            .skip_while(|token| *token != "lladdr")
            .nth(1)
            .and_then(mac::parse_hardware_address)
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_TABLE: &str = "\
IP address       HW type     Flags       HW address            Mask     Device
192.168.1.1      0x1         0x2         a4:2b:b0:11:22:33     *        wlan0
192.168.1.40     0x1         0x0         00:00:00:00:00:00     *        wlan0
192.168.1.14     0x1         0x2         3c:22:fb:aa:bb:cc     *        wlan0
";

    #[test]
    fn kernel_table_entry_is_found() {
        let mac = parse_arp_table(PROC_TABLE, Ipv4Addr::new(192, 168, 1, 14));
        assert_eq!(mac, Some(MacAddr::new(0x3c, 0x22, 0xfb, 0xaa, 0xbb, 0xcc)));
    }

    #[test]
    fn incomplete_kernel_entries_are_ignored() {
        assert_eq!(parse_arp_table(PROC_TABLE, Ipv4Addr::new(192, 168, 1, 40)), None);
    }

    #[test]
    fn address_prefixes_do_not_match() {
        assert_eq!(parse_arp_table(PROC_TABLE, Ipv4Addr::new(192, 168, 1, 4)), None);
        assert_eq!(parse_arp_table("", Ipv4Addr::new(192, 168, 1, 1)), None);
    }

    #[test]
    fn bsd_style_output() {
        let out = "? (192.168.1.1) at a4:2b:b0:11:22:33 on en0 ifscope [ethernet]\n";
        assert_eq!(
            parse_arp_output(out, Ipv4Addr::new(192, 168, 1, 1)),
            Some(MacAddr::new(0xa4, 0x2b, 0xb0, 0x11, 0x22, 0x33))
        );
    }

    #[test]
    fn bsd_output_with_short_octets() {
        let out = "? (10.0.0.2) at 0:1b:2c:3:4:5 on en0 ifscope [ethernet]\n";
        assert_eq!(
            parse_arp_output(out, Ipv4Addr::new(10, 0, 0, 2)),
            Some(MacAddr::new(0x00, 0x1b, 0x2c, 0x03, 0x04, 0x05))
        );
    }

    #[test]
    fn net_tools_style_output() {
        let out = "\
Address                  HWtype  HWaddress           Flags Mask            Iface
192.168.1.14             ether   3c:22:fb:aa:bb:cc   C                     wlan0
";
        assert_eq!(
            parse_arp_output(out, Ipv4Addr::new(192, 168, 1, 14)),
            Some(MacAddr::new(0x3c, 0x22, 0xfb, 0xaa, 0xbb, 0xcc))
        );
    }

    #[test]
    fn windows_style_output() {
        let out = "\
Interface: 192.168.1.20 --- 0xb
  Internet Address      Physical Address      Type
  192.168.1.1           a4-2b-b0-11-22-33     dynamic
";
        assert_eq!(
            parse_arp_output(out, Ipv4Addr::new(192, 168, 1, 1)),
            Some(MacAddr::new(0xa4, 0x2b, 0xb0, 0x11, 0x22, 0x33))
        );
    }

    #[test]
    fn ip_neighbour_reachable_entry() {
        let out = "192.168.1.1 dev wlan0 lladdr a4:2b:b0:11:22:33 REACHABLE\n";
        assert_eq!(
            parse_ip_neighbour_output(out, Ipv4Addr::new(192, 168, 1, 1)),
            Some(MacAddr::new(0xa4, 0x2b, 0xb0, 0x11, 0x22, 0x33))
        );
    }

    #[test]
    fn ip_neighbour_failed_entry_has_no_address() {
        let out = "192.168.1.7 dev wlan0 FAILED\n";
        assert_eq!(parse_ip_neighbour_output(out, Ipv4Addr::new(192, 168, 1, 7)), None);
    }

    #[test]
    fn ip_neighbour_ignores_other_hosts() {
        let out = "\
192.168.1.10 dev wlan0 lladdr 3c:22:fb:aa:bb:cc STALE
192.168.1.1 dev wlan0 lladdr a4:2b:b0:11:22:33 DELAY
";
        assert_eq!(
            parse_ip_neighbour_output(out, Ipv4Addr::new(192, 168, 1, 1)),
            Some(MacAddr::new(0xa4, 0x2b, 0xb0, 0x11, 0x22, 0x33))
        );
        assert_eq!(parse_ip_neighbour_output(out, Ipv4Addr::new(192, 168, 1, 2)), None);
    }

    #[test]
    fn getmac_listing_matches_by_address() {
        let out = "\
Connection Name Network Adapter Physical Address    Transport Name
=============== =============== =================== ==========================
Ethernet        Intel(R) I219-V A4-2B-B0-11-22-33   \\Device\\Tcpip_{1234} 192.168.1.20
";
        assert_eq!(
            parse_arp_output(out, Ipv4Addr::new(192, 168, 1, 20)),
            Some(MacAddr::new(0xa4, 0x2b, 0xb0, 0x11, 0x22, 0x33))
        );
    }

    #[test]
    fn missing_entry_yields_nothing() {
        let out = "192.168.1.99 (192.168.1.99) -- no entry\n";
        assert_eq!(parse_arp_output(out, Ipv4Addr::new(192, 168, 1, 99)), None);
    }
}
