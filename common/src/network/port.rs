//! Open-port records, the service table and port range validation.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ScanError;
use crate::network::mac::UNKNOWN;

/// The quick-discovery set probed by a common-port sweep.
pub const COMMON_PORTS: [u16; 20] = [
    21, 22, 23, 25, 53, 80, 110, 111, 135, 139, 143, 443, 993, 995, 1723, 3306, 3389, 5900, 8080,
    8443,
];

/// Display label for a well-known port, `None` outside the table.
pub fn service_name(port: u16) -> Option<&'static str> {
    let name = match port {
        21 => "FTP",
        22 => "SSH",
        23 => "Telnet",
        25 => "SMTP",
        53 => "DNS",
        80 => "HTTP",
        110 => "POP3",
        111 => "RPCBind",
        135 => "MS RPC",
        139 => "NetBIOS",
        143 => "IMAP",
        443 => "HTTPS",
        993 => "IMAPS",
        995 => "POP3S",
        1723 => "PPTP",
        3306 => "MySQL",
        3389 => "RDP",
        5900 => "VNC",
        8080 => "HTTP-Alt",
        8443 => "HTTPS-Alt",
        _ => return None,
    };
    Some(name)
}

pub fn is_common_port(port: u16) -> bool {
    COMMON_PORTS.contains(&port)
}

/// A TCP port confirmed open on the sweep target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRecord {
    port: u16,
    service: &'static str,
}

impl PortRecord {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            service: service_name(port).unwrap_or(UNKNOWN),
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn service(&self) -> &'static str {
        self.service
    }
}

/// An inclusive, validated port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    low: u16,
    high: u16,
}

impl PortRange {
    /// Accepts `1 <= low <= high <= 65535`.
    pub fn new(low: u16, high: u16) -> Result<Self, ScanError> {
        Self::from_bounds(u32::from(low), u32::from(high))
    }

    /// Same check on wider integers, for bounds that come from user input.
    pub fn from_bounds(low: u32, high: u32) -> Result<Self, ScanError> {
        let valid = (1..=u32::from(u16::MAX)).contains(&low)
            && (1..=u32::from(u16::MAX)).contains(&high)
            && low <= high;
        if !valid {
            return Err(ScanError::InvalidRange { low, high });
        }
        Ok(Self {
            low: low as u16,
            high: high as u16,
        })
    }

    /// Smallest range that covers [`COMMON_PORTS`].
    pub fn common() -> Self {
        let low = COMMON_PORTS.iter().copied().min().unwrap_or(1);
        let high = COMMON_PORTS.iter().copied().max().unwrap_or(u16::MAX);
        Self { low, high }
    }

    pub fn low(&self) -> u16 {
        self.low
    }

    pub fn high(&self) -> u16 {
        self.high
    }

    pub fn len(&self) -> usize {
        usize::from(self.high - self.low) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> RangeInclusive<u16> {
        self.low..=self.high
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

impl FromStr for PortRange {
    type Err = String;

    /// Parses `low-high` or a single port.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid port '{part}': {e}"))
        };

        let (low, high) = match s.split_once('-') {
            Some((low, high)) => (parse(low)?, parse(high)?),
            None => {
                let port = parse(s)?;
                (port, port)
            }
        };

        PortRange::from_bounds(low, high).map_err(|e| e.to_string())
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
