use std::fmt;
use std::net::Ipv4Addr;

use pnet::util::MacAddr;

use super::mac::{self, UNKNOWN};

/// Liveness of a discovered device. Only responding hosts ever become a
/// [`Device`], so there is a single state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceStatus {
    #[default]
    Alive,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Alive => f.write_str("alive"),
        }
    }
}

/// A host that answered a liveness probe, enriched on a best-effort basis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    address: Ipv4Addr,
    hardware_address: Option<MacAddr>,
    hostname: Option<String>,
    vendor: Option<String>,
    status: DeviceStatus,
}

impl Device {
    pub fn new(address: Ipv4Addr) -> Self {
        Self {
            address,
            hardware_address: None,
            hostname: None,
            vendor: None,
            status: DeviceStatus::Alive,
        }
    }

    pub fn with_mac(mut self, mac: Option<MacAddr>) -> Self {
        self.hardware_address = mac;
        self
    }

    pub fn with_hostname(mut self, hostname: Option<String>) -> Self {
        self.hostname = hostname.filter(|name| !name.is_empty());
        self
    }

    pub fn with_vendor(mut self, vendor: Option<String>) -> Self {
        self.vendor = vendor;
        self
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Numeric form used for ordering.
    pub fn address_key(&self) -> u32 {
        u32::from(self.address)
    }

    pub fn hardware_address(&self) -> Option<&MacAddr> {
        self.hardware_address.as_ref()
    }

    pub fn hardware_address_label(&self) -> String {
        mac::hardware_address_label(self.hardware_address.as_ref())
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn hostname_label(&self) -> &str {
        self.hostname.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn vendor(&self) -> Option<&str> {
        self.vendor.as_deref()
    }

    pub fn status(&self) -> DeviceStatus {
        self.status
    }
}
