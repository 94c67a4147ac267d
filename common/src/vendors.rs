use pnet::util::MacAddr;

/// Manufacturer lookup by OUI; `None` when the prefix is unknown.
pub trait VendorRepository: Send + Sync {
    fn get_vendor(&self, mac_addr: MacAddr) -> Option<String>;
}
