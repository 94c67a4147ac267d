use pnet::util::MacAddr;

pub const UNKNOWN: &str = "Unknown";

/// Parses a hardware address as printed by neighbour tables and `arp`.
///
/// Accepts `:` or `-` separators and single-digit octets (BSD `arp` prints
/// `0:1b:63:..`). All-zero addresses are incomplete entries and yield `None`.
pub fn parse_hardware_address(raw: &str) -> Option<MacAddr> {
    let separator: char = if raw.contains('-') { '-' } else { ':' };
    let octets: Vec<u8> = raw
        .trim()
        .split(separator)
        .map(|part| {
            if part.is_empty() || part.len() > 2 {
                return None;
            }
            u8::from_str_radix(part, 16).ok()
        })
        .collect::<Option<Vec<u8>>>()?;

    let [a, b, c, d, e, f] = octets.as_slice() else {
        return None;
    };
    let mac = MacAddr::new(*a, *b, *c, *d, *e, *f);
    (mac != MacAddr::zero()).then_some(mac)
}

/// Canonical display form: uppercase and colon separated.
pub fn format_hardware_address(mac: &MacAddr) -> String {
    mac.to_string().to_uppercase()
}

/// Display form for an optional address, falling back to "Unknown".
pub fn hardware_address_label(mac: Option<&MacAddr>) -> String {
    mac.map(format_hardware_address)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
