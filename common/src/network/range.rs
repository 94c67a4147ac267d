//! Address space enumeration for a local /24 neighbourhood.

use std::net::Ipv4Addr;

pub const FIRST_HOST_OCTET: u8 = 1;
pub const LAST_HOST_OCTET: u8 = 254;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    /// The host range of the /24 that `local` lives in (`.1` through `.254`).
    pub fn neighbourhood(local: Ipv4Addr) -> Self {
        let [a, b, c, _] = local.octets();
        Self::new(
            Ipv4Addr::new(a, b, c, FIRST_HOST_OCTET),
            Ipv4Addr::new(a, b, c, LAST_HOST_OCTET),
        )
    }

    pub fn to_iter(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(Ipv4Addr::from)
    }

    pub fn len(&self) -> usize {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        end.checked_sub(start).map_or(0, |span| span as usize + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered candidate addresses for a host sweep around `local`.
pub fn subnet_candidates(local: Ipv4Addr) -> impl Iterator<Item = Ipv4Addr> {
    Ipv4Range::neighbourhood(local).to_iter()
}

/// `a.b.c.0/24` label for the neighbourhood of `local`.
pub fn subnet_label(local: Ipv4Addr) -> String {
    let [a, b, c, _] = local.octets();
    format!("{a}.{b}.{c}.0/24")
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

    #[test]
    fn candidates_cover_host_octets_in_order() {
        let local = Ipv4Addr::new(192, 168, 7, 42);
        let candidates: Vec<Ipv4Addr> = subnet_candidates(local).collect();

        assert_eq!(candidates.len(), 254);
        assert_eq!(candidates[0], Ipv4Addr::new(192, 168, 7, 1));
        assert_eq!(candidates[253], Ipv4Addr::new(192, 168, 7, 254));
        assert!(candidates.windows(2).all(|w| u32::from(w[0]) < u32::from(w[1])));
        assert!(candidates.iter().all(|ip| ip.octets()[..3] == [192, 168, 7]));
    }

    #[test]
    fn candidates_are_a_pure_function_of_input() {
        let local = Ipv4Addr::new(10, 0, 0, 1);
        let first: Vec<Ipv4Addr> = subnet_candidates(local).collect();
        let second: Vec<Ipv4Addr> = subnet_candidates(local).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn host_octet_of_local_address_is_ignored() {
        let a: Vec<Ipv4Addr> = subnet_candidates(Ipv4Addr::new(10, 1, 2, 3)).collect();
        let b: Vec<Ipv4Addr> = subnet_candidates(Ipv4Addr::new(10, 1, 2, 250)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn range_len_handles_inverted_bounds() {
        let range = Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 1));
        assert!(range.is_empty());
        assert_eq!(Ipv4Range::neighbourhood(Ipv4Addr::new(10, 0, 0, 9)).len(), 254);
    }

    #[test]
    fn subnet_label_zeroes_host_octet() {
        assert_eq!(subnet_label(Ipv4Addr::new(172, 16, 4, 99)), "172.16.4.0/24");
    }
}
