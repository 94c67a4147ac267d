//! Capability seams for the sweep engine.
//!
//! Every platform-dependent concern sits behind one of these traits so the
//! coordinator never learns how an answer was obtained. Implementations must
//! be best-effort: they report a negative answer instead of an error.

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use pnet::util::MacAddr;

/// Decides whether a single address responds.
#[async_trait]
pub trait LivenessProber: Send + Sync {
    /// `true` only if the host answered within `timeout`.
    async fn probe(&self, addr: Ipv4Addr, timeout: Duration) -> bool;
}

/// Decides whether a single TCP endpoint accepts connections.
#[async_trait]
pub trait PortProber: Send + Sync {
    /// `true` only if the handshake completed within `timeout`.
    async fn probe(&self, addr: Ipv4Addr, port: u16, timeout: Duration) -> bool;
}

/// Looks up the link-layer address of a neighbour.
#[async_trait]
pub trait HardwareAddressResolver: Send + Sync {
    async fn resolve(&self, addr: Ipv4Addr) -> Option<MacAddr>;
}

/// Reverse-resolves an address to a name.
#[async_trait]
pub trait HostNameResolver: Send + Sync {
    async fn resolve(&self, addr: Ipv4Addr, timeout: Duration) -> Option<String>;
}
