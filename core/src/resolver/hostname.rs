use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use netsweep_common::scanning::HostNameResolver;
use netsweep_protocols::dns;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::trace;

const DNS_RESPONSE_BUFFER: usize = 512;

/// Reverse lookup through the operating system resolver (hosts file, mDNS,
/// configured DNS servers).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostNameResolver;

#[async_trait]
impl HostNameResolver for SystemHostNameResolver {
    async fn resolve(&self, addr: Ipv4Addr, lookup_timeout: Duration) -> Option<String> {
        let ip: IpAddr = IpAddr::V4(addr);
        let lookup = tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip));

        match timeout(lookup_timeout, lookup).await {
            Ok(Ok(Ok(name))) => accept_name(name, addr),
            Ok(Ok(Err(e))) => {
                trace!("reverse lookup for {addr} failed: {e}");
                None
            }
            Ok(Err(e)) => {
                trace!("reverse lookup task for {addr} did not finish: {e}");
                None
            }
            Err(_elapsed) => {
                trace!("reverse lookup for {addr} timed out");
                None
            }
        }
    }
}

/// Reverse lookup with a PTR query sent straight to one DNS server.
#[derive(Debug, Clone, Copy)]
pub struct PtrHostNameResolver {
    server: SocketAddr,
}

impl PtrHostNameResolver {
    pub fn new(server: IpAddr) -> Self {
        Self::with_socket(SocketAddr::new(server, dns::DNS_PORT))
    }

    pub fn with_socket(server: SocketAddr) -> Self {
        Self { server }
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    async fn query(&self, addr: Ipv4Addr) -> anyhow::Result<String> {
        let bind_addr: SocketAddr = match self.server {
            SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket = UdpSocket::bind(bind_addr)
            .await
            .context("binding DNS query socket")?;
        socket
            .connect(self.server)
            .await
            .with_context(|| format!("connecting to DNS server {}", self.server))?;

        let id: u16 = rand::random::<u16>();
        let query: Vec<u8> = dns::create_ptr_packet(&IpAddr::V4(addr), id)?;
        socket.send(&query).await.context("sending PTR query")?;

        let mut buffer = [0u8; DNS_RESPONSE_BUFFER];
        loop {
            let len: usize = socket.recv(&mut buffer).await.context("receiving PTR response")?;
            match dns::get_hostname(&buffer[..len]) {
                Ok((response_id, hostname)) if response_id == id => return Ok(hostname),
                Ok((response_id, _)) => trace!("ignoring DNS response with id {response_id}"),
                Err(e) if is_answer_to(&buffer[..len], id) => return Err(e),
                Err(e) => trace!("ignoring unparsable DNS payload: {e}"),
            }
        }
    }
}

#[async_trait]
impl HostNameResolver for PtrHostNameResolver {
    async fn resolve(&self, addr: Ipv4Addr, lookup_timeout: Duration) -> Option<String> {
        match timeout(lookup_timeout, self.query(addr)).await {
            Ok(Ok(name)) => accept_name(name, addr),
            Ok(Err(e)) => {
                trace!("PTR lookup for {addr} failed: {e:#}");
                None
            }
            Err(_elapsed) => {
                trace!("PTR lookup for {addr} timed out");
                None
            }
        }
    }
}

/// An error payload carrying our transaction id ends the wait early.
fn is_answer_to(payload: &[u8], id: u16) -> bool {
    payload.len() >= 2 && u16::from_be_bytes([payload[0], payload[1]]) == id
}

/// Resolvers echo the address back when there is no name for it.
fn accept_name(name: String, addr: Ipv4Addr) -> Option<String> {
    let name: &str = name.trim().trim_end_matches('.');
    if name.is_empty() || name == addr.to_string() {
        return None;
    }
    Some(name.to_string())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
