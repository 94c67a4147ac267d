use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use async_trait::async_trait;
use netsweep_common::scanning::{LivenessProber, PortProber};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Port used by [`HandshakeProber`]. Any answer from it, even a refusal,
/// means a TCP stack is listening at the address.
pub const HANDSHAKE_PORT: u16 = 443;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Accepted,
    Refused,
    /// Unreachable, reset, or any other socket error.
    Failed,
    TimedOut,
}

pub async fn connect(addr: Ipv4Addr, port: u16, probe_timeout: Duration) -> ConnectOutcome {
    let socket_addr: SocketAddr = SocketAddr::V4(SocketAddrV4::new(addr, port));

    match timeout(probe_timeout, TcpStream::connect(socket_addr)).await {
        Ok(Ok(_stream)) => ConnectOutcome::Accepted,
        Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => ConnectOutcome::Refused,
        Ok(Err(e)) => {
            trace!("connect to {socket_addr} failed: {e}");
            ConnectOutcome::Failed
        }
        Err(_elapsed) => ConnectOutcome::TimedOut,
    }
}

/// Open-port check: only a completed handshake counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnectProber;

#[async_trait]
impl PortProber for TcpConnectProber {
    async fn probe(&self, addr: Ipv4Addr, port: u16, probe_timeout: Duration) -> bool {
        connect(addr, port, probe_timeout).await == ConnectOutcome::Accepted
    }
}

/// Liveness check that needs no privileges and no external binary.
#[derive(Debug, Clone, Copy)]
pub struct HandshakeProber {
    port: u16,
}

impl HandshakeProber {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

impl Default for HandshakeProber {
    fn default() -> Self {
        Self::new(HANDSHAKE_PORT)
    }
}

#[async_trait]
impl LivenessProber for HandshakeProber {
    async fn probe(&self, addr: Ipv4Addr, probe_timeout: Duration) -> bool {
        matches!(
            connect(addr, self.port, probe_timeout).await,
            ConnectOutcome::Accepted | ConnectOutcome::Refused
        )
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
