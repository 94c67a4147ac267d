use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use netsweep_common::scanning::LivenessProber;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Startup allowance for the `ping` process on top of the probe timeout.
pub const PING_GRACE: Duration = Duration::from_millis(250);

/// Liveness check through the platform `ping` utility: one echo request,
/// alive iff the process exits with status zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct PingProber;

/// When a running `ping` is killed.
///
/// Linux `ping -W` only takes whole seconds, so a sub-second probe timeout
/// would otherwise stretch to a full second per host.
pub fn kill_deadline(probe_timeout: Duration) -> Duration {
    probe_timeout + PING_GRACE
}

/// Arguments for a single echo request to `addr`.
pub fn ping_args(addr: Ipv4Addr, wait: Duration) -> Vec<String> {
    let target: String = addr.to_string();

    if cfg!(target_os = "windows") {
        let millis: u128 = wait.as_millis().max(1);
        vec!["-n".into(), "1".into(), "-w".into(), millis.to_string(), target]
    } else if cfg!(target_os = "macos") {
        let millis: u128 = wait.as_millis().max(1);
        vec!["-c".into(), "1".into(), "-W".into(), millis.to_string(), target]
    } else {
        let secs: u64 = wait.as_secs().max(1);
        vec!["-c".into(), "1".into(), "-W".into(), secs.to_string(), target]
    }
}

#[async_trait]
impl LivenessProber for PingProber {
    async fn probe(&self, addr: Ipv4Addr, probe_timeout: Duration) -> bool {
        let mut child = match Command::new("ping")
            .args(ping_args(addr, probe_timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                debug!("could not start ping for {addr}: {e}");
                return false;
            }
        };

        match timeout(kill_deadline(probe_timeout), child.wait()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                trace!("waiting on ping for {addr} failed: {e}");
                false
            }
            Err(_elapsed) => {
                trace!("ping for {addr} overran its deadline");
                let _ = child.kill().await;
                false
            }
        }
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
