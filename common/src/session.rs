use std::fmt;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant, SystemTime};

use crate::network::port::PortRange;
use crate::network::range;

/// What a sweep was pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepTarget {
    /// Host sweep over the /24 around `local`.
    Subnet { local: Ipv4Addr },
    /// Port sweep over `range` on `address`. `common_only` narrows the range
    /// to the common-port set.
    Ports {
        address: Ipv4Addr,
        range: PortRange,
        common_only: bool,
    },
}

impl fmt::Display for SweepTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepTarget::Subnet { local } => f.write_str(&range::subnet_label(*local)),
            SweepTarget::Ports {
                address,
                common_only: true,
                ..
            } => write!(f, "{address} (common ports)"),
            SweepTarget::Ports { address, range, .. } => write!(f, "{address} ports {range}"),
        }
    }
}

/// Transient context of a single sweep.
#[derive(Debug, Clone)]
pub struct ScanSession {
    target: SweepTarget,
    concurrency_limit: usize,
    probe_timeout: Duration,
    started_at: SystemTime,
    started: Instant,
    finished_at: Option<SystemTime>,
    elapsed: Option<Duration>,
}

impl ScanSession {
    pub fn start(target: SweepTarget, concurrency_limit: usize, probe_timeout: Duration) -> Self {
        Self {
            target,
            concurrency_limit,
            probe_timeout,
            started_at: SystemTime::now(),
            started: Instant::now(),
            finished_at: None,
            elapsed: None,
        }
    }

    /// Stamps the end of the sweep. Later calls keep the first stamp.
    pub fn finish(&mut self) {
        if self.elapsed.is_none() {
            self.elapsed = Some(self.started.elapsed());
            self.finished_at = Some(SystemTime::now());
        }
    }

    pub fn target(&self) -> &SweepTarget {
        &self.target
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<SystemTime> {
        self.finished_at
    }

    /// Duration of the sweep, or the time since it started while running.
    pub fn elapsed(&self) -> Duration {
        self.elapsed.unwrap_or_else(|| self.started.elapsed())
    }
}
