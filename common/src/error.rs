use thiserror::Error;

/// The only failure that crosses the core boundary.
///
/// Probe and resolution failures are absorbed where they happen and show up
/// as "no entry" in the sweep output instead.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    #[error("invalid port range {low}-{high}: ports must satisfy 1 <= low <= high <= 65535")]
    InvalidRange { low: u32, high: u32 },
}
