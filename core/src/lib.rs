//! Sweep engine: the bounded-concurrency coordinator, result aggregation and
//! the concrete probes and resolvers behind the traits in `netsweep-common`.

pub mod aggregator;
pub mod network;
pub mod resolver;
pub mod scanner;
pub mod sweeper;
pub mod vendors;

pub use aggregator::{SweepReport, SweepSummary};
pub use scanner::{Coordinator, CoordinatorState, Progress, ProgressCallback};
pub use sweeper::Sweeper;
