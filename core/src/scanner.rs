//! The bounded-concurrency **coordinator** shared by every sweep.
//!
//! A sweep is a finite set of candidates (addresses or ports) and a probe
//! function. The coordinator hands each candidate to exactly one task, never
//! lets more than `limit` of them run at once, and collects what they report
//! through a channel. It knows nothing about networks: host sweeps and port
//! sweeps differ only in the candidates and the probe they pass in.
//!
//! **Lifecycle:**
//! `Idle → Running → Draining → Complete`, or `Cancelled` when the
//! cancellation token fires before every candidate was dispatched. The token
//! is checked before each task starts, including while waiting for a free
//! slot, so no task starts once cancellation is observed. Tasks that are
//! already running finish on their own; their probes are timeout-bounded.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Where a coordinator is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    /// Dispatching tasks.
    Running,
    /// No new tasks; waiting for the dispatched ones.
    Draining,
    Complete,
    Cancelled,
}

/// Running totals reported after every task outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub found: usize,
}

pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Everything the coordinator learned from one run.
#[derive(Debug)]
pub struct Dispatch<T> {
    /// Positive results in completion order.
    pub results: Vec<T>,
    pub dispatched: usize,
    /// Probes that ran and came back empty.
    pub negatives: usize,
    /// Tasks that panicked or were aborted. Each counts as a negative for its
    /// own candidate and nothing else.
    pub failures: usize,
    pub state: CoordinatorState,
}

impl<T> Dispatch<T> {
    pub fn cancelled(&self) -> bool {
        self.state == CoordinatorState::Cancelled
    }
}

pub struct Coordinator {
    limit: usize,
    cancel: CancellationToken,
    state: CoordinatorState,
    on_progress: Option<ProgressCallback>,
}

impl Coordinator {
    /// A `limit` of zero is raised to one.
    pub fn new(limit: usize, cancel: CancellationToken) -> Self {
        Self {
            limit: limit.max(1),
            cancel,
            state: CoordinatorState::Idle,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: Option<ProgressCallback>) -> Self {
        self.on_progress = on_progress;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Runs `probe` once per candidate and returns when every dispatched task
    /// has reported.
    ///
    /// `probe` is called on the dispatching task right before the spawned
    /// task starts; the future it returns is what occupies the slot. A
    /// `None` output is a negative result.
    pub async fn run<C, T, F, Fut>(
        &mut self,
        candidates: impl IntoIterator<Item = C>,
        probe: F,
    ) -> Dispatch<T>
    where
        T: Send + 'static,
        F: Fn(C) -> Fut,
        Fut: Future<Output = Option<T>> + Send + 'static,
    {
        let gate: Arc<Semaphore> = Arc::new(Semaphore::new(self.limit));
        let (sink_tx, mut sink_rx) = mpsc::unbounded_channel::<Option<T>>();
        let mut tasks: JoinSet<()> = JoinSet::new();
        let mut tally = Tally::default();
        let mut dispatched: usize = 0;
        let mut cancelled: bool = false;

        self.state = CoordinatorState::Running;

        for candidate in candidates {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                permit = gate.clone().acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                cancelled = true;
                break;
            };
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let tx = sink_tx.clone();
            let task = probe(candidate);
            tasks.spawn(async move {
                let outcome: Option<T> = task.await;
                let _ = tx.send(outcome);
                drop(permit);
            });
            dispatched += 1;

            while let Ok(outcome) = sink_rx.try_recv() {
                tally.record(outcome, &self.on_progress);
            }
        }
        drop(sink_tx);

        if cancelled {
            debug!("cancellation observed after {dispatched} dispatched tasks");
        }
        self.state = CoordinatorState::Draining;

        while let Some(outcome) = sink_rx.recv().await {
            tally.record(outcome, &self.on_progress);
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!("probe task failed to complete: {e}");
            }
        }

        let reported: usize = tally.results.len() + tally.negatives;
        let failures: usize = dispatched.saturating_sub(reported);

        self.state = if cancelled {
            CoordinatorState::Cancelled
        } else {
            CoordinatorState::Complete
        };

        Dispatch {
            results: tally.results,
            dispatched,
            negatives: tally.negatives + failures,
            failures,
            state: self.state,
        }
    }
}

struct Tally<T> {
    results: Vec<T>,
    negatives: usize,
}

impl<T> Default for Tally<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            negatives: 0,
        }
    }
}

impl<T> Tally<T> {
    fn record(&mut self, outcome: Option<T>, on_progress: &Option<ProgressCallback>) {
        match outcome {
            Some(result) => self.results.push(result),
            None => self.negatives += 1,
        }
        if let Some(callback) = on_progress {
            callback(Progress {
                completed: self.results.len() + self.negatives,
                found: self.results.len(),
            });
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
