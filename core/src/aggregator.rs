//! Turns the unordered output of a sweep into the report callers see.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::time::Duration;

use netsweep_common::network::device::Device;
use netsweep_common::network::port::PortRecord;
use netsweep_common::session::ScanSession;

use crate::scanner::Dispatch;

/// An entry of a sweep result with a natural sort key.
pub trait SweepItem {
    type Key: Ord + Copy;

    fn sort_key(&self) -> Self::Key;
}

impl SweepItem for Device {
    type Key = u32;

    fn sort_key(&self) -> u32 {
        self.address_key()
    }
}

impl SweepItem for PortRecord {
    type Key = u16;

    fn sort_key(&self) -> u16 {
        self.port()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub found: usize,
    pub candidates: usize,
    pub dispatched: usize,
    pub negatives: usize,
    pub failures: usize,
    /// Results dropped because their key was already present.
    pub duplicates: usize,
    pub elapsed: Duration,
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct SweepReport<T> {
    items: Vec<T>,
    session: ScanSession,
    summary: SweepSummary,
}

impl<T> SweepReport<T> {
    /// Ascending by key, without duplicates.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn summary(&self) -> &SweepSummary {
        &self.summary
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

pub struct Aggregator<T: SweepItem> {
    entries: BTreeMap<T::Key, T>,
    duplicates: usize,
}

impl<T: SweepItem> Default for Aggregator<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            duplicates: 0,
        }
    }
}

impl<T: SweepItem> Aggregator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first item seen for a key wins.
    pub fn push(&mut self, item: T) {
        match self.entries.entry(item.sort_key()) {
            Entry::Vacant(slot) => {
                slot.insert(item);
            }
            Entry::Occupied(_) => self.duplicates += 1,
        }
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.push(item);
        }
    }

    /// Closes the session and packages everything collected so far.
    pub fn finish(
        mut self,
        mut session: ScanSession,
        candidates: usize,
        dispatch: Dispatch<T>,
    ) -> SweepReport<T> {
        let cancelled: bool = dispatch.cancelled();
        let (dispatched, negatives, failures) =
            (dispatch.dispatched, dispatch.negatives, dispatch.failures);
        self.extend(dispatch.results);

        session.finish();
        let items: Vec<T> = self.entries.into_values().collect();

        SweepReport {
            summary: SweepSummary {
                found: items.len(),
                candidates,
                dispatched,
                negatives,
                failures,
                duplicates: self.duplicates,
                elapsed: session.elapsed(),
                cancelled,
            },
            items,
            session,
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
