//! Read-staging state machine shared by index and lane coordinators.
//!
//! Each tracked file is either idle or reading. Staging starts a read of
//! every file at once, and the entity publishes only after all of them
//! have completed. While any read is in flight further stage requests are
//! dropped (or, with [`BusyPolicy::Rearm`], remembered for one more cycle).

use serde::{Deserialize, Serialize};

/// What to do with a stage request that arrives mid-cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusyPolicy {
    /// Ignore it. The in-flight cycle's publish stands in for it.
    #[default]
    Drop,
    /// Run one more cycle right after the current one publishes.
    Rearm,
}

/// Answer to a stage request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageDecision {
    /// Every file is now reading; issue the reads.
    Issue,
    /// A cycle is in flight and the request was discarded.
    Dropped,
    /// A cycle is in flight; another will follow it.
    Deferred,
}

/// Result of finishing one file's read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Other files of the entity are still reading.
    Pending,
    /// Every read succeeded; payloads are in file order.
    Ready { payloads: Vec<Vec<u8>>, restage: bool },
    /// Every read finished but at least one failed. Nothing to publish.
    Failed { restage: bool },
}

#[derive(Debug, Default)]
struct Slot {
    reading: bool,
    payload: Option<Vec<u8>>,
}

#[derive(Debug)]
pub struct StagingState {
    slots: Vec<Slot>,
    policy: BusyPolicy,
    pending: bool,
    cycle_failed: bool,
    cycles: u64,
}

impl StagingState {
    pub fn new(files: usize, policy: BusyPolicy) -> Self {
        Self {
            slots: (0..files).map(|_| Slot::default()).collect(),
            policy,
            pending: false,
            cycle_failed: false,
            cycles: 0,
        }
    }

    /// Whether any file has a read in flight.
    pub fn is_reading(&self) -> bool {
        self.slots.iter().any(|slot| slot.reading)
    }

    /// All files idle and at least one full cycle published.
    pub fn is_ready(&self) -> bool {
        !self.is_reading() && self.cycles > 0
    }

    /// Number of cycles that ended in a publish.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Most recent successfully read payload of a file.
    pub fn payload(&self, slot: usize) -> Option<&[u8]> {
        self.slots.get(slot)?.payload.as_deref()
    }

    pub fn stage(&mut self) -> StageDecision {
        if self.is_reading() {
            return match self.policy {
                BusyPolicy::Drop => StageDecision::Dropped,
                BusyPolicy::Rearm => {
                    self.pending = true;
                    StageDecision::Deferred
                }
            };
        }

        for slot in &mut self.slots {
            slot.reading = true;
        }
        self.cycle_failed = false;
        StageDecision::Issue
    }

    /// Record a successful read of `slot`.
    pub fn complete(&mut self, slot: usize, payload: Vec<u8>) -> Completion {
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.reading = false;
            entry.payload = Some(payload);
        }
        self.finish()
    }

    /// Record a failed read of `slot`. Its previous payload is kept.
    pub fn fail(&mut self, slot: usize) -> Completion {
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.reading = false;
        }
        self.cycle_failed = true;
        self.finish()
    }

    fn finish(&mut self) -> Completion {
        if self.is_reading() {
            return Completion::Pending;
        }

        let restage = std::mem::take(&mut self.pending);
        if self.cycle_failed {
            return Completion::Failed { restage };
        }

        self.cycles += 1;
        Completion::Ready {
            payloads: self
                .slots
                .iter()
                .map(|slot| slot.payload.clone().unwrap_or_default())
                .collect(),
            restage,
        }
    }
}
