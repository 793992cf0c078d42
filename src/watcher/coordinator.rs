//! Per-entity staging task.
//!
//! A coordinator owns the watchers of one entity (the index file, or a
//! lane's series and shot files), drives its [`StagingState`] from watcher
//! signals and read completions, and hands complete payloads to the
//! aggregator. Any change to any of its files re-reads all of them.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::source::{LanePair, SourceFile};

use super::staging::{BusyPolicy, Completion, StageDecision, StagingState};
use super::{ChangeWatcher, DEFAULT_POLL_INTERVAL, WatchError, WatchSignal, WatcherHandle};

/// What a coordinator tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Index,
    Lane { key: String },
}

impl Entity {
    /// Name used in logs and failure events.
    pub fn label(&self) -> &str {
        match self {
            Entity::Index => "index",
            Entity::Lane { key } => key,
        }
    }
}

/// Complete raw payloads of one entity, or a failure to produce them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedPayload {
    Index {
        payload: Vec<u8>,
    },
    Lane {
        key: String,
        series: Vec<u8>,
        shots: Vec<u8>,
    },
    Failed {
        entity: String,
        message: String,
    },
}

/// Polling and staging options shared by all coordinators of a session.
#[derive(Debug, Clone, Copy)]
pub struct StagingOptions {
    pub poll_interval: Duration,
    pub busy_policy: BusyPolicy,
}

impl Default for StagingOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            busy_policy: BusyPolicy::default(),
        }
    }
}

enum Message {
    Changed,
    StatFailed(WatchError),
    ReadDone {
        slot: usize,
        result: io::Result<Vec<u8>>,
    },
}

impl From<WatchSignal> for Message {
    fn from(signal: WatchSignal) -> Self {
        match signal {
            WatchSignal::Changed => Message::Changed,
            WatchSignal::Failed(e) => Message::StatFailed(e),
        }
    }
}

/// Staging coordinator for one entity, not yet started.
#[derive(Debug)]
pub struct Coordinator {
    entity: Entity,
    files: Vec<Arc<dyn SourceFile>>,
    options: StagingOptions,
}

impl Coordinator {
    /// Coordinator for the index file.
    pub fn index(file: Arc<dyn SourceFile>, options: StagingOptions) -> Self {
        Self {
            entity: Entity::Index,
            files: vec![file],
            options,
        }
    }

    /// Coordinator for a lane's series and shot files.
    pub fn lane(pair: &LanePair, options: StagingOptions) -> Self {
        Self {
            entity: Entity::Lane {
                key: pair.key.clone(),
            },
            files: vec![pair.series.clone(), pair.shots.clone()],
            options,
        }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Start the watchers and stage once straight away.
    pub fn start(self, out: mpsc::UnboundedSender<StagedPayload>) -> CoordinatorHandle {
        let cancel = CancellationToken::new();
        let entity = self.entity.clone();
        let task = tokio::spawn(self.run(out, cancel.clone()));

        CoordinatorHandle {
            entity,
            cancel,
            task,
        }
    }

    async fn run(self, out: mpsc::UnboundedSender<StagedPayload>, cancel: CancellationToken) {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let watchers: Vec<WatcherHandle> = self
            .files
            .iter()
            .map(|file| {
                let tx = tx.clone();
                ChangeWatcher::new(file.clone(), self.options.poll_interval)
                    .start(cancel.child_token(), move |signal| {
                        let _ = tx.send(Message::from(signal));
                    })
            })
            .collect();

        let mut state = StagingState::new(self.files.len(), self.options.busy_policy);
        self.stage(&mut state, &tx);

        crate::debug_event!("staging", "started", "{}", self.entity.label());

        let mut stopping = false;
        loop {
            tokio::select! {
                _ = cancel.cancelled(), if !stopping => {
                    stopping = true;
                    for watcher in &watchers {
                        watcher.stop();
                    }
                }
                Some(message) = rx.recv() => {
                    self.handle(message, &mut state, &tx, &out, stopping);
                }
            }

            if stopping && !state.is_reading() {
                break;
            }
        }

        for watcher in watchers {
            watcher.join().await;
        }
        crate::debug_event!("staging", "stopped", "{}", self.entity.label());
    }

    fn handle(
        &self,
        message: Message,
        state: &mut StagingState,
        tx: &mpsc::UnboundedSender<Message>,
        out: &mpsc::UnboundedSender<StagedPayload>,
        stopping: bool,
    ) {
        let completion = match message {
            Message::Changed => {
                self.stage(state, tx);
                return;
            }
            Message::StatFailed(e) => {
                self.report(out, &e);
                return;
            }
            Message::ReadDone {
                slot,
                result: Ok(payload),
            } => state.complete(slot, payload),
            Message::ReadDone {
                slot,
                result: Err(source),
            } => {
                let e = WatchError::Read {
                    file: self.files[slot].name().to_string(),
                    source,
                };
                self.report(out, &e);
                state.fail(slot)
            }
        };

        let restage = match completion {
            Completion::Pending => return,
            Completion::Ready { payloads, restage } => {
                crate::debug_event!("staging", "ready", "{}", self.entity.label());
                let _ = out.send(self.payload(payloads));
                restage
            }
            Completion::Failed { restage } => restage,
        };

        if restage && !stopping {
            self.stage(state, tx);
        }
    }

    fn stage(&self, state: &mut StagingState, tx: &mpsc::UnboundedSender<Message>) {
        match state.stage() {
            StageDecision::Issue => {
                for (slot, file) in self.files.iter().enumerate() {
                    let file = file.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let result = file.read().await;
                        let _ = tx.send(Message::ReadDone { slot, result });
                    });
                }
            }
            StageDecision::Dropped => {
                crate::debug_event!("staging", "busy, dropped", "{}", self.entity.label());
            }
            StageDecision::Deferred => {
                crate::debug_event!("staging", "busy, deferred", "{}", self.entity.label());
            }
        }
    }

    fn report(&self, out: &mpsc::UnboundedSender<StagedPayload>, e: &WatchError) {
        tracing::error!("[staging] {}: {e}", self.entity.label());
        let _ = out.send(StagedPayload::Failed {
            entity: self.entity.label().to_string(),
            message: e.to_string(),
        });
    }

    fn payload(&self, mut payloads: Vec<Vec<u8>>) -> StagedPayload {
        match &self.entity {
            Entity::Index => StagedPayload::Index {
                payload: payloads.pop().unwrap_or_default(),
            },
            Entity::Lane { key } => {
                let shots = payloads.pop().unwrap_or_default();
                let series = payloads.pop().unwrap_or_default();
                StagedPayload::Lane {
                    key: key.clone(),
                    series,
                    shots,
                }
            }
        }
    }
}

/// A started coordinator.
#[derive(Debug)]
pub struct CoordinatorHandle {
    entity: Entity,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl CoordinatorHandle {
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Stop polling. Reads already in flight still complete and publish.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Wait until the coordinator has stopped and its last read finished.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}
