//! Aggregation task: applies staged payloads and republishes the tree.

use tokio::sync::mpsc;

use crate::publish::TreeBroadcaster;
use crate::watcher::StagedPayload;

use super::{LaneOutcome, Scoreboard};

/// Sole owner of the [`Scoreboard`].
///
/// Payloads are applied one at a time in arrival order. Every payload that
/// applies cleanly is followed by a full rebuild and publish; one that does
/// not leaves the board untouched and is reported as a failure.
pub struct Aggregator {
    board: Scoreboard,
    broadcaster: TreeBroadcaster,
}

impl Aggregator {
    pub fn new(board: Scoreboard, broadcaster: TreeBroadcaster) -> Self {
        Self { board, broadcaster }
    }

    pub fn board(&self) -> &Scoreboard {
        &self.board
    }

    /// Apply one payload and publish the outcome.
    pub fn handle(&mut self, payload: StagedPayload) {
        match payload {
            StagedPayload::Index { payload } => match self.board.apply_index(&payload) {
                Ok(summary) => {
                    crate::log_event!("board", "index", "{} records", summary.records);
                    for key in &summary.replayed {
                        crate::debug_event!("board", "replayed", "{key}");
                    }
                    self.publish();
                }
                Err(e) => {
                    tracing::error!("[board] index rejected: {e}");
                    self.broadcaster.publish_failure("index", e.to_string());
                }
            },

            StagedPayload::Lane { key, series, shots } => {
                match self.board.apply_lane(&key, &series, &shots) {
                    Ok(LaneOutcome::Applied { shots: count }) => {
                        crate::log_event!("board", "lane", "{key}: {count} shots");
                        self.publish();
                    }
                    Ok(LaneOutcome::Parked) => {
                        crate::debug_event!("board", "parked", "{key} has no index entry yet");
                        self.publish();
                    }
                    Err(e) => {
                        tracing::error!("[board] lane {key} rejected: {e}");
                        self.broadcaster.publish_failure(&key, e.to_string());
                    }
                }
            }

            StagedPayload::Failed { entity, message } => {
                self.broadcaster.publish_failure(&entity, message);
            }
        }
    }

    fn publish(&self) {
        self.broadcaster.publish_tree(self.board.rebuild());
    }

    /// Apply payloads until every sender is gone, then hand the board back.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<StagedPayload>) -> Scoreboard {
        while let Some(payload) = rx.recv().await {
            self.handle(payload);
        }
        crate::debug_event!("board", "closed");
        self.board
    }
}
