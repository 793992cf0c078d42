//! Score aggregation.
//!
//! The [`Scoreboard`] merges index and lane payloads into per-lane
//! [`Card`]s and rebuilds the complete [`ScoreTree`] on demand. The
//! [`Aggregator`] task owns a scoreboard, applies staged payloads as they
//! arrive, and publishes a fresh tree after every successful change.

mod aggregator;
mod board;
mod card;
mod error;
mod snapshot;
mod target;

pub use aggregator::Aggregator;
pub use board::{IndexSummary, LaneOutcome, Scoreboard};
pub use card::{Card, Shot};
pub use error::ScoreError;
pub use snapshot::{CardSnapshot, RangeSnapshot, ScoreTree, ShotSnapshot};
pub use target::{Target, TargetKind};
