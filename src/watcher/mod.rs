//! Change detection and read staging for the device's files.
//!
//! # Architecture
//!
//! ```text
//! ChangeWatcher (per file, polls mtime)
//!         |  WatchSignal
//!         v
//! Coordinator (per entity: index, or series+shot lane pair)
//!   - StagingState: at most one read cycle in flight
//!   - spawns reads, collects completions
//!         |  StagedPayload
//!         v
//!     Aggregator
//! ```

mod coordinator;
mod error;
mod poller;
mod staging;

pub use coordinator::{Coordinator, CoordinatorHandle, Entity, StagedPayload, StagingOptions};
pub use error::WatchError;
pub use poller::{ChangeWatcher, DEFAULT_POLL_INTERVAL, WatchSignal, WatcherHandle};
pub use staging::{BusyPolicy, Completion, StageDecision, StagingState};
