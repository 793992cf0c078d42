//! Timestamp polling for a single file.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::source::SourceFile;

use super::WatchError;

/// Default polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What a watcher reports to its owner.
#[derive(Debug)]
pub enum WatchSignal {
    /// The modification time moved forward.
    Changed,
    /// The file could not be stat'ed.
    Failed(WatchError),
}

/// Polls one file's modification time and signals when it increases.
///
/// Nothing has been seen when polling starts, so the first check always
/// signals a change. That first signal is what loads the file initially.
#[derive(Debug)]
pub struct ChangeWatcher {
    file: Arc<dyn SourceFile>,
    interval: Duration,
    last_seen: Option<SystemTime>,
    failing: bool,
}

impl ChangeWatcher {
    pub fn new(file: Arc<dyn SourceFile>, interval: Duration) -> Self {
        Self {
            file,
            interval: interval.max(Duration::from_millis(1)),
            last_seen: None,
            failing: false,
        }
    }

    pub fn file_name(&self) -> &str {
        self.file.name()
    }

    /// Compare the current timestamp with the last one seen.
    ///
    /// Returns `true` only when the timestamp strictly increased. Equal or
    /// older timestamps count as unchanged.
    pub async fn check(&mut self) -> Result<bool, WatchError> {
        let modified = self
            .file
            .modified()
            .await
            .map_err(|source| WatchError::Stat {
                file: self.file.name().to_string(),
                source,
            })?;

        match self.last_seen {
            Some(last) if modified <= last => Ok(false),
            _ => {
                self.last_seen = Some(modified);
                Ok(true)
            }
        }
    }

    /// Poll until stopped: one check now, then one per interval.
    ///
    /// A run of consecutive stat failures is reported once; polling carries
    /// on, so the file is picked up again as soon as it can be stat'ed.
    pub fn start<F>(mut self, cancel: CancellationToken, mut on_signal: F) -> WatcherHandle
    where
        F: FnMut(WatchSignal) + Send + 'static,
    {
        self.last_seen = None;
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                match self.check().await {
                    Ok(true) => {
                        self.failing = false;
                        crate::debug_event!("watcher", "changed", "{}", self.file_name());
                        on_signal(WatchSignal::Changed);
                    }
                    Ok(false) => {
                        self.failing = false;
                    }
                    Err(e) if self.failing => {
                        tracing::trace!("[watcher] still failing: {e}");
                    }
                    Err(e) => {
                        self.failing = true;
                        on_signal(WatchSignal::Failed(e));
                    }
                }
            }

            crate::debug_event!("watcher", "stopped", "{}", self.file_name());
        });

        WatcherHandle { cancel, task }
    }
}

/// Running watcher. Dropping the handle does not stop it.
#[derive(Debug)]
pub struct WatcherHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Stop polling. Signals already delivered stay delivered.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the polling task to exit.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}
