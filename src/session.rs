//! A running scoring session.
//!
//! [`ScoreSession`] registers every lane pair on a fresh [`Scoreboard`],
//! spawns the [`Aggregator`], and starts one [`Coordinator`] for the index
//! file plus one per lane, all feeding the same channel.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::Settings;
use crate::decode::TextEncoding;
use crate::publish::{SessionEvent, TreeBroadcaster};
use crate::score::{Aggregator, LaneOutcome, ScoreError, ScoreTree, Scoreboard};
use crate::source::FileSet;
use crate::watcher::{Coordinator, CoordinatorHandle, StagingOptions, WatchError};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No index file '{name}' found")]
    MissingIndex { name: String },

    #[error("Cannot list {}: {source}", dir.display())]
    Listing {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error("Aggregator task failed: {0}")]
    Aggregator(#[from] tokio::task::JoinError),
}

/// Everything a session needs besides its files.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub index_name: String,
    pub encoding: TextEncoding,
    pub host: Option<String>,
    pub staging: StagingOptions,
}

impl SessionOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            index_name: settings.source.index_name.clone(),
            encoding: settings.source.encoding,
            host: settings.publish.host.clone(),
            staging: settings.watch.staging_options(),
        }
    }

    fn board(&self, files: &FileSet) -> Scoreboard {
        let mut board = Scoreboard::new(self.encoding).with_host(self.host.clone());
        for key in files.lane_keys() {
            board.register_lane(key);
        }
        board
    }
}

/// List `dir` and fail if it has no index file.
pub async fn discover(dir: &Path, index_name: &str) -> Result<FileSet, SessionError> {
    let files = FileSet::from_dir(dir, index_name)
        .await
        .map_err(|source| SessionError::Listing {
            dir: dir.to_path_buf(),
            source,
        })?;

    if files.index.is_none() {
        return Err(SessionError::MissingIndex {
            name: index_name.to_string(),
        });
    }

    crate::debug_event!("session", "discovered", "{} lanes in {}", files.lanes.len(), dir.display());
    Ok(files)
}

/// Coordinators and aggregator of one set of files.
pub struct ScoreSession {
    broadcaster: TreeBroadcaster,
    coordinators: Vec<CoordinatorHandle>,
    aggregator: JoinHandle<Scoreboard>,
    lanes: usize,
}

impl ScoreSession {
    /// Start watching `files`.
    ///
    /// Subscribe on `broadcaster` before calling this to see the trees
    /// published by the initial reads.
    pub fn start(
        files: FileSet,
        options: &SessionOptions,
        broadcaster: TreeBroadcaster,
    ) -> Result<Self, SessionError> {
        let Some(index) = files.index.clone() else {
            return Err(SessionError::MissingIndex {
                name: options.index_name.clone(),
            });
        };

        let board = options.board(&files);
        let lanes = board.lane_count();
        let (tx, rx) = mpsc::unbounded_channel();

        let aggregator = tokio::spawn(Aggregator::new(board, broadcaster.clone()).run(rx));

        let mut coordinators = Vec::with_capacity(files.lanes.len() + 1);
        coordinators.push(Coordinator::index(index, options.staging).start(tx.clone()));
        for pair in &files.lanes {
            coordinators.push(Coordinator::lane(pair, options.staging).start(tx.clone()));
        }
        // The aggregator ends once every coordinator has dropped its sender.
        drop(tx);

        crate::log_event!("session", "started", "{lanes} lanes");

        Ok(Self {
            broadcaster,
            coordinators,
            aggregator,
            lanes,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcaster.subscribe()
    }

    pub fn lane_count(&self) -> usize {
        self.lanes
    }

    /// Stop polling every file. Reads already in flight still publish.
    pub fn stop(&self) {
        for coordinator in &self.coordinators {
            coordinator.stop();
        }
    }

    /// Wait for a stopped session to drain and return its final board.
    pub async fn join(self) -> Result<Scoreboard, SessionError> {
        for coordinator in self.coordinators {
            coordinator.join().await;
        }
        let board = self.aggregator.await?;
        crate::log_event!("session", "stopped");
        Ok(board)
    }

    /// [`stop`](Self::stop) followed by [`join`](Self::join).
    pub async fn shutdown(self) -> Result<Scoreboard, SessionError> {
        self.stop();
        self.join().await
    }
}

/// Read every file once and build a single tree, without watching.
///
/// The index is applied first, so no lane data is parked. An index that
/// cannot be read or applied fails the snapshot; a bad lane is logged and
/// left empty.
pub async fn snapshot(files: &FileSet, options: &SessionOptions) -> Result<ScoreTree, SessionError> {
    let Some(index) = &files.index else {
        return Err(SessionError::MissingIndex {
            name: options.index_name.clone(),
        });
    };

    let mut board = options.board(files);

    let payload = index.read().await.map_err(|source| WatchError::Read {
        file: index.name().to_string(),
        source,
    })?;
    board.apply_index(&payload)?;

    for pair in &files.lanes {
        let (series, shots) = match tokio::try_join!(pair.series.read(), pair.shots.read()) {
            Ok(payloads) => payloads,
            Err(e) => {
                tracing::error!("[session] cannot read lane {}: {e}", pair.key);
                continue;
            }
        };

        match board.apply_lane(&pair.key, &series, &shots) {
            Ok(LaneOutcome::Applied { shots }) => {
                crate::debug_event!("session", "lane", "{}: {shots} shots", pair.key);
            }
            Ok(LaneOutcome::Parked) => {
                crate::debug_event!("session", "no index entry", "{}", pair.key);
            }
            Err(e) => tracing::error!("[session] lane {} rejected: {e}", pair.key),
        }
    }

    Ok(board.rebuild())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{LanePair, MemoryFile, SourceFile};
    use std::sync::Arc;
    use std::time::Duration;

    const INDEX: &str = "1;3;4;Kari Nordmann;Nordstrand SKL;3;V55;0;;31\n";
    const SERIES: &str = "[Serie]\nNr = 1\nNavn = Felt\nStartsum = 0\nSeriesum = 48\nTotalsum = 48\nSkudd = 1\n";

    fn shot_file() -> Vec<u8> {
        let mut bytes = vec![0u8; 9];
        // shot 1, value 1050, x 3000, stored y -6000
        bytes.extend_from_slice(&[0x01, 0x00, 0x1A, 0x04, 0xB8, 0x0B, 0x00, 0x90, 0xE8, 0xFF]);
        bytes
    }

    struct Files {
        index: Arc<MemoryFile>,
        series: Arc<MemoryFile>,
        shots: Arc<MemoryFile>,
    }

    impl Files {
        fn new() -> Self {
            Self {
                index: Arc::new(MemoryFile::new("index.txt", INDEX)),
                series: Arc::new(MemoryFile::new("1_4.TXT", SERIES)),
                shots: Arc::new(MemoryFile::new("1_4.MLD", shot_file())),
            }
        }

        fn set(&self) -> FileSet {
            FileSet {
                index: Some(self.index.clone() as Arc<dyn SourceFile>),
                lanes: vec![LanePair {
                    key: "1_4".to_string(),
                    series: self.series.clone(),
                    shots: self.shots.clone(),
                }],
            }
        }
    }

    fn options() -> SessionOptions {
        SessionOptions {
            index_name: "index.txt".to_string(),
            host: Some("Bane 1".to_string()),
            ..SessionOptions::default()
        }
    }

    async fn next_tree(rx: &mut broadcast::Receiver<SessionEvent>) -> Arc<ScoreTree> {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("no event within timeout")
                .unwrap();
            if let SessionEvent::TreeUpdated(tree) = event {
                return tree;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_bootstrap_converges() {
        let files = Files::new();
        let broadcaster = TreeBroadcaster::new(16);
        let mut rx = broadcaster.subscribe();

        let session = ScoreSession::start(files.set(), &options(), broadcaster).unwrap();
        assert_eq!(session.lane_count(), 1);

        // index and lane arrive in either order; the second tree has both
        next_tree(&mut rx).await;
        let tree = next_tree(&mut rx).await;
        let range = &tree.ranges[0];
        assert_eq!(range.name, "1");
        assert_eq!(range.relay, "3");
        assert_eq!(range.host.as_deref(), Some("Bane 1"));

        let card = &range.cards[0];
        assert_eq!(card.name, "Kari Nordmann");
        assert_eq!(card.series_sum, "48");
        assert_eq!(card.shots.len(), 1);
        assert_eq!(card.shots[0].value, "*.5");
        assert_eq!(card.shots[0].x, 3000.0 / 300_000.0);
        assert_eq!(card.shots[0].y, 6000.0 / 300_000.0);

        let board = session.shutdown().await.unwrap();
        assert_eq!(board.card("1_4").unwrap().shots.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_republishes_full_tree() {
        let files = Files::new();
        let broadcaster = TreeBroadcaster::new(16);
        let mut rx = broadcaster.subscribe();

        let session = ScoreSession::start(files.set(), &options(), broadcaster).unwrap();
        next_tree(&mut rx).await;
        next_tree(&mut rx).await;

        files.index.write("1;3;4;Per Hansen;Asker SKL;3;V55;0;;31\n");
        let tree = next_tree(&mut rx).await;
        let card = &tree.ranges[0].cards[0];
        assert_eq!(card.name, "Per Hansen");
        // lane data survives an index update
        assert_eq!(card.shots.len(), 1);

        session.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_index_reports_failure() {
        let files = Files::new();
        files.index.write("1;3;4;Kari;Club;3;V55;0;;77\n");
        let broadcaster = TreeBroadcaster::new(16);
        let mut rx = broadcaster.subscribe();

        let session = ScoreSession::start(files.set(), &options(), broadcaster).unwrap();

        let mut failed = false;
        for _ in 0..2 {
            let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
                .unwrap();
            if let SessionEvent::Failed { entity, message } = event {
                assert_eq!(entity, "index");
                assert!(message.contains("77"));
                failed = true;
            }
        }
        assert!(failed);

        session.shutdown().await.unwrap();
    }

    #[test]
    fn test_start_requires_index() {
        let files = Files::new();
        let mut set = files.set();
        set.index = None;

        let result = ScoreSession::start(set, &options(), TreeBroadcaster::new(4));
        assert!(matches!(result, Err(SessionError::MissingIndex { .. })));
    }

    #[tokio::test]
    async fn test_snapshot_reads_once() {
        let files = Files::new();
        let tree = snapshot(&files.set(), &options()).await.unwrap();

        assert_eq!(tree.card_count(), 1);
        let card = &tree.ranges[0].cards[0];
        assert_eq!(card.name, "Kari Nordmann");
        assert_eq!(card.shots.len(), 1);
        assert_eq!(files.index.read_count(), 1);
        assert_eq!(files.shots.read_count(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_skips_unreadable_lane() {
        let files = Files::new();
        files.shots.remove();

        let tree = snapshot(&files.set(), &options()).await.unwrap();
        let card = &tree.ranges[0].cards[0];
        assert_eq!(card.name, "Kari Nordmann");
        assert!(card.shots.is_empty());
    }
}
