//! File handles the watchers poll and the coordinators read.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

/// A readable file with a modification timestamp.
#[async_trait]
pub trait SourceFile: Send + Sync + fmt::Debug {
    /// File name including extension, without directories.
    fn name(&self) -> &str;

    /// Last modification time.
    async fn modified(&self) -> io::Result<SystemTime>;

    /// Full contents.
    async fn read(&self) -> io::Result<Vec<u8>>;
}

/// A file on the local disk.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SourceFile for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn modified(&self) -> io::Result<SystemTime> {
        tokio::fs::metadata(&self.path).await?.modified()
    }

    async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

#[derive(Debug)]
struct MemoryState {
    contents: Vec<u8>,
    modified: Option<SystemTime>,
    reads: usize,
}

/// An in-memory file for embedding and tests.
///
/// Every [`write`](MemoryFile::write) advances the timestamp by one second.
/// Reads can be held open with [`hold_reads`](MemoryFile::hold_reads) to
/// simulate slow I/O.
#[derive(Debug)]
pub struct MemoryFile {
    name: String,
    state: Mutex<MemoryState>,
    gate: watch::Sender<bool>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            name: name.into(),
            state: Mutex::new(MemoryState {
                contents: contents.into(),
                modified: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1)),
                reads: 0,
            }),
            gate,
        }
    }

    /// Replace the contents and bump the timestamp.
    pub fn write(&self, contents: impl Into<Vec<u8>>) {
        let mut state = self.state.lock();
        state.contents = contents.into();
        let previous = state.modified.unwrap_or(SystemTime::UNIX_EPOCH);
        state.modified = Some(previous + Duration::from_secs(1));
    }

    /// Set the timestamp without touching the contents.
    pub fn set_modified(&self, modified: SystemTime) {
        self.state.lock().modified = Some(modified);
    }

    /// Make `modified` and `read` fail with `NotFound` until the next write.
    pub fn remove(&self) {
        self.state.lock().modified = None;
    }

    /// Park every read until [`release_reads`](MemoryFile::release_reads).
    pub fn hold_reads(&self) {
        self.gate.send_replace(false);
    }

    pub fn release_reads(&self) {
        self.gate.send_replace(true);
    }

    /// Number of reads started so far.
    pub fn read_count(&self) -> usize {
        self.state.lock().reads
    }

    fn not_found(&self) -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, format!("{} was removed", self.name))
    }
}

#[async_trait]
impl SourceFile for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn modified(&self) -> io::Result<SystemTime> {
        self.state.lock().modified.ok_or_else(|| self.not_found())
    }

    async fn read(&self) -> io::Result<Vec<u8>> {
        self.state.lock().reads += 1;

        let mut gate = self.gate.subscribe();
        // The sender lives in self, so the channel cannot close here
        let _ = gate.wait_for(|open| *open).await;

        let state = self.state.lock();
        if state.modified.is_none() {
            return Err(self.not_found());
        }
        Ok(state.contents.clone())
    }
}
