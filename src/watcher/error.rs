//! Error types for watching and staging.

use std::io;

use thiserror::Error;

/// Errors from polling or reading a tracked file.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Cannot stat {file}: {source}")]
    Stat {
        file: String,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read {file}: {source}")]
    Read {
        file: String,
        #[source]
        source: io::Error,
    },
}

impl WatchError {
    /// Name of the file the error concerns.
    pub fn file(&self) -> &str {
        match self {
            WatchError::Stat { file, .. } | WatchError::Read { file, .. } => file,
        }
    }
}
