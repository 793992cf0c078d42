//! Error types for score aggregation.

use thiserror::Error;

use crate::decode::DecodeError;

/// Errors from applying device data to the scoreboard.
///
/// Both lookup misses are configuration errors: the files on disk do not
/// match what the index describes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("lane {key} has no {key}.TXT/{key}.MLD file pair")]
    UnregisteredLane { key: String },

    #[error("unknown target type identifier '{target_id}'")]
    UnknownTarget { target_id: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
