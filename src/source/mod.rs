//! Access to the scoring device's files.
//!
//! [`SourceFile`] is the only thing the watchers and coordinators know
//! about a file: its name, its modification time, and its bytes.
//! [`FileSet`] turns a flat listing into the index file and lane pairs.

mod file;
mod fileset;

pub use file::{LocalFile, MemoryFile, SourceFile};
pub use fileset::{FileSet, INDEX_NAME, LanePair, SERIES_EXT, SHOT_EXT};
