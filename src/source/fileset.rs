//! Grouping of the device's files into an index and lane pairs.

use std::io;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{LocalFile, SourceFile};

/// Extension of a lane's series file. Case-sensitive.
pub const SERIES_EXT: &str = "TXT";

/// Extension of a lane's shot file. Case-sensitive.
pub const SHOT_EXT: &str = "MLD";

/// Default name of the index file.
pub const INDEX_NAME: &str = "index.txt";

/// Series and shot files sharing one base name.
#[derive(Debug, Clone)]
pub struct LanePair {
    /// Base name, `"<range>_<lane>"`.
    pub key: String,
    pub series: Arc<dyn SourceFile>,
    pub shots: Arc<dyn SourceFile>,
}

/// The files of one scoring session.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    pub index: Option<Arc<dyn SourceFile>>,
    pub lanes: Vec<LanePair>,
}

#[derive(Default)]
struct PartialPair {
    series: Option<Arc<dyn SourceFile>>,
    shots: Option<Arc<dyn SourceFile>>,
}

impl FileSet {
    /// Pick the index by exact name and pair the remaining files by base
    /// name. Groups missing either half are dropped.
    pub fn classify(files: impl IntoIterator<Item = Arc<dyn SourceFile>>, index_name: &str) -> Self {
        let mut index = None;
        let mut groups: IndexMap<String, PartialPair> = IndexMap::new();

        for file in files {
            if file.name() == index_name {
                index = Some(file);
                continue;
            }

            let Some((base, ext)) = file.name().rsplit_once('.') else {
                continue;
            };
            let base = base.to_string();

            match ext {
                SERIES_EXT => groups.entry(base).or_default().series = Some(file),
                SHOT_EXT => groups.entry(base).or_default().shots = Some(file),
                _ => {}
            }
        }

        let lanes = groups
            .into_iter()
            .filter_map(|(key, pair)| match (pair.series, pair.shots) {
                (Some(series), Some(shots)) => Some(LanePair { key, series, shots }),
                _ => {
                    crate::debug_event!("files", "incomplete pair", "{key}");
                    None
                }
            })
            .collect();

        Self { index, lanes }
    }

    /// List a directory (non-recursively, sorted by name) and classify it.
    pub async fn from_dir(dir: &Path, index_name: &str) -> io::Result<Self> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut paths = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        let files = paths
            .into_iter()
            .map(|path| Arc::new(LocalFile::new(path)) as Arc<dyn SourceFile>);

        Ok(Self::classify(files, index_name))
    }

    pub fn lane_keys(&self) -> impl Iterator<Item = &str> {
        self.lanes.iter().map(|pair| pair.key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryFile;
    use tempfile::TempDir;

    fn files(names: &[&str]) -> Vec<Arc<dyn SourceFile>> {
        names
            .iter()
            .map(|name| Arc::new(MemoryFile::new(*name, Vec::new())) as Arc<dyn SourceFile>)
            .collect()
    }

    #[test]
    fn test_classify_pairs() {
        let set = FileSet::classify(
            files(&["index.txt", "1_4.TXT", "1_4.MLD", "1_5.MLD", "1_5.TXT"]),
            INDEX_NAME,
        );

        assert_eq!(set.index.as_ref().map(|f| f.name()), Some("index.txt"));
        let keys: Vec<_> = set.lane_keys().collect();
        assert_eq!(keys, ["1_4", "1_5"]);
        assert_eq!(set.lanes[1].series.name(), "1_5.TXT");
        assert_eq!(set.lanes[1].shots.name(), "1_5.MLD");
    }

    #[test]
    fn test_incomplete_groups_dropped() {
        let set = FileSet::classify(files(&["1_4.TXT", "1_6.MLD", "1_7.TXT", "1_7.MLD"]), INDEX_NAME);
        let keys: Vec<_> = set.lane_keys().collect();
        assert_eq!(keys, ["1_7"]);
        assert!(set.index.is_none());
    }

    #[test]
    fn test_extensions_are_case_sensitive() {
        let set = FileSet::classify(files(&["1_4.txt", "1_4.mld", "1_5.Txt", "1_5.MLD"]), INDEX_NAME);
        assert!(set.lanes.is_empty());
    }

    #[test]
    fn test_other_files_ignored() {
        let set = FileSet::classify(files(&["README", "notes.md", "INDEX.TXT"]), INDEX_NAME);
        assert!(set.index.is_none());
        // INDEX.TXT is a series file without a shot file
        assert!(set.lanes.is_empty());
    }

    #[tokio::test]
    async fn test_from_dir() {
        let dir = TempDir::new().unwrap();
        for name in ["index.txt", "2_1.TXT", "2_1.MLD", "1_3.TXT", "1_3.MLD", "stray.MLD"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("9_9.TXT")).unwrap();

        let set = FileSet::from_dir(dir.path(), INDEX_NAME).await.unwrap();
        assert!(set.index.is_some());
        let keys: Vec<_> = set.lane_keys().collect();
        assert_eq!(keys, ["1_3", "2_1"]);
    }
}
