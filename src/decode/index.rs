//! Index file (`index.txt`) decoder.

use serde::Serialize;

use super::DecodeError;

/// Number of `;`-separated fields on every index line.
pub const INDEX_FIELD_COUNT: usize = 10;

/// Per-lane metadata from one index line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRecord {
    pub range: String,
    pub relay: String,
    pub lane: String,
    pub name: String,
    pub club: String,
    pub class_name: String,
    pub category: String,
    pub start_sum: String,
    pub target_id: String,
}

impl IndexRecord {
    /// Key of the lane file pair this record describes.
    pub fn lane_key(&self) -> String {
        format!("{}_{}", self.range, self.lane)
    }
}

/// Decode the index text into one record per non-empty line, in file order.
///
/// Field 9 is not used by the device and is skipped.
pub fn parse_index(text: &str) -> Result<Vec<IndexRecord>, DecodeError> {
    let mut records = Vec::new();

    for (idx, line) in text.split('\n').enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(';').collect();
        if fields.len() < INDEX_FIELD_COUNT {
            return Err(DecodeError::IndexFields {
                line: idx + 1,
                found: fields.len(),
                expected: INDEX_FIELD_COUNT,
            });
        }

        records.push(IndexRecord {
            range: fields[0].to_string(),
            relay: fields[1].to_string(),
            lane: fields[2].to_string(),
            name: fields[3].to_string(),
            club: fields[4].to_string(),
            class_name: fields[5].to_string(),
            category: fields[6].to_string(),
            start_sum: fields[7].to_string(),
            target_id: fields[9].replace('\r', ""),
        });
    }

    Ok(records)
}
