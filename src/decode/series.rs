//! Series file (`.TXT`) decoder.
//!
//! The device writes an ini-like file:
//!
//! ```text
//! [Serie]
//! Nr = 2
//! Navn = Omgang 2
//! Startsum = 0
//! Seriesum = 94
//! Totalsum = 187
//! Skudd = 10
//! ```
//!
//! Labels are not matched. After stripping every `label = ` prefix and the
//! bracket characters, values are picked by line position.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::DecodeError;

/// Lines needed to reach the shot count at position 6.
pub const SERIES_LINE_COUNT: usize = 7;

static LABEL_PREFIX: OnceLock<Regex> = OnceLock::new();

fn label_prefix() -> &'static Regex {
    LABEL_PREFIX.get_or_init(|| Regex::new(r".*=[ ]*").expect("label prefix pattern is valid"))
}

/// Totals for the series currently being shot on one lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesRecord {
    pub series_num: Option<u32>,
    pub series: String,
    pub start_sum: String,
    pub series_sum: String,
    pub total_sum: String,
    pub num_shots: Option<u32>,
}

/// Decode a series file.
///
/// Integer fields that do not parse are reported as `None`; text fields are
/// kept verbatim.
pub fn parse_series(text: &str) -> Result<SeriesRecord, DecodeError> {
    let text = text.replace('\r', "");
    let text = label_prefix().replace_all(&text, "");
    let text = text.replace(['[', ']'], "");

    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < SERIES_LINE_COUNT {
        return Err(DecodeError::SeriesTruncated {
            found: lines.len(),
            expected: SERIES_LINE_COUNT,
        });
    }

    Ok(SeriesRecord {
        series_num: parse_leading_int(lines[1]),
        series: lines[2].to_string(),
        start_sum: lines[3].to_string(),
        series_sum: lines[4].to_string(),
        total_sum: lines[5].to_string(),
        num_shots: parse_leading_int(lines[6]),
    })
}

/// Parse the leading run of digits, ignoring whatever follows.
fn parse_leading_int(field: &str) -> Option<u32> {
    let field = field.trim_start();
    let end = field
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(field.len());
    field[..end].parse().ok()
}
