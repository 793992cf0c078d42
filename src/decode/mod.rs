//! Decoders for the scoring device's file formats.
//!
//! Everything here is pure: bytes or text in, records out. No I/O and no
//! shared state, so the same input always yields the same output.
//!
//! | File            | Format                                  | Decoder          |
//! |-----------------|-----------------------------------------|------------------|
//! | `index.txt`     | `;`-separated text, one lane per line   | [`parse_index`]  |
//! | `<r>_<l>.TXT`   | `label = value` text, positional lines  | [`parse_series`] |
//! | `<r>_<l>.MLD`   | 9-byte header + 10-byte shot records    | [`parse_shots`]  |

mod index;
mod series;
mod shots;
mod text;
mod value;

pub use index::{INDEX_FIELD_COUNT, IndexRecord, parse_index};
pub use series::{SERIES_LINE_COUNT, SeriesRecord, parse_series};
pub use shots::{HEADER_LENGTH, RECORD_LENGTH, ShotRecord, parse_shots};
pub use text::TextEncoding;
pub use value::format_value;

use thiserror::Error;

/// Errors raised while decoding text payloads.
///
/// Binary shot payloads never fail: short or truncated buffers simply yield
/// fewer shots.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("index line {line} has {found} fields, expected {expected}")]
    IndexFields {
        line: usize,
        found: usize,
        expected: usize,
    },

    #[error("series file has {found} lines, expected at least {expected}")]
    SeriesTruncated { found: usize, expected: usize },
}
