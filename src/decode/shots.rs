//! Binary shot file (`.MLD`) decoder.
//!
//! Layout, little-endian throughout:
//!
//! ```text
//! header   9 bytes, ignored
//! record  10 bytes, repeated
//!   0..2   shot sequence number   u16
//!   2..4   raw value (1/100)      i16
//!   4..7   x coordinate           i24
//!   7..10  y coordinate           i24, negated
//! ```

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use super::format_value;

/// Length of the file header preceding the first record.
pub const HEADER_LENGTH: usize = 9;

/// Length of one shot record.
pub const RECORD_LENGTH: usize = 10;

/// One decoded shot record, coordinates still in device units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShotRecord {
    pub shot_num: u16,
    pub raw_value: i16,
    pub value: String,
    pub x: i32,
    pub y: i32,
}

impl ShotRecord {
    fn decode(record: &[u8]) -> Self {
        let raw_value = LittleEndian::read_i16(&record[2..4]);

        Self {
            shot_num: LittleEndian::read_u16(&record[0..2]),
            raw_value,
            value: format_value(raw_value),
            x: LittleEndian::read_i24(&record[4..7]),
            y: -LittleEndian::read_i24(&record[7..10]),
        }
    }
}

/// Decode every complete record of a shot file.
///
/// A buffer no longer than the header yields no shots; a trailing partial
/// record is dropped.
pub fn parse_shots(buffer: &[u8]) -> Vec<ShotRecord> {
    let Some(body) = buffer.get(HEADER_LENGTH..) else {
        return Vec::new();
    };

    body.chunks_exact(RECORD_LENGTH)
        .map(ShotRecord::decode)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SHOTS: [u8; 29] = [
        0x61, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0B, 0x02, 0x01, 0x00, 0xE1, 0xFB, 0x72, 0x1D,
        0x00, 0xD4, 0x3C, 0x00, 0x02, 0x00, 0xEB, 0x02, 0xC5, 0x74, 0xFE, 0xD8, 0x5A, 0xFF,
    ];

    #[test]
    fn test_device_capture() {
        let shots = parse_shots(&TWO_SHOTS);

        assert_eq!(shots.len(), 2);

        assert_eq!(shots[0].shot_num, 1);
        assert_eq!(shots[0].value, "*.5");
        assert_eq!(shots[0].x, 7538);
        assert_eq!(shots[0].y, -15572);

        assert_eq!(shots[1].shot_num, 2);
        assert_eq!(shots[1].value, "7.4");
        assert_eq!(shots[1].x, -101179);
        assert_eq!(shots[1].y, 42280);
    }

    #[test]
    fn test_raw_value_keeps_sign() {
        let shots = parse_shots(&TWO_SHOTS);
        assert_eq!(shots[0].raw_value, -1055);
        assert_eq!(shots[1].raw_value, 747);
    }

    #[test]
    fn test_header_only() {
        assert!(parse_shots(&TWO_SHOTS[..HEADER_LENGTH]).is_empty());
    }

    #[test]
    fn test_shorter_than_header() {
        assert!(parse_shots(&[]).is_empty());
        assert!(parse_shots(&TWO_SHOTS[..4]).is_empty());
    }

    #[test]
    fn test_trailing_partial_record_dropped() {
        let one_and_a_bit = &TWO_SHOTS[..HEADER_LENGTH + RECORD_LENGTH + 7];
        let shots = parse_shots(one_and_a_bit);

        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].shot_num, 1);
    }

    #[test]
    fn test_decoding_is_deterministic() {
        assert_eq!(parse_shots(&TWO_SHOTS), parse_shots(&TWO_SHOTS));
    }
}
