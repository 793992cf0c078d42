//! Text payload decoding.

use serde::{Deserialize, Serialize};

/// Character encoding of the device's text files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    /// ISO-8859-1, what the scoring device writes.
    #[default]
    Latin1,
    /// UTF-8, invalid sequences replaced.
    Utf8,
}

impl TextEncoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            // Every Latin-1 byte maps to the code point of the same value
            TextEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}
