//! Shots command: decode a single shot file.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::decode::{ShotRecord, parse_shots};
use crate::score::TargetKind;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShotLine<'a> {
    shot_num: u16,
    raw_value: i16,
    value: &'a str,
    x: f64,
    y: f64,
}

/// Write one JSON line per shot, scaled by `kind` when given.
pub fn write_shots(
    out: &mut impl Write,
    records: &[ShotRecord],
    kind: Option<TargetKind>,
) -> anyhow::Result<()> {
    for record in records {
        let (x, y) = match kind {
            Some(kind) => kind.normalize(record.x, record.y),
            None => (f64::from(record.x), f64::from(record.y)),
        };
        let line = ShotLine {
            shot_num: record.shot_num,
            raw_value: record.raw_value,
            value: &record.value,
            x,
            y,
        };
        serde_json::to_writer(&mut *out, &line)?;
        writeln!(out)?;
    }
    Ok(())
}

pub async fn run(file: &Path, target: Option<&str>) -> anyhow::Result<()> {
    let kind = target.map(str::parse::<TargetKind>).transpose()?;
    let buffer = tokio::fs::read(file)
        .await
        .with_context(|| format!("Cannot read {}", file.display()))?;

    let records = parse_shots(&buffer);
    if records.is_empty() {
        eprintln!("No shots in {}", file.display());
    }

    let mut stdout = std::io::stdout().lock();
    write_shots(&mut stdout, &records, kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOTS: [u8; 29] = [
        0x61, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0B, 0x02, 0x01, 0x00, 0xE1, 0xFB, 0x72, 0x1D,
        0x00, 0xD4, 0x3C, 0x00, 0x02, 0x00, 0xEB, 0x02, 0xC5, 0x74, 0xFE, 0xD8, 0x5A, 0xFF,
    ];

    fn lines(kind: Option<TargetKind>) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        write_shots(&mut out, &parse_shots(&SHOTS), kind).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_raw_coordinates() {
        let lines = lines(None);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["shotNum"], 1);
        assert_eq!(lines[0]["value"], "*.5");
        assert_eq!(lines[0]["x"], 7538.0);
        assert_eq!(lines[0]["y"], -15572.0);
        assert_eq!(lines[1]["value"], "7.4");
    }

    #[test]
    fn test_scaled_coordinates() {
        let lines = lines(Some(TargetKind::Dfs15m));
        assert_eq!(lines[1]["x"], -101179.0 / 40_000.0);
        assert_eq!(lines[1]["y"], 42280.0 / 40_000.0);
    }
}
