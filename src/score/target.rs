//! Target-type calibration table and the scoring-surface configuration.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::ScoreError;

/// Known target types, keyed by the device's numeric identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TargetKind {
    /// 15 m indoor target, identifier `30`.
    Dfs15m,
    /// 100 m field target, identifier `31`.
    Dfs100m,
    /// 200 m field target, identifier `32`.
    Dfs200m,
    /// 300 m field target, identifier `33`.
    Dfs300m,
}

/// Diameter of the gauge in device units, shared by the field targets.
const FIELD_GAUGE: f64 = 8000.0;

impl TargetKind {
    pub const ALL: [TargetKind; 4] = [
        TargetKind::Dfs15m,
        TargetKind::Dfs100m,
        TargetKind::Dfs200m,
        TargetKind::Dfs300m,
    ];

    /// Identifier as written in the index file.
    pub fn code(self) -> &'static str {
        match self {
            TargetKind::Dfs15m => "30",
            TargetKind::Dfs100m => "31",
            TargetKind::Dfs200m => "32",
            TargetKind::Dfs300m => "33",
        }
    }

    /// Name published to live displays.
    pub fn display_name(self) -> &'static str {
        match self {
            TargetKind::Dfs15m => "NO_DFS_15M",
            TargetKind::Dfs100m => "NO_DFS_100M",
            TargetKind::Dfs200m => "NO_DFS_200M",
            TargetKind::Dfs300m => "NO_DFS_300M",
        }
    }

    /// Device units per target radius; coordinates are divided by this.
    pub fn scale(self) -> f64 {
        match self {
            TargetKind::Dfs15m => 40_000.0,
            TargetKind::Dfs100m => 300_000.0,
            TargetKind::Dfs200m => 500_000.0,
            TargetKind::Dfs300m => 750_000.0,
        }
    }

    /// Gauge diameter relative to the target. The 15 m target has none.
    pub fn gauge_size(self) -> f64 {
        match self {
            TargetKind::Dfs15m => 0.0,
            kind => FIELD_GAUGE / kind.scale(),
        }
    }

    /// Normalise a device coordinate pair.
    pub fn normalize(self, x: i32, y: i32) -> (f64, f64) {
        let scale = self.scale();
        (f64::from(x) / scale, f64::from(y) / scale)
    }
}

impl FromStr for TargetKind {
    type Err = ScoreError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        TargetKind::ALL
            .into_iter()
            .find(|kind| kind.code() == code)
            .ok_or_else(|| ScoreError::UnknownTarget {
                target_id: code.to_string(),
            })
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Scoring-surface configuration attached to every card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub ring_sizes: Vec<f64>,
    pub gauge: f64,
    pub black_size: f64,
    pub numbers_from: u32,
    pub numbers_to: u32,
    pub scale: u32,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            ring_sizes: vec![1.0, 0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1, 0.05],
            gauge: 0.0133,
            black_size: 0.4,
            numbers_from: 1,
            numbers_to: 9,
            scale: 300_000,
        }
    }
}
