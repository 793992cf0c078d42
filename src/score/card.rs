//! Live scoring state for one lane.

use std::collections::BTreeMap;

use crate::decode::{IndexRecord, SeriesRecord, ShotRecord};

use super::{Target, TargetKind};

/// One scored hit with coordinates relative to the target radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Shot {
    pub shot_num: u16,
    pub raw_value: i16,
    pub value: String,
    pub x: f64,
    pub y: f64,
}

impl Shot {
    pub fn from_record(record: &ShotRecord, kind: TargetKind) -> Self {
        let (x, y) = kind.normalize(record.x, record.y);
        Self {
            shot_num: record.shot_num,
            raw_value: record.raw_value,
            value: record.value.clone(),
            x,
            y,
        }
    }
}

/// Scoring state of one competitor, keyed by `"<range>_<lane>"`.
///
/// Index fields and lane fields arrive independently and are merged here.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub range: String,
    pub lane: String,
    pub relay: String,
    pub name: String,
    pub club: String,
    pub class_name: String,
    pub category: String,
    pub start_sum: String,
    pub series_num: Option<u32>,
    pub series: String,
    pub series_sum: String,
    pub total_sum: String,
    pub num_shots: Option<u32>,
    /// Set by the index; `None` until the lane first appears there.
    pub target_kind: Option<TargetKind>,
    pub shots: BTreeMap<usize, Shot>,
    pub target: Target,
}

impl Card {
    /// Empty card for a lane file pair. Range and lane come from the key
    /// until the index says otherwise.
    pub fn new(key: &str) -> Self {
        let (range, lane) = match key.rsplit_once('_') {
            Some((range, lane)) => (range.to_string(), lane.to_string()),
            None => (key.to_string(), String::new()),
        };

        Self {
            range,
            lane,
            relay: String::new(),
            name: String::new(),
            club: String::new(),
            class_name: String::new(),
            category: String::new(),
            start_sum: String::new(),
            series_num: None,
            series: String::new(),
            series_sum: String::new(),
            total_sum: String::new(),
            num_shots: None,
            target_kind: None,
            shots: BTreeMap::new(),
            target: Target::default(),
        }
    }

    /// Identifier as written in the index, empty before the first index pass.
    pub fn target_id(&self) -> &str {
        self.target_kind.map(TargetKind::code).unwrap_or_default()
    }

    pub(crate) fn apply_index(&mut self, record: &IndexRecord, kind: TargetKind) {
        self.range.clone_from(&record.range);
        self.relay.clone_from(&record.relay);
        self.lane.clone_from(&record.lane);
        self.name.clone_from(&record.name);
        self.club.clone_from(&record.club);
        self.class_name.clone_from(&record.class_name);
        self.category.clone_from(&record.category);
        self.start_sum.clone_from(&record.start_sum);
        self.target_kind = Some(kind);
        self.target = Target::default();
    }

    /// Replace series fields and the whole shot mapping in one step.
    pub(crate) fn apply_lane(&mut self, series: SeriesRecord, shots: BTreeMap<usize, Shot>) {
        self.series_num = series.series_num;
        self.series = series.series;
        self.series_sum = series.series_sum;
        self.total_sum = series.total_sum;
        self.num_shots = series.num_shots;
        self.shots = shots;
    }
}

/// Normalise decoded records into the card's shot mapping.
pub(crate) fn normalize_shots(records: &[ShotRecord], kind: TargetKind) -> BTreeMap<usize, Shot> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| (idx, Shot::from_record(record, kind)))
        .collect()
}
