//! Per-lane card store and full-tree rebuild.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::decode::{self, SeriesRecord, ShotRecord, TextEncoding};

use super::card::normalize_shots;
use super::{Card, CardSnapshot, RangeSnapshot, ScoreError, ScoreTree, TargetKind};

/// Result of applying one lane payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneOutcome {
    /// Series and shots were assigned to the card.
    Applied { shots: usize },
    /// The lane has no target type yet; held until the index names one.
    Parked,
}

/// Result of applying an index payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub records: usize,
    /// Lanes whose parked payload was applied by this index pass.
    pub replayed: Vec<String>,
}

/// Decoded lane data waiting for its card's target type.
#[derive(Debug, Clone)]
struct ParkedLane {
    series: SeriesRecord,
    shots: Vec<ShotRecord>,
}

/// Owns one [`Card`] per registered lane.
///
/// Cards are never removed. Iteration follows registration order, which is
/// also the order of the published tree.
#[derive(Debug)]
pub struct Scoreboard {
    cards: IndexMap<String, Card>,
    parked: HashMap<String, ParkedLane>,
    encoding: TextEncoding,
    host: Option<String>,
}

impl Scoreboard {
    pub fn new(encoding: TextEncoding) -> Self {
        Self {
            cards: IndexMap::new(),
            parked: HashMap::new(),
            encoding,
            host: None,
        }
    }

    /// Label stamped on every published range.
    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.host = host;
        self
    }

    /// Track a lane that has a complete file pair on disk.
    pub fn register_lane(&mut self, key: &str) {
        self.cards
            .entry(key.to_string())
            .or_insert_with(|| Card::new(key));
    }

    pub fn lane_count(&self) -> usize {
        self.cards.len()
    }

    pub fn card(&self, key: &str) -> Option<&Card> {
        self.cards.get(key)
    }

    /// Merge an index payload into the cards.
    ///
    /// Every record is checked before any card changes: one record naming an
    /// unregistered lane or an unknown target type rejects the whole payload.
    pub fn apply_index(&mut self, payload: &[u8]) -> Result<IndexSummary, ScoreError> {
        let text = self.encoding.decode(payload);
        let records = decode::parse_index(&text)?;

        let mut resolved = Vec::with_capacity(records.len());
        for record in &records {
            let key = record.lane_key();
            if !self.cards.contains_key(&key) {
                return Err(ScoreError::UnregisteredLane { key });
            }
            let kind: TargetKind = record.target_id.parse()?;
            resolved.push((key, kind));
        }

        let mut summary = IndexSummary {
            records: records.len(),
            replayed: Vec::new(),
        };

        for (record, (key, kind)) in records.iter().zip(resolved) {
            let Some(card) = self.cards.get_mut(&key) else {
                continue;
            };
            card.apply_index(record, kind);

            if let Some(parked) = self.parked.remove(&key) {
                card.apply_lane(parked.series, normalize_shots(&parked.shots, kind));
                summary.replayed.push(key);
            }
        }

        Ok(summary)
    }

    /// Merge a lane's series and shot payloads into its card.
    ///
    /// Both payloads are decoded before the card is touched, so a decode
    /// failure leaves the previous series and shots in place.
    pub fn apply_lane(
        &mut self,
        key: &str,
        series: &[u8],
        shots: &[u8],
    ) -> Result<LaneOutcome, ScoreError> {
        let card = self
            .cards
            .get_mut(key)
            .ok_or_else(|| ScoreError::UnregisteredLane {
                key: key.to_string(),
            })?;

        let series = decode::parse_series(&self.encoding.decode(series))?;
        let records = decode::parse_shots(shots);

        match card.target_kind {
            Some(kind) => {
                let shots = normalize_shots(&records, kind);
                let count = shots.len();
                card.apply_lane(series, shots);
                self.parked.remove(key);
                Ok(LaneOutcome::Applied { shots: count })
            }
            None => {
                self.parked.insert(
                    key.to_string(),
                    ParkedLane {
                        series,
                        shots: records,
                    },
                );
                Ok(LaneOutcome::Parked)
            }
        }
    }

    /// Build the full tree from current card state.
    ///
    /// Cards are grouped by range in first-seen order; the first card of a
    /// range decides its relay.
    pub fn rebuild(&self) -> ScoreTree {
        let mut ranges: IndexMap<&str, RangeSnapshot> = IndexMap::new();

        for card in self.cards.values() {
            ranges
                .entry(card.range.as_str())
                .or_insert_with(|| RangeSnapshot {
                    name: card.range.clone(),
                    relay: card.relay.clone(),
                    host: self.host.clone(),
                    cards: Vec::new(),
                })
                .cards
                .push(CardSnapshot::from(card));
        }

        ScoreTree {
            ranges: ranges.into_values().collect(),
        }
    }
}
