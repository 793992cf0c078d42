//! Published score tree.
//!
//! Snapshots are plain owned values built fresh on every rebuild. They
//! serialise to the camelCase shape live displays consume.

use serde::Serialize;

use super::{Card, Target};

/// Every range with its cards, as published after each change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScoreTree {
    pub ranges: Vec<RangeSnapshot>,
}

impl ScoreTree {
    pub fn card_count(&self) -> usize {
        self.ranges.iter().map(|r| r.cards.len()).sum()
    }

    pub fn range(&self, name: &str) -> Option<&RangeSnapshot> {
        self.ranges.iter().find(|r| r.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeSnapshot {
    pub name: String,
    pub relay: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub cards: Vec<CardSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSnapshot {
    pub lane: String,
    pub name: String,
    pub club: String,
    pub class_name: String,
    pub category: String,
    pub series_name: String,
    pub series_sum: String,
    pub total_sum: String,
    pub gauge_size: Option<f64>,
    pub target_id: Option<&'static str>,
    pub target: Target,
    pub shots: Vec<ShotSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotSnapshot {
    pub x: f64,
    pub y: f64,
    pub value: String,
}

impl From<&Card> for CardSnapshot {
    fn from(card: &Card) -> Self {
        Self {
            lane: card.lane.clone(),
            name: card.name.clone(),
            club: card.club.clone(),
            class_name: card.class_name.clone(),
            category: card.category.clone(),
            series_name: card.series.clone(),
            series_sum: card.series_sum.clone(),
            total_sum: card.total_sum.clone(),
            gauge_size: card.target_kind.map(|k| k.gauge_size()),
            target_id: card.target_kind.map(|k| k.display_name()),
            target: card.target.clone(),
            shots: card
                .shots
                .values()
                .map(|shot| ShotSnapshot {
                    x: shot.x,
                    y: shot.y,
                    value: shot.value.clone(),
                })
                .collect(),
        }
    }
}
