//! Store evaluations ("walks"). Read-only here: the hierarchy view only shows
//! walk-derived counts next to each store.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{StoreId, TemplateId, WalkId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkStatus {
    Scheduled,
    InProgress,
    Completed,
}

impl WalkStatus {
    /// Status only moves forward: scheduled, in progress, completed.
    #[must_use]
    pub fn can_advance_to(self, next: WalkStatus) -> bool {
        next > self
    }
}

impl std::fmt::Display for WalkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkStatus::Scheduled => write!(f, "scheduled"),
            WalkStatus::InProgress => write!(f, "in_progress"),
            WalkStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Walk {
    pub id: WalkId,
    pub store: StoreId,
    pub template: TemplateId,
    pub status: WalkStatus,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,
    /// Null until the walk is completed and scored.
    #[serde(default)]
    pub total_score: Option<Decimal>,
    #[serde(default)]
    pub location_verified: bool,
    #[serde(default)]
    pub qr_verified: bool,
    /// Metres between the evaluator and the store when the walk started.
    #[serde(default)]
    pub verification_distance: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkCounts {
    pub total: u32,
    pub completed: u32,
}

/// Tally walks per store.
#[must_use]
pub fn walk_counts(walks: &[Walk]) -> HashMap<StoreId, WalkCounts> {
    let mut counts: HashMap<StoreId, WalkCounts> = HashMap::new();
    for walk in walks {
        let entry = counts.entry(walk.store).or_default();
        entry.total += 1;
        if walk.status == WalkStatus::Completed {
            entry.completed += 1;
        }
    }
    counts
}
