use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Item;

pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const MAX_MASTERY: i32 = 5;

/// Memory-strength record of one learner for one item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub id: i64,
    pub learner_id: i64,
    pub item_id: i64,
    pub mastery_level: i32,
    pub ease_factor: f64,
    pub interval_days: i32,
    pub next_review_date: NaiveDate,
    pub times_seen: i64,
    pub times_correct: i64,
    pub last_reviewed_date: Option<NaiveDate>,
}

/// An item paired with the learner's review state, as selected for study
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DueCard {
    pub item: Item,
    pub state: ReviewState,
}

/// Item in a word list, with the learner's progress when it has been enqueued
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    pub item: Item,
    pub state: Option<ReviewState>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryBreakdown {
    pub new_count: i64,
    pub learning_count: i64,
    pub mastered_count: i64,
}
