//! Simplified SM-2 spaced repetition scheduling.
//!
//! Every review state carries an interval, an ease factor and a mastery level:
//! - Missed and hard answers (quality < 3): interval resets to 1 day, ease is kept,
//!   mastery drops by one (never below 0)
//! - Good and easy answers: interval grows by the ease factor, ease moves by
//!   `0.1 - (5 - q) * 0.08` and never falls below 1.3, mastery rises by one (at most 5)
//! - The next review date is always `today + interval`, with `today` supplied by the caller

use super::review_state::{MAX_MASTERY, MIN_EASE_FACTOR};
use super::{Quality, ReviewState};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Longest interval a card can be scheduled out (100 years)
pub const MAX_INTERVAL_DAYS: i32 = 36_500;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub interval_days: i32,
    pub ease_factor: f64,
    pub next_review_date: NaiveDate,
    pub mastery_level: i32,
}

/// Calculates the next scheduling state from an answer.
pub fn compute_next_state(
    quality: Quality,
    current_interval_days: i32,
    current_ease_factor: f64,
    current_mastery_level: i32,
    today: NaiveDate,
) -> ScheduleResult {
    let (interval_days, ease_factor, mastery_level) = if !quality.is_correct() {
        (1, current_ease_factor, (current_mastery_level - 1).max(0))
    } else {
        let q = quality.value() as f64;
        let interval = (current_interval_days as f64 * current_ease_factor)
            .round()
            .clamp(1.0, MAX_INTERVAL_DAYS as f64) as i32;
        let ease = (current_ease_factor + 0.1 - (5.0 - q) * 0.08).max(MIN_EASE_FACTOR);
        (interval, ease, (current_mastery_level + 1).min(MAX_MASTERY))
    };

    ScheduleResult {
        interval_days,
        ease_factor,
        next_review_date: today
            .checked_add_days(Days::new(interval_days as u64))
            .unwrap_or(NaiveDate::MAX),
        mastery_level,
    }
}

/// Applies [`compute_next_state`] to a stored review state.
pub fn schedule(state: &ReviewState, quality: Quality, today: NaiveDate) -> ScheduleResult {
    compute_next_state(
        quality,
        state.interval_days,
        state.ease_factor,
        state.mastery_level,
        today,
    )
}
