use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Running study totals of one learner
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub learner_id: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_study_date: Option<NaiveDate>,
    pub total_reviewed: i64,
    pub total_correct: i64,
}
