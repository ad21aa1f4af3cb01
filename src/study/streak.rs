//! Streak and lifetime-total bookkeeping at the end of a study session.

use crate::database::stats;
use crate::error::{Result, StudyError, check_id};
use crate::models::StreakState;
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;

/// Folds one finished session into a streak record.
///
/// Studying again on the same day keeps the streak, studying the day after extends it,
/// anything else starts over at 1. A session with no answered cards still counts as a day.
pub fn apply_session(
    streak: &StreakState,
    reviewed_count: u32,
    correct_count: u32,
    today: NaiveDate,
) -> StreakState {
    let yesterday = today - Duration::days(1);
    let current_streak = match streak.last_study_date {
        Some(last) if last == today => streak.current_streak,
        Some(last) if last == yesterday => streak.current_streak + 1,
        _ => 1,
    };

    StreakState {
        learner_id: streak.learner_id,
        current_streak,
        longest_streak: streak.longest_streak.max(current_streak),
        last_study_date: Some(today),
        total_reviewed: streak.total_reviewed + i64::from(reviewed_count),
        total_correct: streak.total_correct + i64::from(correct_count),
    }
}

/// Reads, updates and writes back the learner's streak record.
///
/// Every call is applied; the session walker guards against finalizing the same session twice.
pub fn finalize_session(
    learner_id: i64,
    reviewed_count: u32,
    correct_count: u32,
    today: NaiveDate,
    conn: &Connection,
) -> Result<StreakState> {
    check_id(learner_id, "learner")?;
    if correct_count > reviewed_count {
        return Err(StudyError::validation(
            "correct count cannot exceed reviewed count",
        ));
    }

    let current = stats::get_streak_state(learner_id, conn)?;
    let updated = apply_session(&current, reviewed_count, correct_count, today);
    stats::write_streak_state(&updated, conn)?;

    log::info!(
        "Session finalized for learner {}: {} reviewed, {} correct, streak {}",
        learner_id,
        reviewed_count,
        correct_count,
        updated.current_streak
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::db::{create_learner, open_in_memory};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, d).unwrap()
    }

    fn streak(current: i64, longest: i64, last: Option<NaiveDate>) -> StreakState {
        StreakState {
            learner_id: 1,
            current_streak: current,
            longest_streak: longest,
            last_study_date: last,
            total_reviewed: 10,
            total_correct: 5,
        }
    }

    #[test]
    fn test_first_session_starts_streak() {
        let next = apply_session(&streak(0, 0, None), 4, 3, date(10));
        assert_eq!(next.current_streak, 1);
        assert_eq!(next.longest_streak, 1);
        assert_eq!(next.last_study_date, Some(date(10)));
        assert_eq!(next.total_reviewed, 14);
        assert_eq!(next.total_correct, 8);
    }

    #[test]
    fn test_consecutive_day_extends_streak() {
        let next = apply_session(&streak(3, 3, Some(date(9))), 1, 1, date(10));
        assert_eq!(next.current_streak, 4);
        assert_eq!(next.longest_streak, 4);
    }

    #[test]
    fn test_same_day_keeps_streak() {
        let next = apply_session(&streak(3, 7, Some(date(10))), 2, 0, date(10));
        assert_eq!(next.current_streak, 3);
        assert_eq!(next.longest_streak, 7);
        assert_eq!(next.total_reviewed, 12);
    }

    #[test]
    fn test_gap_resets_streak() {
        let next = apply_session(&streak(5, 5, Some(date(7))), 2, 2, date(10));
        assert_eq!(next.current_streak, 1);
        assert_eq!(next.longest_streak, 5);
    }

    #[test]
    fn test_month_boundary_counts_as_consecutive() {
        let last = NaiveDate::from_ymd_opt(2024, 7, 31).unwrap();
        let next = apply_session(&streak(2, 2, Some(last)), 1, 1, date(1));
        assert_eq!(next.current_streak, 3);
    }

    #[test]
    fn test_zero_card_session_counts_as_study_day() {
        let next = apply_session(&streak(1, 1, Some(date(9))), 0, 0, date(10));
        assert_eq!(next.current_streak, 2);
        assert_eq!(next.last_study_date, Some(date(10)));
        assert_eq!(next.total_reviewed, 10);
    }

    #[test]
    fn test_finalize_session_persists() {
        let conn = open_in_memory().unwrap();
        let ada = create_learner("ada", &conn).unwrap().id;

        finalize_session(ada, 3, 2, date(1), &conn).unwrap();
        let day2 = finalize_session(ada, 5, 5, date(2), &conn).unwrap();
        assert_eq!(day2.current_streak, 2);
        assert_eq!(day2.total_reviewed, 8);
        assert_eq!(day2.total_correct, 7);
        assert_eq!(stats::get_streak_state(ada, &conn).unwrap(), day2);
    }

    #[test]
    fn test_finalize_session_validates() {
        let conn = open_in_memory().unwrap();
        let ada = create_learner("ada", &conn).unwrap().id;

        assert!(matches!(
            finalize_session(ada, 1, 2, date(1), &conn),
            Err(StudyError::Validation(_))
        ));
        assert!(matches!(
            finalize_session(4040, 1, 1, date(1), &conn),
            Err(StudyError::NotFound(_))
        ));
    }
}
