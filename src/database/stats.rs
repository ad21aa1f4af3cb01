//! Streak records and the study-session finalization ledger.

use crate::error::{Result, StudyError};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use crate::models::StreakState;

/// Identity of a study session. Progress is never stored here, only whether it was finalized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: i64,
    pub learner_id: i64,
    pub list_id: Option<i64>,
    pub started_on: NaiveDate,
    pub finalized_on: Option<NaiveDate>,
}

pub fn get_streak_state(learner_id: i64, conn: &Connection) -> Result<StreakState> {
    conn.query_row(
        "SELECT learner_id, current_streak, longest_streak, last_study_date,
                total_reviewed, total_correct
         FROM streaks WHERE learner_id = ?1",
        params![learner_id],
        |row| {
            Ok(StreakState {
                learner_id: row.get(0)?,
                current_streak: row.get(1)?,
                longest_streak: row.get(2)?,
                last_study_date: row.get(3)?,
                total_reviewed: row.get(4)?,
                total_correct: row.get(5)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| StudyError::not_found("Learner not found"))
}

pub fn write_streak_state(streak: &StreakState, conn: &Connection) -> Result<()> {
    conn.execute(
        "UPDATE streaks
         SET current_streak = ?1, longest_streak = ?2, last_study_date = ?3,
             total_reviewed = ?4, total_correct = ?5
         WHERE learner_id = ?6",
        params![
            streak.current_streak,
            streak.longest_streak,
            streak.last_study_date,
            streak.total_reviewed,
            streak.total_correct,
            streak.learner_id
        ],
    )?;
    Ok(())
}

pub fn create_study_session(
    learner_id: i64,
    list_id: Option<i64>,
    started_on: NaiveDate,
    conn: &Connection,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO study_sessions (learner_id, list_id, started_on) VALUES (?1, ?2, ?3)",
        params![learner_id, list_id, started_on],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetches a session owned by `learner_id`
pub fn get_study_session(
    session_id: i64,
    learner_id: i64,
    conn: &Connection,
) -> Result<Option<StudySession>> {
    let session = conn
        .query_row(
            "SELECT id, learner_id, list_id, started_on, finalized_on
             FROM study_sessions WHERE id = ?1 AND learner_id = ?2",
            params![session_id, learner_id],
            |row| {
                Ok(StudySession {
                    id: row.get(0)?,
                    learner_id: row.get(1)?,
                    list_id: row.get(2)?,
                    started_on: row.get(3)?,
                    finalized_on: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(session)
}

/// Marks a session finalized. Returns false if it already was, so callers apply totals once.
pub fn claim_session_finalization(
    session_id: i64,
    learner_id: i64,
    finalized_on: NaiveDate,
    reviewed_count: u32,
    correct_count: u32,
    conn: &Connection,
) -> Result<bool> {
    let claimed = conn.execute(
        "UPDATE study_sessions
         SET finalized_on = ?1, reviewed_count = ?2, correct_count = ?3
         WHERE id = ?4 AND learner_id = ?5 AND finalized_on IS NULL",
        params![finalized_on, reviewed_count, correct_count, session_id, learner_id],
    )?;
    Ok(claimed == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::db::{create_learner, open_in_memory};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    #[test]
    fn test_new_learner_streak_is_empty() {
        let conn = open_in_memory().unwrap();
        let learner = create_learner("ada", &conn).unwrap();

        let streak = get_streak_state(learner.id, &conn).unwrap();
        assert_eq!(
            streak,
            StreakState {
                learner_id: learner.id,
                ..StreakState::default()
            }
        );
        assert!(matches!(get_streak_state(999, &conn), Err(StudyError::NotFound(_))));
    }

    #[test]
    fn test_write_streak_state() {
        let conn = open_in_memory().unwrap();
        let learner = create_learner("ada", &conn).unwrap();
        let streak = StreakState {
            learner_id: learner.id,
            current_streak: 2,
            longest_streak: 4,
            last_study_date: Some(date(3)),
            total_reviewed: 30,
            total_correct: 21,
        };

        write_streak_state(&streak, &conn).unwrap();
        assert_eq!(get_streak_state(learner.id, &conn).unwrap(), streak);
    }

    #[test]
    fn test_finalization_claimed_once() {
        let conn = open_in_memory().unwrap();
        let learner = create_learner("ada", &conn).unwrap();
        let session = create_study_session(learner.id, None, date(1), &conn).unwrap();

        assert!(claim_session_finalization(session, learner.id, date(1), 3, 2, &conn).unwrap());
        assert!(!claim_session_finalization(session, learner.id, date(1), 3, 2, &conn).unwrap());

        let stored = get_study_session(session, learner.id, &conn).unwrap().unwrap();
        assert_eq!(stored.finalized_on, Some(date(1)));
    }

    #[test]
    fn test_session_is_owner_scoped() {
        let conn = open_in_memory().unwrap();
        let ada = create_learner("ada", &conn).unwrap();
        let eve = create_learner("eve", &conn).unwrap();
        let session = create_study_session(ada.id, None, date(1), &conn).unwrap();

        assert!(get_study_session(session, eve.id, &conn).unwrap().is_none());
        assert!(!claim_session_finalization(session, eve.id, date(1), 0, 0, &conn).unwrap());
    }
}
