//! Review-state persistence: creation, answer write-back and due/unreviewed queries.

use super::db::{ITEM_COLUMNS, item_from_row};
use crate::error::Result;
use crate::models::{DueCard, MasteryBreakdown, ReviewState, ScheduleResult};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, named_params, params};

pub(crate) const STATE_COLUMNS: &str = "r.id, r.learner_id, r.item_id, r.mastery_level, \
     r.ease_factor, r.interval_days, r.next_review_date, r.times_seen, r.times_correct, \
     r.last_reviewed_date";

/// Reads a review state from ten consecutive columns starting at `start`
pub(crate) fn state_from_row(row: &Row, start: usize) -> rusqlite::Result<ReviewState> {
    Ok(ReviewState {
        id: row.get(start)?,
        learner_id: row.get(start + 1)?,
        item_id: row.get(start + 2)?,
        mastery_level: row.get(start + 3)?,
        ease_factor: row.get(start + 4)?,
        interval_days: row.get(start + 5)?,
        next_review_date: row.get(start + 6)?,
        times_seen: row.get(start + 7)?,
        times_correct: row.get(start + 8)?,
        last_reviewed_date: row.get(start + 9)?,
    })
}

pub fn get_review_state(
    learner_id: i64,
    item_id: i64,
    conn: &Connection,
) -> Result<Option<ReviewState>> {
    let state = conn
        .query_row(
            &format!(
                "SELECT {} FROM review_states r WHERE r.learner_id = ?1 AND r.item_id = ?2",
                STATE_COLUMNS
            ),
            params![learner_id, item_id],
            |row| state_from_row(row, 0),
        )
        .optional()?;
    Ok(state)
}

/// Looks a review state up by id, only if it belongs to `learner_id`
pub fn get_review_state_by_id(
    review_state_id: i64,
    learner_id: i64,
    conn: &Connection,
) -> Result<Option<ReviewState>> {
    let state = conn
        .query_row(
            &format!(
                "SELECT {} FROM review_states r WHERE r.id = ?1 AND r.learner_id = ?2",
                STATE_COLUMNS
            ),
            params![review_state_id, learner_id],
            |row| state_from_row(row, 0),
        )
        .optional()?;
    Ok(state)
}

/// Creates a fresh review state unless the learner already has one for the item.
///
/// Returns true when a row was created. An existing state is never reset.
pub fn upsert_review_state(
    learner_id: i64,
    item_id: i64,
    next_review_date: NaiveDate,
    conn: &Connection,
) -> Result<bool> {
    let created = conn.execute(
        "INSERT INTO review_states (learner_id, item_id, next_review_date)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(learner_id, item_id) DO NOTHING",
        params![learner_id, item_id, next_review_date],
    )?;
    Ok(created == 1)
}

/// Writes the scheduler's output back to one review state.
///
/// `session_id` marks the answer as part of a study session; the state's due date
/// before this answer is kept so the session's snapshot can be rebuilt later.
pub fn write_review_result(
    review_state_id: i64,
    result: &ScheduleResult,
    was_correct: bool,
    reviewed_on: NaiveDate,
    session_id: Option<i64>,
    conn: &Connection,
) -> Result<()> {
    conn.execute(
        "UPDATE review_states
         SET mastery_level      = :mastery,
             ease_factor        = :ease,
             interval_days      = :interval,
             next_review_date   = :next_review,
             times_seen         = times_seen + 1,
             times_correct      = times_correct + :correct,
             last_reviewed_date = :today,
             session_due_date   = CASE WHEN :session IS NULL THEN session_due_date
                                       ELSE next_review_date END,
             last_session_id    = COALESCE(:session, last_session_id)
         WHERE id = :id",
        named_params! {
            ":mastery": result.mastery_level,
            ":ease": result.ease_factor,
            ":interval": result.interval_days,
            ":next_review": result.next_review_date,
            ":correct": i64::from(was_correct),
            ":today": reviewed_on,
            ":session": session_id,
            ":id": review_state_id,
        },
    )?;
    Ok(())
}

/// True if the review state was already answered as part of `session_id`
pub fn answered_in_session(
    review_state_id: i64,
    session_id: i64,
    conn: &Connection,
) -> Result<bool> {
    let answered = conn
        .query_row(
            "SELECT 1 FROM review_states WHERE id = ?1 AND last_session_id = ?2",
            params![review_state_id, session_id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(answered.is_some())
}

/// Number of the learner's review states last answered as part of `session_id`
pub fn count_answered_in_session(
    session_id: i64,
    learner_id: i64,
    conn: &Connection,
) -> Result<u32> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM review_states WHERE last_session_id = ?1 AND learner_id = ?2",
        params![session_id, learner_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Due cards of one learner, earliest due date first.
///
/// With `session_id`, cards already answered in that session stay in the result at the
/// place their old due date gave them, which reproduces the set as it was at session start.
pub fn query_due(
    learner_id: i64,
    list_id: Option<i64>,
    session_id: Option<i64>,
    today: NaiveDate,
    limit: usize,
    conn: &Connection,
) -> Result<Vec<DueCard>> {
    let sql = format!(
        "SELECT {items}, {states}
         FROM review_states r
         JOIN items w ON w.id = r.item_id
         WHERE r.learner_id = :learner
           AND (:list IS NULL OR EXISTS (
                SELECT 1 FROM list_items li
                JOIN lists l ON l.id = li.list_id
                WHERE li.list_id = :list AND li.item_id = r.item_id AND l.learner_id = :learner))
           AND (r.next_review_date <= :today
                OR (:session IS NOT NULL AND r.last_session_id = :session))
         ORDER BY CASE WHEN :session IS NOT NULL AND r.last_session_id = :session
                       THEN r.session_due_date ELSE r.next_review_date END ASC,
                  r.id ASC
         LIMIT :limit",
        items = ITEM_COLUMNS,
        states = STATE_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let cards = stmt
        .query_map(
            named_params! {
                ":learner": learner_id,
                ":list": list_id,
                ":session": session_id,
                ":today": today,
                ":limit": limit as i64,
            },
            |row| {
                Ok(DueCard {
                    item: item_from_row(row, 0)?,
                    state: state_from_row(row, 6)?,
                })
            },
        )?
        .collect::<rusqlite::Result<Vec<DueCard>>>()?;
    Ok(cards)
}

/// Ids of items the learner has no review state for, in id order.
pub fn query_unreviewed(
    learner_id: i64,
    list_id: Option<i64>,
    level: Option<&str>,
    limit: Option<usize>,
    conn: &Connection,
) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT w.id FROM items w
         LEFT JOIN review_states r ON r.item_id = w.id AND r.learner_id = :learner
         WHERE r.id IS NULL
           AND (:level IS NULL OR w.level = :level)
           AND (:list IS NULL OR w.id IN (SELECT item_id FROM list_items WHERE list_id = :list))
         ORDER BY w.id
         LIMIT :limit",
    )?;
    let ids = stmt
        .query_map(
            named_params! {
                ":learner": learner_id,
                ":level": level,
                ":list": list_id,
                // SQLite treats a negative limit as no limit
                ":limit": limit.map(|l| l as i64).unwrap_or(-1),
            },
            |row| row.get(0),
        )?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(ids)
}

pub fn count_due(learner_id: i64, today: NaiveDate, conn: &Connection) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM review_states WHERE learner_id = ?1 AND next_review_date <= ?2",
        params![learner_id, today],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_unlearned(learner_id: i64, conn: &Connection) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM items w
         LEFT JOIN review_states r ON r.item_id = w.id AND r.learner_id = ?1
         WHERE r.id IS NULL",
        params![learner_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Splits the item bank into new, learning (mastery 1-4) and mastered (mastery 5) items.
pub fn mastery_breakdown(learner_id: i64, conn: &Connection) -> Result<MasteryBreakdown> {
    let (learning, mastered) = conn.query_row(
        "SELECT COALESCE(SUM(CASE WHEN mastery_level BETWEEN 1 AND 4 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN mastery_level >= 5 THEN 1 ELSE 0 END), 0)
         FROM review_states WHERE learner_id = ?1",
        params![learner_id],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
    )?;

    Ok(MasteryBreakdown {
        new_count: count_unlearned(learner_id, conn)?,
        learning_count: learning,
        mastered_count: mastered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::db::{add_item, create_learner, open_in_memory};
    use crate::database::lists::{add_item_to_list, create_list};
    use crate::models::NewItem;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn setup(words: &[&str]) -> (Connection, i64, Vec<i64>) {
        let conn = open_in_memory().unwrap();
        let learner = create_learner("ada", &conn).unwrap();
        let ids = words
            .iter()
            .map(|w| add_item(&NewItem::new(w, "meaning"), &conn).unwrap())
            .collect();
        (conn, learner.id, ids)
    }

    #[test]
    fn test_upsert_does_not_reset_existing_state() {
        let (conn, learner, ids) = setup(&["one"]);

        assert!(upsert_review_state(learner, ids[0], date(1), &conn).unwrap());
        let state = get_review_state(learner, ids[0], &conn).unwrap().unwrap();
        let result = ScheduleResult {
            interval_days: 3,
            ease_factor: 2.44,
            next_review_date: date(4),
            mastery_level: 1,
        };
        write_review_result(state.id, &result, true, date(1), None, &conn).unwrap();

        assert!(!upsert_review_state(learner, ids[0], date(2), &conn).unwrap());
        let state = get_review_state(learner, ids[0], &conn).unwrap().unwrap();
        assert_eq!(state.next_review_date, date(4));
        assert_eq!(state.mastery_level, 1);
    }

    #[test]
    fn test_write_review_result_counts() {
        let (conn, learner, ids) = setup(&["one"]);
        upsert_review_state(learner, ids[0], date(1), &conn).unwrap();
        let state = get_review_state(learner, ids[0], &conn).unwrap().unwrap();
        assert_eq!(state.mastery_level, 0);
        assert_eq!(state.ease_factor, 2.5);
        assert_eq!(state.interval_days, 1);
        assert!(state.last_reviewed_date.is_none());

        let missed = ScheduleResult {
            interval_days: 1,
            ease_factor: 2.5,
            next_review_date: date(2),
            mastery_level: 0,
        };
        write_review_result(state.id, &missed, false, date(1), None, &conn).unwrap();
        write_review_result(state.id, &missed, true, date(2), None, &conn).unwrap();

        let state = get_review_state_by_id(state.id, learner, &conn).unwrap().unwrap();
        assert_eq!(state.times_seen, 2);
        assert_eq!(state.times_correct, 1);
        assert_eq!(state.last_reviewed_date, Some(date(2)));
    }

    #[test]
    fn test_count_answered_in_session() {
        let (conn, learner, ids) = setup(&["one", "two", "three"]);
        let other = create_learner("eve", &conn).unwrap();
        for id in &ids {
            upsert_review_state(learner, *id, date(1), &conn).unwrap();
        }
        upsert_review_state(other.id, ids[0], date(1), &conn).unwrap();

        let result = ScheduleResult {
            interval_days: 3,
            ease_factor: 2.44,
            next_review_date: date(4),
            mastery_level: 1,
        };
        for id in &ids[..2] {
            let state = get_review_state(learner, *id, &conn).unwrap().unwrap();
            write_review_result(state.id, &result, true, date(1), Some(7), &conn).unwrap();
        }
        let state = get_review_state(other.id, ids[0], &conn).unwrap().unwrap();
        write_review_result(state.id, &result, true, date(1), Some(7), &conn).unwrap();

        assert_eq!(count_answered_in_session(7, learner, &conn).unwrap(), 2);
        assert_eq!(count_answered_in_session(7, other.id, &conn).unwrap(), 1);
        assert_eq!(count_answered_in_session(8, learner, &conn).unwrap(), 0);
    }

    #[test]
    fn test_get_by_id_is_owner_scoped() {
        let (conn, learner, ids) = setup(&["one"]);
        let other = create_learner("eve", &conn).unwrap();
        upsert_review_state(learner, ids[0], date(1), &conn).unwrap();
        let state = get_review_state(learner, ids[0], &conn).unwrap().unwrap();

        assert!(get_review_state_by_id(state.id, other.id, &conn).unwrap().is_none());
    }

    #[test]
    fn test_query_due_orders_and_filters() {
        let (conn, learner, ids) = setup(&["a", "b", "c", "d"]);
        upsert_review_state(learner, ids[0], date(5), &conn).unwrap();
        upsert_review_state(learner, ids[1], date(3), &conn).unwrap();
        upsert_review_state(learner, ids[2], date(9), &conn).unwrap();
        upsert_review_state(learner, ids[3], date(3), &conn).unwrap();

        let due = query_due(learner, None, None, date(5), 20, &conn).unwrap();
        let words: Vec<_> = due.iter().map(|c| c.item.word.as_str()).collect();
        assert_eq!(words, vec!["b", "d", "a"]);

        let due = query_due(learner, None, None, date(5), 2, &conn).unwrap();
        assert_eq!(due.len(), 2);
    }

    #[test]
    fn test_query_due_list_scope() {
        let (conn, learner, ids) = setup(&["a", "b"]);
        let list = create_list(learner, "verbs", None, &conn).unwrap();
        add_item_to_list(list.id, ids[1], learner, &conn).unwrap();
        upsert_review_state(learner, ids[0], date(1), &conn).unwrap();
        upsert_review_state(learner, ids[1], date(1), &conn).unwrap();

        let due = query_due(learner, Some(list.id), None, date(1), 20, &conn).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].item.word, "b");
    }

    #[test]
    fn test_query_unreviewed_by_level() {
        let conn = open_in_memory().unwrap();
        let learner = create_learner("ada", &conn).unwrap().id;
        let sat = add_item(&NewItem::new("abate", "lessen").with_level("sat"), &conn).unwrap();
        add_item(&NewItem::new("abhor", "hate").with_level("gre"), &conn).unwrap();
        let sat2 = add_item(&NewItem::new("acumen", "insight").with_level("sat"), &conn).unwrap();

        let ids = query_unreviewed(learner, None, Some("sat"), Some(10), &conn).unwrap();
        assert_eq!(ids, vec![sat, sat2]);

        upsert_review_state(learner, sat, date(1), &conn).unwrap();
        let ids = query_unreviewed(learner, None, Some("sat"), None, &conn).unwrap();
        assert_eq!(ids, vec![sat2]);
    }

    #[test]
    fn test_mastery_breakdown() {
        let (conn, learner, ids) = setup(&["a", "b", "c", "d"]);
        for id in &ids[..3] {
            upsert_review_state(learner, *id, date(1), &conn).unwrap();
        }
        conn.execute(
            "UPDATE review_states SET mastery_level = 5 WHERE item_id = ?1",
            params![ids[0]],
        )
        .unwrap();
        conn.execute(
            "UPDATE review_states SET mastery_level = 2 WHERE item_id = ?1",
            params![ids[1]],
        )
        .unwrap();

        let breakdown = mastery_breakdown(learner, &conn).unwrap();
        assert_eq!(
            breakdown,
            MasteryBreakdown {
                new_count: 1,
                learning_count: 1,
                mastered_count: 1,
            }
        );
        assert_eq!(count_due(learner, date(1), &conn).unwrap(), 3);
    }
}
