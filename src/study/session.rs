//! Stateless study session protocol.
//!
//! A session walks the due-set snapshot taken when it began. The caller carries a
//! [`SessionCursor`] between requests; the engine rebuilds everything else from the store:
//! - `answer` grades the card at the cursor's position and returns the advanced cursor
//! - `advance` either returns the card to show at the cursor's position or, once the
//!   snapshot is exhausted, finalizes the session and returns the streak summary
//!
//! Finalization is applied once per session. Replaying the completing request returns the
//! current streak without counting the session again.

use super::streak;
use crate::database::{db, lists, progress, stats};
use crate::database::StudySession;
use crate::error::{Result, StudyError, check_id};
use crate::models::{DueCard, Quality, SessionCursor, SessionStep, sm2};
use chrono::NaiveDate;
use rusqlite::Connection;

/// Starts a session over the learner's due cards, optionally restricted to one word list.
pub fn begin_session(
    learner_id: i64,
    list_id: Option<i64>,
    today: NaiveDate,
    conn: &Connection,
) -> Result<SessionCursor> {
    db::require_learner(learner_id, conn)?;
    if let Some(list_id) = list_id {
        lists::get_list(list_id, learner_id, conn)?;
    }

    let session_id = stats::create_study_session(learner_id, list_id, today, conn)?;
    log::debug!("Study session {} started for learner {}", session_id, learner_id);
    Ok(SessionCursor::start(session_id, list_id))
}

fn load_session(
    learner_id: i64,
    cursor: &SessionCursor,
    conn: &Connection,
) -> Result<StudySession> {
    check_id(learner_id, "learner")?;
    cursor.validate()?;

    let session = stats::get_study_session(cursor.session_id, learner_id, conn)?
        .ok_or_else(|| StudyError::not_found("Study session not found"))?;
    if session.list_id != cursor.list_id {
        return Err(StudyError::validation(
            "cursor list does not match the session's list",
        ));
    }
    Ok(session)
}

/// The session's due-set, as it stood when the session began.
fn snapshot(
    learner_id: i64,
    cursor: &SessionCursor,
    today: NaiveDate,
    limit: usize,
    conn: &Connection,
) -> Result<Vec<DueCard>> {
    progress::query_due(
        learner_id,
        cursor.list_id,
        Some(cursor.session_id),
        today,
        limit,
        conn,
    )
}

/// Grades the card currently shown and writes its new schedule.
///
/// The review state must belong to the learner (reported as not found otherwise) and must be
/// the card at the cursor's position. A card can be answered once per session.
pub fn answer(
    learner_id: i64,
    cursor: SessionCursor,
    review_state_id: i64,
    quality: u8,
    today: NaiveDate,
    limit: usize,
    conn: &Connection,
) -> Result<SessionCursor> {
    let quality = Quality::try_from(quality)?;
    check_id(review_state_id, "review state")?;
    let session = load_session(learner_id, &cursor, conn)?;

    let state = progress::get_review_state_by_id(review_state_id, learner_id, conn)?
        .ok_or_else(|| StudyError::not_found("Review state not found"))?;

    if session.finalized_on.is_some() {
        return Err(StudyError::Conflict("study session is already complete".to_string()));
    }
    if progress::answered_in_session(state.id, session.id, conn)? {
        log::warn!(
            "Ignoring repeated answer for review state {} in session {}",
            state.id,
            session.id
        );
        return Err(StudyError::Conflict(
            "card was already answered in this session".to_string(),
        ));
    }

    let cards = snapshot(learner_id, &cursor, today, limit, conn)?;
    let shown = cards.get(cursor.position as usize).map(|card| card.state.id);
    if shown != Some(state.id) {
        return Err(StudyError::validation(
            "stale cursor: review state is not the card at this position",
        ));
    }

    let result = sm2::schedule(&state, quality, today);
    progress::write_review_result(
        state.id,
        &result,
        quality.is_correct(),
        today,
        Some(session.id),
        conn,
    )?;
    log::debug!(
        "Review state {} answered with quality {}: interval {} days, next review {}",
        state.id,
        quality.value(),
        result.interval_days,
        result.next_review_date
    );

    Ok(cursor.advanced(quality.is_correct()))
}

/// Moves the session forward from `cursor`.
pub fn advance(
    learner_id: i64,
    cursor: SessionCursor,
    today: NaiveDate,
    limit: usize,
    conn: &Connection,
) -> Result<SessionStep> {
    let session = load_session(learner_id, &cursor, conn)?;

    if session.finalized_on.is_none() {
        let cards = snapshot(learner_id, &cursor, today, limit, conn)?;
        let total = cards.len();
        if let Some(card) = cards.into_iter().nth(cursor.position as usize) {
            return Ok(SessionStep::InProgress {
                cursor,
                card,
                total,
            });
        }
    }

    complete(learner_id, &session, &cursor, today, conn)
}

fn complete(
    learner_id: i64,
    session: &StudySession,
    cursor: &SessionCursor,
    today: NaiveDate,
    conn: &Connection,
) -> Result<SessionStep> {
    let tx = conn.unchecked_transaction()?;
    if session.finalized_on.is_none() {
        // Totals can only cover answers the store recorded for this session
        let answered = progress::count_answered_in_session(session.id, learner_id, &tx)?;
        if cursor.reviewed_count > answered {
            return Err(StudyError::validation(
                "cursor counts more answers than the session recorded",
            ));
        }
    }

    let claimed = stats::claim_session_finalization(
        cursor.session_id,
        learner_id,
        today,
        cursor.reviewed_count,
        cursor.correct_count,
        &tx,
    )?;

    let streak = if claimed {
        streak::finalize_session(
            learner_id,
            cursor.reviewed_count,
            cursor.correct_count,
            today,
            &tx,
        )?
    } else {
        log::warn!(
            "Study session {} was already finalized; streak left unchanged",
            cursor.session_id
        );
        stats::get_streak_state(learner_id, &tx)?
    };
    tx.commit()?;

    Ok(SessionStep::Completed {
        reviewed_count: cursor.reviewed_count,
        correct_count: cursor.correct_count,
        streak,
    })
}
