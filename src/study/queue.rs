//! Admission of never-reviewed items into a learner's review pool.
//!
//! All four modes are idempotent: running them again never duplicates or resets a review state,
//! and each returns only the number of states it newly created.

use crate::database::{db, lists, progress};
use crate::error::{Result, StudyError, check_id};
use crate::models::Level;
use chrono::NaiveDate;
use rusqlite::Connection;

fn admit(
    learner_id: i64,
    item_ids: &[i64],
    today: NaiveDate,
    conn: &Connection,
) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut created = 0;
    for &item_id in item_ids {
        if progress::upsert_review_state(learner_id, item_id, today, &tx)? {
            created += 1;
        }
    }
    tx.commit()?;
    Ok(created)
}

fn check_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(StudyError::validation("count must be positive"));
    }
    Ok(())
}

/// Enqueues one item, unless the learner already studies it.
pub fn enqueue_item(
    learner_id: i64,
    item_id: i64,
    today: NaiveDate,
    conn: &Connection,
) -> Result<usize> {
    db::require_learner(learner_id, conn)?;
    check_id(item_id, "item")?;
    if db::get_item(item_id, conn)?.is_none() {
        return Err(StudyError::not_found("Item not found"));
    }

    let created = admit(learner_id, &[item_id], today, conn)?;
    log::debug!("Item {} enqueued for learner {} ({} new)", item_id, learner_id, created);
    Ok(created)
}

/// Enqueues up to `count` new items, lowest item id first.
pub fn enqueue_new(
    learner_id: i64,
    count: usize,
    today: NaiveDate,
    conn: &Connection,
) -> Result<usize> {
    db::require_learner(learner_id, conn)?;
    check_count(count)?;

    let ids = progress::query_unreviewed(learner_id, None, None, Some(count), conn)?;
    let created = admit(learner_id, &ids, today, conn)?;
    log::info!("Enqueued {} new items for learner {}", created, learner_id);
    Ok(created)
}

/// Same as [`enqueue_new`], restricted to one difficulty level.
pub fn enqueue_new_at_level(
    learner_id: i64,
    count: usize,
    level: &str,
    today: NaiveDate,
    conn: &Connection,
) -> Result<usize> {
    db::require_learner(learner_id, conn)?;
    check_count(count)?;
    let level: Level = level.parse()?;

    let ids = progress::query_unreviewed(learner_id, None, Some(level.tag()), Some(count), conn)?;
    let created = admit(learner_id, &ids, today, conn)?;
    log::info!(
        "Enqueued {} new {} items for learner {}",
        created,
        level.label(),
        learner_id
    );
    Ok(created)
}

/// Enqueues every item of a word list the learner does not study yet.
pub fn enqueue_list(
    learner_id: i64,
    list_id: i64,
    today: NaiveDate,
    conn: &Connection,
) -> Result<usize> {
    db::require_learner(learner_id, conn)?;
    lists::get_list(list_id, learner_id, conn)?;

    let ids = progress::query_unreviewed(learner_id, Some(list_id), None, None, conn)?;
    let created = admit(learner_id, &ids, today, conn)?;
    log::info!("Enqueued {} items of list {} for learner {}", created, list_id, learner_id);
    Ok(created)
}
