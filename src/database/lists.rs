//! Word list operations. Every list is owned by one learner and is invisible to others.

use super::db::{ITEM_COLUMNS, get_item, item_from_row, require_learner};
use super::progress::{STATE_COLUMNS, state_from_row};
use crate::error::{Result, StudyError, check_id, is_unique_violation};
use crate::models::word_list::MAX_LIST_NAME_LEN;
use crate::models::{ListEntry, WordList};
use rusqlite::{Connection, OptionalExtension, params};

fn clean_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StudyError::validation("list name is required"));
    }
    if name.chars().count() > MAX_LIST_NAME_LEN {
        return Err(StudyError::validation(format!(
            "list name must be {} characters or fewer",
            MAX_LIST_NAME_LEN
        )));
    }
    Ok(name)
}

fn name_conflict(err: rusqlite::Error) -> StudyError {
    if is_unique_violation(&err) {
        StudyError::Conflict("a list with that name already exists".to_string())
    } else {
        err.into()
    }
}

fn list_not_found() -> StudyError {
    StudyError::not_found("List not found")
}

pub fn create_list(
    learner_id: i64,
    name: &str,
    description: Option<&str>,
    conn: &Connection,
) -> Result<WordList> {
    require_learner(learner_id, conn)?;
    let name = clean_name(name)?;
    let description = description.map(str::trim).filter(|d| !d.is_empty());

    conn.execute(
        "INSERT INTO lists (learner_id, name, description) VALUES (?1, ?2, ?3)",
        params![learner_id, name, description],
    )
    .map_err(name_conflict)?;

    let id = conn.last_insert_rowid();
    log::info!("List '{}' created for learner {}", name, learner_id);
    get_list(id, learner_id, conn)
}

/// Fetches a list owned by `learner_id`; other learners' lists are reported as missing
pub fn get_list(list_id: i64, learner_id: i64, conn: &Connection) -> Result<WordList> {
    check_id(list_id, "list")?;
    conn.query_row(
        "SELECT id, learner_id, name, description, created_at
         FROM lists WHERE id = ?1 AND learner_id = ?2",
        params![list_id, learner_id],
        |row| {
            Ok(WordList {
                id: row.get(0)?,
                learner_id: row.get(1)?,
                name: row.get(2)?,
                description: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )
    .optional()?
    .ok_or_else(list_not_found)
}

/// All lists of a learner, newest first
pub fn get_lists(learner_id: i64, conn: &Connection) -> Result<Vec<WordList>> {
    let mut stmt = conn.prepare(
        "SELECT id, learner_id, name, description, created_at
         FROM lists WHERE learner_id = ?1 ORDER BY created_at DESC, id DESC",
    )?;
    let lists = stmt
        .query_map(params![learner_id], |row| {
            Ok(WordList {
                id: row.get(0)?,
                learner_id: row.get(1)?,
                name: row.get(2)?,
                description: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<WordList>>>()?;
    Ok(lists)
}

pub fn rename_list(
    list_id: i64,
    learner_id: i64,
    name: &str,
    description: Option<&str>,
    conn: &Connection,
) -> Result<WordList> {
    let current = get_list(list_id, learner_id, conn)?;
    let name = clean_name(name)?;
    let description = description
        .map(|d| d.trim().to_string())
        .or(current.description);

    conn.execute(
        "UPDATE lists SET name = ?1, description = ?2 WHERE id = ?3 AND learner_id = ?4",
        params![name, description, list_id, learner_id],
    )
    .map_err(name_conflict)?;

    get_list(list_id, learner_id, conn)
}

/// Deletes a list and its memberships. Review states of its items are kept.
pub fn delete_list(list_id: i64, learner_id: i64, conn: &Connection) -> Result<()> {
    get_list(list_id, learner_id, conn)?;
    conn.execute(
        "DELETE FROM lists WHERE id = ?1 AND learner_id = ?2",
        params![list_id, learner_id],
    )?;
    log::info!("List {} deleted", list_id);
    Ok(())
}

/// Adds an item to a list; adding it twice is a no-op.
pub fn add_item_to_list(
    list_id: i64,
    item_id: i64,
    learner_id: i64,
    conn: &Connection,
) -> Result<()> {
    get_list(list_id, learner_id, conn)?;
    check_id(item_id, "item")?;
    if get_item(item_id, conn)?.is_none() {
        return Err(StudyError::not_found("Item not found"));
    }

    conn.execute(
        "INSERT OR IGNORE INTO list_items (list_id, item_id) VALUES (?1, ?2)",
        params![list_id, item_id],
    )?;
    Ok(())
}

pub fn remove_item_from_list(
    list_id: i64,
    item_id: i64,
    learner_id: i64,
    conn: &Connection,
) -> Result<()> {
    get_list(list_id, learner_id, conn)?;
    conn.execute(
        "DELETE FROM list_items WHERE list_id = ?1 AND item_id = ?2",
        params![list_id, item_id],
    )?;
    Ok(())
}

pub fn list_item_count(list_id: i64, conn: &Connection) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM list_items WHERE list_id = ?1",
        params![list_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// The learner's lists, newest first, each with its number of items
pub fn get_lists_with_counts(learner_id: i64, conn: &Connection) -> Result<Vec<(WordList, i64)>> {
    get_lists(learner_id, conn)?
        .into_iter()
        .map(|list| {
            let count = list_item_count(list.id, conn)?;
            Ok((list, count))
        })
        .collect()
}

/// Items of a list in alphabetical order, with the learner's review state where one exists
pub fn get_list_items(list_id: i64, learner_id: i64, conn: &Connection) -> Result<Vec<ListEntry>> {
    get_list(list_id, learner_id, conn)?;

    let sql = format!(
        "SELECT {items}, {states}
         FROM items w
         JOIN list_items li ON li.item_id = w.id AND li.list_id = ?1
         LEFT JOIN review_states r ON r.item_id = w.id AND r.learner_id = ?2
         ORDER BY w.word",
        items = ITEM_COLUMNS,
        states = STATE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map(params![list_id, learner_id], |row| {
            let state_id: Option<i64> = row.get(6)?;
            Ok(ListEntry {
                item: item_from_row(row, 0)?,
                state: match state_id {
                    Some(_) => Some(state_from_row(row, 6)?),
                    None => None,
                },
            })
        })?
        .collect::<rusqlite::Result<Vec<ListEntry>>>()?;
    Ok(entries)
}
