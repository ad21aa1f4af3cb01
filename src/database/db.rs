//! Database operations for the vocabulary trainer
//!
//! Handles SQLite initialization, the simulated study clock, learners and the
//! item bank. Progress, word lists and streak bookkeeping live in sibling modules.

use crate::error::{Result, StudyError, check_id, is_unique_violation};
use crate::models::{Item, Learner, NewItem};
use chrono::{Datelike, Duration, Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS app_state (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS learners (
        id         INTEGER PRIMARY KEY,
        username   TEXT NOT NULL UNIQUE COLLATE NOCASE,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS items (
        id             INTEGER PRIMARY KEY,
        word           TEXT NOT NULL UNIQUE,
        definition     TEXT NOT NULL,
        part_of_speech TEXT,
        example        TEXT,
        level          TEXT
    );

    CREATE TABLE IF NOT EXISTS lists (
        id          INTEGER PRIMARY KEY,
        learner_id  INTEGER NOT NULL REFERENCES learners(id) ON DELETE CASCADE,
        name        TEXT NOT NULL,
        description TEXT,
        created_at  TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(learner_id, name)
    );

    CREATE TABLE IF NOT EXISTS list_items (
        list_id  INTEGER NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
        item_id  INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
        added_at TEXT NOT NULL DEFAULT (datetime('now')),
        PRIMARY KEY (list_id, item_id)
    );

    CREATE TABLE IF NOT EXISTS review_states (
        id                 INTEGER PRIMARY KEY,
        learner_id         INTEGER NOT NULL REFERENCES learners(id) ON DELETE CASCADE,
        item_id            INTEGER NOT NULL REFERENCES items(id),
        mastery_level      INTEGER NOT NULL DEFAULT 0,
        ease_factor        REAL    NOT NULL DEFAULT 2.5,
        interval_days      INTEGER NOT NULL DEFAULT 1,
        next_review_date   TEXT    NOT NULL,
        times_seen         INTEGER NOT NULL DEFAULT 0,
        times_correct      INTEGER NOT NULL DEFAULT 0,
        last_reviewed_date TEXT,
        last_session_id    INTEGER,
        session_due_date   TEXT,
        UNIQUE(learner_id, item_id)
    );

    CREATE TABLE IF NOT EXISTS streaks (
        learner_id      INTEGER PRIMARY KEY REFERENCES learners(id) ON DELETE CASCADE,
        current_streak  INTEGER NOT NULL DEFAULT 0,
        longest_streak  INTEGER NOT NULL DEFAULT 0,
        last_study_date TEXT,
        total_reviewed  INTEGER NOT NULL DEFAULT 0,
        total_correct   INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS study_sessions (
        id             INTEGER PRIMARY KEY,
        learner_id     INTEGER NOT NULL REFERENCES learners(id) ON DELETE CASCADE,
        list_id        INTEGER,
        started_on     TEXT NOT NULL,
        finalized_on   TEXT,
        reviewed_count INTEGER,
        correct_count  INTEGER
    );

    CREATE INDEX IF NOT EXISTS idx_review_states_due
        ON review_states(learner_id, next_review_date);
"#;

/// Opens (or creates) the database file and makes sure the schema exists
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_database(&conn)?;
    Ok(conn)
}

/// Fresh private database, used by tests
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_database(&conn)?;
    Ok(conn)
}

/// Creates all tables and sets the study clock to the local date if it was never set.
pub fn init_database(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.execute_batch(SCHEMA)?;

    let today = Local::now().date_naive();
    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![today],
    )?;

    Ok(())
}

// ===== Study clock =====

/// Retrieves the date the application treats as today
pub fn get_current_date(conn: &Connection) -> Result<NaiveDate> {
    let date = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'current_date'",
        [],
        |row| row.get(0),
    )?;
    Ok(date)
}

pub fn set_current_date(date: NaiveDate, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO app_state (key, value) VALUES ('current_date', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![date],
    )?;
    Ok(())
}

/// Moves the study clock one day forward (for exercising due dates)
pub fn advance_day(conn: &Connection) -> Result<NaiveDate> {
    let next_day = get_current_date(conn)? + Duration::days(1);
    set_current_date(next_day, conn)?;
    log::info!("Study clock advanced to {}", next_day);
    Ok(next_day)
}

// ===== Learners =====

/// Registers a learner together with their empty streak record.
pub fn create_learner(username: &str, conn: &Connection) -> Result<Learner> {
    let username = username.trim();
    if username.is_empty() {
        return Err(StudyError::validation("username is required"));
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute("INSERT INTO learners (username) VALUES (?1)", params![username])
        .map_err(|e| {
            if is_unique_violation(&e) {
                StudyError::Conflict(format!("learner '{}' already exists", username))
            } else {
                e.into()
            }
        })?;
    let id = tx.last_insert_rowid();
    tx.execute("INSERT INTO streaks (learner_id) VALUES (?1)", params![id])?;
    tx.commit()?;

    log::info!("Learner '{}' created with id {}", username, id);
    Ok(Learner {
        id,
        username: username.to_string(),
    })
}

pub fn get_learner(learner_id: i64, conn: &Connection) -> Result<Option<Learner>> {
    let learner = conn
        .query_row(
            "SELECT id, username FROM learners WHERE id = ?1",
            params![learner_id],
            |row| {
                Ok(Learner {
                    id: row.get(0)?,
                    username: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(learner)
}

/// Fetches a learner that must exist, for operations that write on their behalf
pub fn require_learner(learner_id: i64, conn: &Connection) -> Result<Learner> {
    check_id(learner_id, "learner")?;
    get_learner(learner_id, conn)?.ok_or_else(|| StudyError::not_found("Learner not found"))
}

pub fn get_learner_by_name(username: &str, conn: &Connection) -> Result<Option<Learner>> {
    let learner = conn
        .query_row(
            "SELECT id, username FROM learners WHERE username = ?1",
            params![username.trim()],
            |row| {
                Ok(Learner {
                    id: row.get(0)?,
                    username: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(learner)
}

// ===== Items =====

pub(crate) const ITEM_COLUMNS: &str =
    "w.id, w.word, w.definition, w.part_of_speech, w.example, w.level";

/// Reads an item from six consecutive columns starting at `start`
pub(crate) fn item_from_row(row: &Row, start: usize) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(start)?,
        word: row.get(start + 1)?,
        definition: row.get(start + 2)?,
        part_of_speech: row.get(start + 3)?,
        example: row.get(start + 4)?,
        level: row.get(start + 5)?,
    })
}

/// Adds an item to the bank and returns its id.
///
/// If an item with the same word already exists it is left untouched and its id returned.
pub fn add_item(item: &NewItem, conn: &Connection) -> Result<i64> {
    if item.word.trim().is_empty() || item.definition.trim().is_empty() {
        return Err(StudyError::validation("word and definition are required"));
    }

    conn.execute(
        "INSERT OR IGNORE INTO items (word, definition, part_of_speech, example, level)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            item.word.trim(),
            item.definition,
            item.part_of_speech,
            item.example,
            item.level
        ],
    )?;

    let id = conn.query_row(
        "SELECT id FROM items WHERE word = ?1",
        params![item.word.trim()],
        |row| row.get(0),
    )?;
    Ok(id)
}

pub fn get_item(item_id: i64, conn: &Connection) -> Result<Option<Item>> {
    let item = conn
        .query_row(
            &format!("SELECT {} FROM items w WHERE w.id = ?1", ITEM_COLUMNS),
            params![item_id],
            |row| item_from_row(row, 0),
        )
        .optional()?;
    Ok(item)
}

pub fn get_item_by_word(word: &str, conn: &Connection) -> Result<Option<Item>> {
    let item = conn
        .query_row(
            &format!("SELECT {} FROM items w WHERE w.word = ?1", ITEM_COLUMNS),
            params![word],
            |row| item_from_row(row, 0),
        )
        .optional()?;
    Ok(item)
}

pub fn count_items(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
    Ok(count)
}

/// All items ordered by id
pub fn all_items(conn: &Connection) -> Result<Vec<Item>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM items w ORDER BY w.id", ITEM_COLUMNS))?;
    let items = stmt
        .query_map([], |row| item_from_row(row, 0))?
        .collect::<rusqlite::Result<Vec<Item>>>()?;
    Ok(items)
}

/// Picks the item for a calendar day by cycling through the bank in id order.
pub fn word_of_the_day(today: NaiveDate, conn: &Connection) -> Result<Option<Item>> {
    let total = count_items(conn)?;
    if total == 0 {
        return Ok(None);
    }

    let offset = today.ordinal() as i64 % total;
    let item = conn
        .query_row(
            &format!(
                "SELECT {} FROM items w ORDER BY w.id LIMIT 1 OFFSET ?1",
                ITEM_COLUMNS
            ),
            params![offset],
            |row| item_from_row(row, 0),
        )
        .optional()?;
    Ok(item)
}

/// The word of the day before `today`
pub fn yesterdays_word(today: NaiveDate, conn: &Connection) -> Result<Option<Item>> {
    match today.pred_opt() {
        Some(yesterday) => word_of_the_day(yesterday, conn),
        None => Ok(None),
    }
}
