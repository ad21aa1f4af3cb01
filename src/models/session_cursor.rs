//! Study session cursor and the steps of the session protocol.
//!
//! The cursor is a plain value: callers hand it back on every request and
//! nothing about an ongoing session's progress is kept by the engine.

use super::{DueCard, StreakState};
use crate::error::{Result, StudyError};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCursor {
    pub session_id: i64,
    /// 0-based index into the session's due-set snapshot
    pub position: u32,
    pub reviewed_count: u32,
    pub correct_count: u32,
    /// Word list the session is restricted to
    pub list_id: Option<i64>,
}

impl SessionCursor {
    pub fn start(session_id: i64, list_id: Option<i64>) -> Self {
        Self {
            session_id,
            position: 0,
            reviewed_count: 0,
            correct_count: 0,
            list_id,
        }
    }

    /// Rejects caller-supplied values no real session could have produced.
    pub fn validate(&self) -> Result<()> {
        if self.session_id <= 0 {
            return Err(StudyError::validation("session id must be positive"));
        }
        if self.correct_count > self.reviewed_count {
            return Err(StudyError::validation(
                "correct count cannot exceed reviewed count",
            ));
        }
        if self.reviewed_count > self.position {
            return Err(StudyError::validation(
                "reviewed count cannot exceed position",
            ));
        }
        if matches!(self.list_id, Some(id) if id <= 0) {
            return Err(StudyError::validation("list id must be positive"));
        }
        Ok(())
    }

    /// Cursor after one answered card.
    pub fn advanced(self, correct: bool) -> Self {
        Self {
            position: self.position + 1,
            reviewed_count: self.reviewed_count + 1,
            correct_count: self.correct_count + u32::from(correct),
            ..self
        }
    }
}

/// Result of an advance step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStep {
    /// The card at `cursor.position` is to be shown next
    InProgress {
        cursor: SessionCursor,
        card: DueCard,
        total: usize,
    },
    /// The snapshot is exhausted and the session has been finalized
    Completed {
        reviewed_count: u32,
        correct_count: u32,
        streak: StreakState,
    },
}

impl SessionStep {
    pub fn is_completed(&self) -> bool {
        matches!(self, SessionStep::Completed { .. })
    }
}
