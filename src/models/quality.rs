//! Answer quality reported by the learner for one card.
use crate::error::StudyError;
use serde::{Deserialize, Serialize};

/// Only four grades exist; anything else is rejected before scheduling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Quality {
    Missed,
    Hard,
    Good,
    Easy,
}

impl Quality {
    pub fn value(self) -> u8 {
        match self {
            Quality::Missed => 0,
            Quality::Hard => 2,
            Quality::Good => 3,
            Quality::Easy => 5,
        }
    }

    /// Good and easy answers count as correct
    pub fn is_correct(self) -> bool {
        self.value() >= 3
    }
}

impl TryFrom<u8> for Quality {
    type Error = StudyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Quality::Missed),
            2 => Ok(Quality::Hard),
            3 => Ok(Quality::Good),
            5 => Ok(Quality::Easy),
            other => Err(StudyError::validation(format!(
                "quality must be one of 0, 2, 3, 5 (got {})",
                other
            ))),
        }
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.value()
    }
}
