//! Difficulty levels an item can be tagged with.
use crate::error::StudyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[serde(rename = "grade_6_8")]
    Grade6To8,
    #[serde(rename = "grade_9_10")]
    Grade9To10,
    Sat,
    Gre,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Grade6To8, Level::Grade9To10, Level::Sat, Level::Gre];

    /// Tag stored in the `items.level` column
    pub fn tag(&self) -> &'static str {
        match self {
            Level::Grade6To8 => "grade_6_8",
            Level::Grade9To10 => "grade_9_10",
            Level::Sat => "sat",
            Level::Gre => "gre",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::Grade6To8 => "Grades 6–8",
            Level::Grade9To10 => "Grades 9–10",
            Level::Sat => "SAT / 11–12",
            Level::Gre => "GRE",
        }
    }
}

impl FromStr for Level {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.tag() == s.trim())
            .ok_or_else(|| StudyError::validation(format!("unknown level '{}'", s)))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
