//! A word list is a learner-owned, named collection of items
use serde::{Deserialize, Serialize};

pub const MAX_LIST_NAME_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordList {
    pub id: i64,
    pub learner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}
