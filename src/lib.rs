pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod study;

pub use error::{Result, StudyError};
pub use models::{
    DueCard, Item, NewItem, Quality, ReviewState, SessionCursor, SessionStep, StreakState,
};
pub use models::sm2::compute_next_state;
