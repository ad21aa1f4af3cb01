pub mod db;
pub mod lists;
pub mod progress;
pub mod stats;

pub use stats::StudySession;
