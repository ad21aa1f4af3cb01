pub mod item;
pub mod learner;
pub mod level;
pub mod quality;
pub mod review_state;
pub mod session_cursor;
pub mod sm2;
pub mod streak;
pub mod word_list;

pub use item::{Item, NewItem};
pub use learner::Learner;
pub use level::Level;
pub use quality::Quality;
pub use review_state::{DueCard, ListEntry, MasteryBreakdown, ReviewState};
pub use session_cursor::{SessionCursor, SessionStep};
pub use sm2::ScheduleResult;
pub use streak::StreakState;
pub use word_list::WordList;
