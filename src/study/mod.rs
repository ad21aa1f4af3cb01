//! Review scheduling engine: due-card selection, queue admission, the session walker
//! and streak bookkeeping.

pub mod due;
pub mod queue;
pub mod session;
pub mod streak;

pub use due::{DEFAULT_SESSION_SIZE, DueOptions, select_due};
pub use queue::{enqueue_item, enqueue_list, enqueue_new, enqueue_new_at_level};
pub use session::{advance, answer, begin_session};
pub use streak::finalize_session;
