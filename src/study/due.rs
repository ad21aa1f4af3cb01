//! Selection of the cards a learner has to review today.

use crate::database::{lists, progress};
use crate::error::{Result, StudyError, check_id};
use crate::models::DueCard;
use chrono::NaiveDate;
use rusqlite::Connection;

pub const DEFAULT_SESSION_SIZE: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DueOptions {
    /// Restrict to items of this word list
    pub list_id: Option<i64>,
    pub limit: usize,
}

impl Default for DueOptions {
    fn default() -> Self {
        Self {
            list_id: None,
            limit: DEFAULT_SESSION_SIZE,
        }
    }
}

impl DueOptions {
    pub fn for_list(list_id: i64) -> Self {
        Self {
            list_id: Some(list_id),
            ..Self::default()
        }
    }
}

/// Cards of `learner_id` whose next review date is on or before `today`.
///
/// Earliest due first, ties in enqueue order, at most `options.limit` cards.
/// An empty result means nothing is due.
pub fn select_due(
    learner_id: i64,
    options: DueOptions,
    today: NaiveDate,
    conn: &Connection,
) -> Result<Vec<DueCard>> {
    check_id(learner_id, "learner")?;
    if options.limit == 0 {
        return Err(StudyError::validation("limit must be positive"));
    }
    if let Some(list_id) = options.list_id {
        lists::get_list(list_id, learner_id, conn)?;
    }

    let cards = progress::query_due(learner_id, options.list_id, None, today, options.limit, conn)?;
    log::debug!("{} cards due for learner {} on {}", cards.len(), learner_id, today);
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::db::{add_item, create_learner, open_in_memory};
    use crate::database::lists::{add_item_to_list, create_list};
    use crate::database::progress::upsert_review_state;
    use crate::models::NewItem;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    #[test]
    fn test_never_returns_future_or_foreign_cards() {
        let conn = open_in_memory().unwrap();
        let ada = create_learner("ada", &conn).unwrap().id;
        let eve = create_learner("eve", &conn).unwrap().id;
        let words: Vec<i64> = ["a", "b", "c"]
            .iter()
            .map(|w| add_item(&NewItem::new(w, "x"), &conn).unwrap())
            .collect();

        upsert_review_state(ada, words[0], date(10), &conn).unwrap();
        upsert_review_state(ada, words[1], date(11), &conn).unwrap();
        upsert_review_state(eve, words[2], date(1), &conn).unwrap();

        let due = select_due(ada, DueOptions::default(), date(10), &conn).unwrap();
        assert_eq!(due.len(), 1);
        assert!(due.iter().all(|c| c.state.learner_id == ada));
        assert!(due.iter().all(|c| c.state.next_review_date <= date(10)));
    }

    #[test]
    fn test_limit_truncates_earliest_first() {
        let conn = open_in_memory().unwrap();
        let ada = create_learner("ada", &conn).unwrap().id;
        for (i, word) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            let id = add_item(&NewItem::new(word, "x"), &conn).unwrap();
            upsert_review_state(ada, id, date(5 - i as u32), &conn).unwrap();
        }

        let options = DueOptions {
            list_id: None,
            limit: 2,
        };
        let due = select_due(ada, options, date(20), &conn).unwrap();
        let words: Vec<_> = due.iter().map(|c| c.item.word.as_str()).collect();
        assert_eq!(words, vec!["e", "d"]);
    }

    #[test]
    fn test_empty_is_not_an_error() {
        let conn = open_in_memory().unwrap();
        let ada = create_learner("ada", &conn).unwrap().id;

        assert!(select_due(ada, DueOptions::default(), date(1), &conn).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let conn = open_in_memory().unwrap();
        let ada = create_learner("ada", &conn).unwrap().id;
        let eve = create_learner("eve", &conn).unwrap().id;
        let list = create_list(eve, "eve's", None, &conn).unwrap();

        let zero = DueOptions {
            list_id: None,
            limit: 0,
        };
        assert!(matches!(select_due(ada, zero, date(1), &conn), Err(StudyError::Validation(_))));
        assert!(matches!(
            select_due(ada, DueOptions::for_list(list.id), date(1), &conn),
            Err(StudyError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_scope() {
        let conn = open_in_memory().unwrap();
        let ada = create_learner("ada", &conn).unwrap().id;
        let list = create_list(ada, "short", None, &conn).unwrap();
        let inside = add_item(&NewItem::new("in", "x"), &conn).unwrap();
        let outside = add_item(&NewItem::new("out", "x"), &conn).unwrap();
        add_item_to_list(list.id, inside, ada, &conn).unwrap();
        upsert_review_state(ada, inside, date(1), &conn).unwrap();
        upsert_review_state(ada, outside, date(1), &conn).unwrap();

        let due = select_due(ada, DueOptions::for_list(list.id), date(1), &conn).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].item.id, inside);
    }
}
