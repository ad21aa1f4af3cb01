//! JSON import/export of item banks.
//! An item bank is a JSON array of items; it seeds the database on first start.

use crate::database::db;
use crate::error::Result;
use crate::models::NewItem;
use rusqlite::Connection;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Exports items to a JSON file at the specified path.
pub fn export_items_to_path<P: AsRef<Path>>(items: &[NewItem], path: P) -> Result<()> {
    let json_string = serde_json::to_string_pretty(items)?;
    let mut file = File::create(path.as_ref())?;
    file.write_all(json_string.as_bytes())?;
    log::info!("Exported {} items to '{}'", items.len(), path.as_ref().display());
    Ok(())
}

/// Reads an item bank from a JSON file.
pub fn import_items<P: AsRef<Path>>(path: P) -> Result<Vec<NewItem>> {
    let mut file = File::open(path.as_ref())?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let items: Vec<NewItem> = serde_json::from_str(&contents)?;
    log::info!("Read {} items from '{}'", items.len(), path.as_ref().display());
    Ok(items)
}

/// Adds items to the bank in one transaction; words already present are skipped.
///
/// Returns how many items were new.
pub fn add_items(items: &[NewItem], conn: &Connection) -> Result<usize> {
    let before = db::count_items(conn)?;
    let tx = conn.unchecked_transaction()?;
    for item in items {
        db::add_item(item, &tx)?;
    }
    tx.commit()?;
    Ok((db::count_items(conn)? - before) as usize)
}

/// Loads the item bank only when the database has no items yet.
pub fn seed_if_empty(items: &[NewItem], conn: &Connection) -> Result<usize> {
    if db::count_items(conn)? > 0 {
        return Ok(0);
    }
    let inserted = add_items(items, conn)?;
    log::info!("[seed] Inserted {} items into the database.", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::db::{get_item_by_word, open_in_memory};
    use std::fs;

    fn create_test_bank() -> Vec<NewItem> {
        vec![
            NewItem {
                word: "gregarious".to_string(),
                definition: "fond of company".to_string(),
                part_of_speech: Some("adjective".to_string()),
                example: Some("She was a gregarious child.".to_string()),
                level: Some("sat".to_string()),
            },
            NewItem::new("lucid", "expressed clearly"),
        ]
    }

    #[test]
    fn test_export_items_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.json");

        export_items_to_path(&create_test_bank(), &path).unwrap();
        assert!(fs::metadata(&path).is_ok(), "File should exist");
    }

    #[test]
    fn test_import_items() {
        let json_content = r#"[
  {
    "word": "candid",
    "definition": "truthful and straightforward",
    "level": "grade_9_10"
  }
]"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.json");
        fs::write(&path, json_content).unwrap();

        let items = import_items(&path).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].word, "candid");
        assert_eq!(items[0].level.as_deref(), Some("grade_9_10"));
        assert!(items[0].example.is_none());
    }

    #[test]
    fn test_import_missing_or_malformed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(import_items(dir.path().join("absent.json")).is_err());

        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            import_items(&path),
            Err(crate::error::StudyError::Serialization(_))
        ));
    }

    #[test]
    fn test_seed_if_empty_runs_once() {
        let conn = open_in_memory().unwrap();
        let bank = create_test_bank();

        assert_eq!(seed_if_empty(&bank, &conn).unwrap(), 2);
        assert_eq!(seed_if_empty(&bank, &conn).unwrap(), 0);

        let item = get_item_by_word("gregarious", &conn).unwrap().unwrap();
        assert_eq!(item.part_of_speech.as_deref(), Some("adjective"));
    }

    #[test]
    fn test_add_items_skips_known_words() {
        let conn = open_in_memory().unwrap();
        add_items(&create_test_bank(), &conn).unwrap();

        let more = vec![NewItem::new("lucid", "again"), NewItem::new("terse", "brief")];
        assert_eq!(add_items(&more, &conn).unwrap(), 1);
    }
}
