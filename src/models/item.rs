//! Item is a unit of study content: a word with its meaning. Items are never mutated by the engine.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub word: String,
    pub definition: String,
    pub part_of_speech: Option<String>,
    pub example: Option<String>,
    pub level: Option<String>,
}

/// Item as it appears in an item bank, before it has been given an id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub word: String,
    pub definition: String,
    #[serde(default)]
    pub part_of_speech: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

impl NewItem {
    pub fn new(word: &str, definition: &str) -> Self {
        Self {
            word: word.to_string(),
            definition: definition.to_string(),
            part_of_speech: None,
            example: None,
            level: None,
        }
    }

    pub fn with_level(mut self, level: &str) -> Self {
        self.level = Some(level.to_string());
        self
    }
}

impl From<Item> for NewItem {
    fn from(item: Item) -> Self {
        Self {
            word: item.word,
            definition: item.definition,
            part_of_speech: item.part_of_speech,
            example: item.example,
            level: item.level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_creation() {
        let item = NewItem::new("laconic", "using very few words").with_level("sat");

        assert_eq!(item.word, "laconic");
        assert_eq!(item.definition, "using very few words");
        assert_eq!(item.level.as_deref(), Some("sat"));
        assert!(item.example.is_none());
    }

    #[test]
    fn test_new_item_optional_fields_default() {
        let item: NewItem =
            serde_json::from_str(r#"{"word": "terse", "definition": "brief"}"#).unwrap();

        assert_eq!(item.word, "terse");
        assert!(item.part_of_speech.is_none());
        assert!(item.level.is_none());
    }
}
