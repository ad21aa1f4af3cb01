//! Application configuration, read from an optional TOML file.
//!
//! ```toml
//! database_path = "vocab.db"
//! session_size = 20
//! log_level = "info"
//! seed_file = "words.json"
//! ```

use crate::error::{Result, StudyError};
use crate::study::DEFAULT_SESSION_SIZE;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database_path: PathBuf,
    /// Maximum number of cards in one study session
    pub session_size: usize,
    pub log_level: String,
    /// Item bank loaded into an empty database
    pub seed_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("vocab.db"),
            session_size: DEFAULT_SESSION_SIZE,
            log_level: "info".to_string(),
            seed_file: None,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| StudyError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Loads `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| StudyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.session_size == 0 {
            return Err(StudyError::Config("session_size must be positive".to_string()));
        }
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(StudyError::Config(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }
        Ok(())
    }
}
