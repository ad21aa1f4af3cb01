//! Command-line front end: parses commands and renders engine results.
//! Study progress travels in the command arguments only; nothing is remembered between runs.

use clap::{Args, Subcommand};
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;

use vocab_srs::config::Config;
use vocab_srs::database::{db, lists, progress, stats};
use vocab_srs::error::{Result, StudyError};
use vocab_srs::export::json;
use vocab_srs::models::{
    DueCard, Item, Learner, Level, NewItem, SessionCursor, SessionStep, StreakState, WordList,
};
use vocab_srs::study::{self, DueOptions};

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage learners
    #[command(subcommand)]
    Learner(LearnerCommand),

    /// Show the study date
    Today,

    /// Move the study date one day forward
    AdvanceDay,

    /// Add new words to the review queue
    Enqueue {
        /// A single item id
        #[arg(long, conflicts_with_all = ["count", "list"])]
        item: Option<i64>,
        /// Number of new words to add
        #[arg(long, conflicts_with = "list")]
        count: Option<usize>,
        /// Only take words of this level (with --count)
        #[arg(long, requires = "count")]
        level: Option<String>,
        /// Every word of this list
        #[arg(long)]
        list: Option<i64>,
    },

    /// List the cards due today
    Due {
        #[arg(long)]
        list: Option<i64>,
    },

    /// Start a study session, or show the next card of one
    Study {
        #[command(flatten)]
        cursor: CursorArgs,
    },

    /// Answer the card currently shown
    Answer {
        #[command(flatten)]
        cursor: CursorArgs,
        /// Review state id of the shown card
        #[arg(long)]
        review: i64,
        /// 0 = missed, 2 = hard, 3 = good, 5 = easy
        #[arg(long)]
        quality: u8,
    },

    /// Show streak and progress
    Stats,

    /// Manage word lists
    #[command(subcommand)]
    Lists(ListCommand),

    /// Import an item bank from JSON
    Import { file: PathBuf },

    /// Export the item bank to JSON
    Export { file: PathBuf },

    /// Show the word of the day
    WordOfTheDay {
        /// Show yesterday's word instead
        #[arg(long)]
        yesterday: bool,
    },
}

#[derive(Subcommand)]
pub enum LearnerCommand {
    Add { name: String },
}

#[derive(Subcommand)]
pub enum ListCommand {
    /// Show all lists
    All,
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Rename {
        id: i64,
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: i64,
    },
    /// Add a word (id or spelling) to a list
    Add {
        id: i64,
        item: String,
    },
    Remove {
        id: i64,
        item: String,
    },
    /// Show the words of a list
    Show {
        id: i64,
    },
}

/// Session cursor as passed on the command line
#[derive(Args, Clone, Debug)]
pub struct CursorArgs {
    #[arg(long)]
    session: Option<i64>,
    #[arg(long, default_value_t = 0)]
    card: u32,
    #[arg(long, default_value_t = 0)]
    reviewed: u32,
    #[arg(long, default_value_t = 0)]
    correct: u32,
    #[arg(long)]
    list: Option<i64>,
}

impl CursorArgs {
    fn cursor(&self, session_id: i64) -> SessionCursor {
        SessionCursor {
            session_id,
            position: self.card,
            reviewed_count: self.reviewed,
            correct_count: self.correct,
            list_id: self.list,
        }
    }
}

#[derive(Serialize)]
struct StatsReport {
    streak: StreakState,
    due_today: i64,
    new_count: i64,
    learning_count: i64,
    mastered_count: i64,
}

pub struct App {
    conn: Connection,
    config: Config,
    learner: Option<String>,
    format: OutputFormat,
}

impl App {
    pub fn new(
        conn: Connection,
        config: Config,
        learner: Option<String>,
        format: OutputFormat,
    ) -> Self {
        Self {
            conn,
            config,
            learner,
            format,
        }
    }

    pub fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Learner(LearnerCommand::Add { name }) => {
                let learner = db::create_learner(&name, &self.conn)?;
                self.emit(&learner, || {
                    format!("Learner '{}' created (id {})", learner.username, learner.id)
                })
            }
            Command::Today => {
                let today = self.today()?;
                self.emit(&today, || today.format("%Y-%m-%d").to_string())
            }
            Command::AdvanceDay => {
                let today = db::advance_day(&self.conn)?;
                self.emit(&today, || format!("Study date is now {}", today.format("%Y-%m-%d")))
            }
            Command::Enqueue {
                item,
                count,
                level,
                list,
            } => self.enqueue(item, count, level, list),
            Command::Due { list } => self.due(list),
            Command::Study { cursor } => self.study(cursor),
            Command::Answer {
                cursor,
                review,
                quality,
            } => self.answer(cursor, review, quality),
            Command::Stats => self.stats(),
            Command::Lists(command) => self.lists(command),
            Command::Import { file } => {
                let items = json::import_items(&file)?;
                let added = json::add_items(&items, &self.conn)?;
                self.emit(&added, || format!("Imported {} new words", added))
            }
            Command::Export { file } => {
                let items: Vec<NewItem> = db::all_items(&self.conn)?
                    .into_iter()
                    .map(NewItem::from)
                    .collect();
                json::export_items_to_path(&items, &file)?;
                self.emit(&items.len(), || {
                    format!("Exported {} words to {}", items.len(), file.display())
                })
            }
            Command::WordOfTheDay { yesterday } => {
                let today = self.today()?;
                let item = if yesterday {
                    db::yesterdays_word(today, &self.conn)?
                } else {
                    db::word_of_the_day(today, &self.conn)?
                };
                self.emit(&item, || match &item {
                    Some(item) => format_item(item),
                    None => "No words yet".to_string(),
                })
            }
        }
    }

    fn today(&self) -> Result<chrono::NaiveDate> {
        db::get_current_date(&self.conn)
    }

    fn learner(&self) -> Result<Learner> {
        let name = self
            .learner
            .as_deref()
            .ok_or_else(|| StudyError::validation("--learner is required for this command"))?;
        db::get_learner_by_name(name, &self.conn)?
            .ok_or_else(|| StudyError::not_found("Learner not found"))
    }

    /// Prints `value` as JSON, or the plain-text rendering
    fn emit<T: Serialize>(&self, value: &T, plain: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Plain => println!("{}", plain()),
        }
        Ok(())
    }

    fn enqueue(
        &self,
        item: Option<i64>,
        count: Option<usize>,
        level: Option<String>,
        list: Option<i64>,
    ) -> Result<()> {
        let learner = self.learner()?;
        let today = self.today()?;

        let added = match (item, count, level, list) {
            (Some(item), _, _, _) => study::enqueue_item(learner.id, item, today, &self.conn)?,
            (_, Some(count), Some(level), _) => {
                study::enqueue_new_at_level(learner.id, count, &level, today, &self.conn)?
            }
            (_, Some(count), None, _) => study::enqueue_new(learner.id, count, today, &self.conn)?,
            (_, _, _, Some(list)) => study::enqueue_list(learner.id, list, today, &self.conn)?,
            _ => return Err(StudyError::validation("provide --item, --count or --list")),
        };
        self.emit(&added, || format!("Added {} words to the review queue", added))
    }

    fn due(&self, list: Option<i64>) -> Result<()> {
        let learner = self.learner()?;
        let options = DueOptions {
            list_id: list,
            limit: self.config.session_size,
        };
        let cards = study::select_due(learner.id, options, self.today()?, &self.conn)?;
        self.emit(&cards, || {
            if cards.is_empty() {
                return "Nothing due today".to_string();
            }
            cards
                .iter()
                .map(|card| {
                    format!(
                        "[{}] {} (mastery {}, due {})",
                        card.state.id,
                        card.item.word,
                        card.state.mastery_level,
                        card.state.next_review_date
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    fn study(&self, args: CursorArgs) -> Result<()> {
        let learner = self.learner()?;
        let today = self.today()?;
        let cursor = match args.session {
            Some(session_id) => args.cursor(session_id),
            None => study::begin_session(learner.id, args.list, today, &self.conn)?,
        };
        let step = study::advance(learner.id, cursor, today, self.config.session_size, &self.conn)?;
        self.emit_step(&step)
    }

    fn answer(&self, args: CursorArgs, review: i64, quality: u8) -> Result<()> {
        let learner = self.learner()?;
        let today = self.today()?;
        let session_id = args
            .session
            .ok_or_else(|| StudyError::validation("--session is required to answer"))?;

        let size = self.config.session_size;
        let cursor = args.cursor(session_id);
        let cursor = study::answer(learner.id, cursor, review, quality, today, size, &self.conn)?;
        let step = study::advance(learner.id, cursor, today, size, &self.conn)?;
        self.emit_step(&step)
    }

    fn emit_step(&self, step: &SessionStep) -> Result<()> {
        self.emit(step, || match step {
            SessionStep::InProgress { cursor, card, total } => {
                format!(
                    "Card {}/{}\n{}\n\nAnswer with: vocab answer --session {} --card {} \
                     --reviewed {} --correct {}{} --review {} --quality <0|2|3|5>",
                    cursor.position + 1,
                    total,
                    format_card(card),
                    cursor.session_id,
                    cursor.position,
                    cursor.reviewed_count,
                    cursor.correct_count,
                    cursor.list_id.map(|id| format!(" --list {}", id)).unwrap_or_default(),
                    card.state.id
                )
            }
            SessionStep::Completed {
                reviewed_count,
                correct_count,
                streak,
            } => format!(
                "Session complete: {} reviewed, {} correct. Streak: {} day(s), longest {}",
                reviewed_count, correct_count, streak.current_streak, streak.longest_streak
            ),
        })
    }

    fn stats(&self) -> Result<()> {
        let learner = self.learner()?;
        let breakdown = progress::mastery_breakdown(learner.id, &self.conn)?;
        let report = StatsReport {
            streak: stats::get_streak_state(learner.id, &self.conn)?,
            due_today: progress::count_due(learner.id, self.today()?, &self.conn)?,
            new_count: breakdown.new_count,
            learning_count: breakdown.learning_count,
            mastered_count: breakdown.mastered_count,
        };
        self.emit(&report, || {
            format!(
                "Streak: {} (longest {})\nReviewed: {} ({} correct)\nDue today: {}\n\
                 New: {}  Learning: {}  Mastered: {}",
                report.streak.current_streak,
                report.streak.longest_streak,
                report.streak.total_reviewed,
                report.streak.total_correct,
                report.due_today,
                report.new_count,
                report.learning_count,
                report.mastered_count
            )
        })
    }

    fn resolve_item(&self, item: &str) -> Result<i64> {
        if let Ok(id) = item.parse::<i64>() {
            return Ok(id);
        }
        db::get_item_by_word(item, &self.conn)?
            .map(|item| item.id)
            .ok_or_else(|| StudyError::not_found("Item not found"))
    }

    fn lists(&self, command: ListCommand) -> Result<()> {
        let learner = self.learner()?;
        match command {
            ListCommand::All => {
                let counted = lists::get_lists_with_counts(learner.id, &self.conn)?;
                let all: Vec<&WordList> = counted.iter().map(|(list, _)| list).collect();
                self.emit(&all, || {
                    counted
                        .iter()
                        .map(|(list, count)| {
                            format!("[{}] {} ({} words)", list.id, list.name, count)
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })
            }
            ListCommand::Create { name, description } => {
                let description = description.as_deref();
                let list = lists::create_list(learner.id, &name, description, &self.conn)?;
                self.emit(&list, || format!("List '{}' created (id {})", list.name, list.id))
            }
            ListCommand::Rename {
                id,
                name,
                description,
            } => {
                let description = description.as_deref();
                let list = lists::rename_list(id, learner.id, &name, description, &self.conn)?;
                self.emit(&list, || format!("List {} renamed to '{}'", list.id, list.name))
            }
            ListCommand::Delete { id } => {
                lists::delete_list(id, learner.id, &self.conn)?;
                self.emit(&id, || format!("List {} deleted", id))
            }
            ListCommand::Add { id, item } => {
                let item_id = self.resolve_item(&item)?;
                lists::add_item_to_list(id, item_id, learner.id, &self.conn)?;
                self.emit(&item_id, || format!("Added '{}' to list {}", item, id))
            }
            ListCommand::Remove { id, item } => {
                let item_id = self.resolve_item(&item)?;
                lists::remove_item_from_list(id, item_id, learner.id, &self.conn)?;
                self.emit(&item_id, || format!("Removed '{}' from list {}", item, id))
            }
            ListCommand::Show { id } => {
                let list = lists::get_list(id, learner.id, &self.conn)?;
                let entries = lists::get_list_items(id, learner.id, &self.conn)?;
                self.emit(&entries, || {
                    let mut lines = vec![format!("{} ({} words)", list.name, entries.len())];
                    for entry in &entries {
                        let status = match &entry.state {
                            Some(state) => format!("mastery {}", state.mastery_level),
                            None => "not queued".to_string(),
                        };
                        lines.push(format!("  {} [{}]", entry.item.word, status));
                    }
                    lines.join("\n")
                })
            }
        }
    }
}

fn format_item(item: &Item) -> String {
    let mut text = item.word.clone();
    if let Some(pos) = &item.part_of_speech {
        text.push_str(&format!(" ({})", pos));
    }
    if let Some(level) = item.level.as_deref().and_then(|l| l.parse::<Level>().ok()) {
        text.push_str(&format!(" [{}]", level.label()));
    }
    text.push_str(&format!("\n  {}", item.definition));
    if let Some(example) = &item.example {
        text.push_str(&format!("\n  e.g. {}", example));
    }
    text
}

fn format_card(card: &DueCard) -> String {
    format!(
        "{}\n  seen {} times, {} correct",
        format_item(&card.item),
        card.state.times_seen,
        card.state.times_correct
    )
}
