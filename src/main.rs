mod app;

use app::{App, Command, OutputFormat};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use vocab_srs::config::Config;
use vocab_srs::database::db;
use vocab_srs::export::json;
use vocab_srs::models::NewItem;

#[derive(Parser)]
#[command(name = "vocab", about = "Spaced-repetition vocabulary trainer", version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Learner to act as
    #[arg(long, short, global = true)]
    learner: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: Config) -> vocab_srs::Result<()> {
    let conn = db::open(&config.database_path)?;

    let items = match &config.seed_file {
        Some(seed_file) => json::import_items(seed_file)?,
        None => sample_items(),
    };
    json::seed_if_empty(&items, &conn)?;

    log::debug!(
        "Database '{}' holds {} items",
        config.database_path.display(),
        db::count_items(&conn)?
    );

    let app = App::new(conn, config, cli.learner, cli.format);
    app.run(cli.command)
}

/// Small starter bank used when no seed file is configured
fn sample_items() -> Vec<NewItem> {
    vec![
        NewItem::new("candid", "truthful and straightforward; frank").with_level("grade_9_10"),
        NewItem::new("diligent", "showing care and effort in one's work").with_level("grade_6_8"),
        NewItem::new("laconic", "using very few words").with_level("sat"),
        NewItem::new("obdurate", "stubbornly refusing to change one's opinion").with_level("gre"),
    ]
}
