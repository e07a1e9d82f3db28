use anyhow::{Context, Result};
use aura_core::{CollectionId, Tracker, format_date, generate_aura_dates, parse_date};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

mod config;
mod folder_cmd;
mod json_store;
mod logging;
mod state;
mod task_cmd;

use folder_cmd::FolderCommand;
use json_store::JsonFileStore;
use task_cmd::{TaskCommand, task_line, task_line_on};

#[derive(Parser, Debug)]
#[command(name = "aura", version, about = "Aura task tracker: reminders that back off over time")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Preview the aura dates for a start/end window
    Dates { start: String, end: String },

    /// Create, defer, complete and edit tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Show what is due on a day (default: today)
    Today {
        /// Reference date instead of today
        #[arg(long)]
        date: Option<String>,

        /// Folder name or id (default: top-level list)
        #[arg(long)]
        folder: Option<String>,
    },

    /// Manage folders
    Folder {
        #[command(subcommand)]
        command: FolderCommand,
    },

    /// Find tasks by number (7 or #7) or by text
    Search { term: String },

    /// Inspect or create ~/.aura/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective configuration
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    logging::init_logging(&cfg.log.level);

    let tz = cfg.general.timezone.clone();

    match cli.command {
        Command::Dates { start, end } => {
            preview_dates(&start, &end)?;
        }

        Command::Task { command } => {
            let mut tracker = open_tracker(&cfg)?;
            task_cmd::run(&mut tracker, command, &tz)?;
        }

        Command::Today { date, folder } => {
            let tracker = open_tracker(&cfg)?;
            show_today(&tracker, date, folder, &tz)?;
        }

        Command::Folder { command } => {
            let mut tracker = open_tracker(&cfg)?;
            folder_cmd::run(&mut tracker, command)?;
        }

        Command::Search { term } => {
            let tracker = open_tracker(&cfg)?;
            search(&tracker, &term, &tz)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn open_tracker(cfg: &config::Config) -> Result<Tracker<JsonFileStore>> {
    let path = cfg.store_path()?;
    let store =
        JsonFileStore::open(&path).with_context(|| format!("opening {}", path.display()))?;
    tracing::debug!(path = %store.path().display(), "store opened");
    Ok(Tracker::new(store))
}

/// Today in the configured timezone.
pub(crate) fn today(tz: &str) -> Result<NaiveDate> {
    aura_core::time::today_in(tz, Utc::now())
}

pub(crate) fn collection_for(
    tracker: &Tracker<JsonFileStore>,
    folder: Option<&str>,
) -> Result<CollectionId> {
    match folder {
        None => Ok(CollectionId::TopLevel),
        Some(name) => Ok(CollectionId::Folder(tracker.resolve_folder(name)?.id)),
    }
}

fn preview_dates(start: &str, end: &str) -> Result<()> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    let dates = generate_aura_dates(start, end);

    println!(
        "{} aura date(s) for {} -> {}:",
        dates.len(),
        format_date(start),
        format_date(end)
    );
    for (i, d) in dates.iter().enumerate() {
        println!("  [{i}] {}", format_date(*d));
    }
    Ok(())
}

fn show_today(
    tracker: &Tracker<JsonFileStore>,
    date: Option<String>,
    folder: Option<String>,
    tz: &str,
) -> Result<()> {
    let date = match date {
        Some(s) => parse_date(&s)?,
        None => today(tz)?,
    };
    let collection = collection_for(tracker, folder.as_deref())?;
    let split = tracker.due_on(&collection, date)?;

    println!("# Due {} ({})\n", format_date(date), collection);
    if split.due.is_empty() {
        println!("Nothing due.");
    }
    for t in &split.due {
        println!("{}", task_line(t));
    }

    if !split.other.is_empty() {
        println!("\n## Other tasks\n");
        for t in &split.other {
            println!("{}", task_line(t));
        }
    }

    if collection == CollectionId::TopLevel {
        let folders = tracker.folders_with_due_tasks(date)?;
        if !folders.is_empty() {
            println!("\n## Folders with tasks due\n");
            for s in folders {
                let serials: Vec<String> = s.serials.iter().map(|n| format!("#{n}")).collect();
                println!(
                    "- {}: {} task(s) ({})",
                    s.folder.name,
                    s.count,
                    serials.join(", ")
                );
            }
        }
    }

    Ok(())
}

fn search(tracker: &Tracker<JsonFileStore>, term: &str, tz: &str) -> Result<()> {
    let hits = tracker.search(term)?;
    if hits.is_empty() {
        println!("No tasks matching \"{}\".", term.trim());
        return Ok(());
    }

    let today = today(tz)?;
    println!("Found {} task(s) matching \"{}\"\n", hits.total(), term.trim());

    if !hits.top_level.is_empty() {
        println!("## Top-level");
        for t in &hits.top_level {
            println!("{}", task_line_on(t, today));
        }
    }
    for group in &hits.folders {
        println!("## {}", group.folder.name);
        for t in &group.tasks {
            println!("{}", task_line_on(t, today));
        }
    }
    Ok(())
}
