use anyhow::{Context, Result, bail};
use aura_core::{
    Advance, Attachment, Slot, Task, Tracker, aura_dates_for, format_date, is_due_on, parse_date,
};
use chrono::Utc;
use clap::Subcommand;
use std::fs;
use std::path::{Path, PathBuf};

use crate::json_store::JsonFileStore;
use crate::{collection_for, today};

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a task whose reminders are spread between --start and --end
    Add {
        /// Start date (default: today)
        #[arg(long)]
        start: Option<String>,

        /// End date, e.g. 2024-03-31
        #[arg(long)]
        end: String,

        /// Folder name or id (default: top-level list)
        #[arg(long)]
        folder: Option<String>,
    },

    /// List tasks in serial order
    List {
        #[arg(long)]
        folder: Option<String>,
    },

    /// Show one task with its full aura schedule
    Show {
        serial: u32,

        #[arg(long)]
        folder: Option<String>,
    },

    /// Not done: move the task to its next aura date
    Defer {
        serial: u32,

        #[arg(long)]
        folder: Option<String>,
    },

    /// Done: delete the task and renumber the rest
    Done {
        serial: u32,

        #[arg(long)]
        folder: Option<String>,
    },

    /// Set free-form notes. An empty value clears the field.
    Edit {
        serial: u32,

        #[arg(long)]
        text1: Option<String>,

        #[arg(long)]
        text2: Option<String>,

        #[arg(long)]
        folder: Option<String>,
    },

    /// Attach an image file to slot 1 or 2
    Attach {
        serial: u32,

        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
        slot: u8,

        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        folder: Option<String>,
    },

    /// Remove the image in slot 1 or 2
    Detach {
        serial: u32,

        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
        slot: u8,

        #[arg(long)]
        folder: Option<String>,
    },
}

pub fn run(tracker: &mut Tracker<JsonFileStore>, cmd: TaskCommand, tz: &str) -> Result<()> {
    match cmd {
        TaskCommand::Add { start, end, folder } => add(tracker, start, &end, folder, tz),
        TaskCommand::List { folder } => list(tracker, folder),
        TaskCommand::Show { serial, folder } => show(tracker, serial, folder, tz),
        TaskCommand::Defer { serial, folder } => defer(tracker, serial, folder),
        TaskCommand::Done { serial, folder } => done(tracker, serial, folder),
        TaskCommand::Edit {
            serial,
            text1,
            text2,
            folder,
        } => edit(tracker, serial, text1, text2, folder),
        TaskCommand::Attach {
            serial,
            slot,
            file,
            folder,
        } => attach(tracker, serial, slot, &file, folder),
        TaskCommand::Detach {
            serial,
            slot,
            folder,
        } => detach(tracker, serial, slot, folder),
    }
}

fn add(
    tracker: &mut Tracker<JsonFileStore>,
    start: Option<String>,
    end: &str,
    folder: Option<String>,
    tz: &str,
) -> Result<()> {
    let collection = collection_for(tracker, folder.as_deref())?;
    let start = match start {
        Some(s) => parse_date(&s)?,
        None => today(tz)?,
    };
    let end = parse_date(end)?;
    if end < start {
        bail!(
            "end date {} is before start date {}",
            format_date(end),
            format_date(start)
        );
    }

    let task = tracker
        .create_task(&collection, start, end)
        .context("creating task")?;
    println!(
        "Created #{} ({} -> {}), first due {}",
        task.serial_number,
        format_date(task.created_at),
        format_date(task.end_date),
        format_date(task.current_date)
    );
    Ok(())
}

fn list(tracker: &Tracker<JsonFileStore>, folder: Option<String>) -> Result<()> {
    let collection = collection_for(tracker, folder.as_deref())?;
    let tasks = tracker.tasks(&collection)?;
    if tasks.is_empty() {
        println!("No tasks in {collection}.");
        return Ok(());
    }
    for t in &tasks {
        println!("{}", task_line(t));
    }
    Ok(())
}

fn show(
    tracker: &Tracker<JsonFileStore>,
    serial: u32,
    folder: Option<String>,
    tz: &str,
) -> Result<()> {
    let collection = collection_for(tracker, folder.as_deref())?;
    let task = tracker.task_by_serial(&collection, serial)?;
    let today = today(tz)?;

    println!("{}", task_line(&task));
    if let Some(t) = task.text(Slot::Second) {
        println!("    {t}");
    }
    for slot in [Slot::First, Slot::Second] {
        if let Some(img) = task.image(slot) {
            println!("    image {:?}: {} ({} bytes)", slot, img.media_type, img.bytes.len());
        }
    }
    if let Some(ts) = task.last_updated {
        println!("    last deferred {}", ts.to_rfc3339());
    }

    println!("\nAura dates:");
    for (i, d) in aura_dates_for(&task).into_iter().enumerate() {
        let mut marks = Vec::new();
        if d == task.current_date {
            marks.push("current");
        }
        if d == today {
            marks.push("today");
        }
        let suffix = if marks.is_empty() {
            String::new()
        } else {
            format!("  <- {}", marks.join(", "))
        };
        println!("  [{i}] {}{suffix}", format_date(d));
    }
    Ok(())
}

fn defer(tracker: &mut Tracker<JsonFileStore>, serial: u32, folder: Option<String>) -> Result<()> {
    let collection = collection_for(tracker, folder.as_deref())?;
    let task = tracker.task_by_serial(&collection, serial)?;

    match tracker.defer(&collection, &task.id, Utc::now())? {
        Advance::Moved { to, .. } => {
            println!("#{} moved to {}", serial, format_date(to));
        }
        Advance::Exhausted => {
            println!(
                "#{} has no aura dates left (ends {}). Mark it done: aura task done {}",
                serial,
                format_date(task.end_date),
                serial
            );
        }
    }
    Ok(())
}

fn done(tracker: &mut Tracker<JsonFileStore>, serial: u32, folder: Option<String>) -> Result<()> {
    let collection = collection_for(tracker, folder.as_deref())?;
    let task = tracker.task_by_serial(&collection, serial)?;
    tracker.complete(&collection, &task.id)?;
    println!("#{serial} completed and removed.");
    Ok(())
}

fn edit(
    tracker: &mut Tracker<JsonFileStore>,
    serial: u32,
    text1: Option<String>,
    text2: Option<String>,
    folder: Option<String>,
) -> Result<()> {
    if text1.is_none() && text2.is_none() {
        bail!("nothing to edit (pass --text1 and/or --text2)");
    }
    let collection = collection_for(tracker, folder.as_deref())?;
    let task = tracker.task_by_serial(&collection, serial)?;

    for (slot, value) in [(Slot::First, text1), (Slot::Second, text2)] {
        if let Some(v) = value {
            tracker.set_text(&collection, &task.id, slot, Some(v))?;
        }
    }
    println!("#{serial} updated.");
    Ok(())
}

fn attach(
    tracker: &mut Tracker<JsonFileStore>,
    serial: u32,
    slot: u8,
    file: &Path,
    folder: Option<String>,
) -> Result<()> {
    let slot = parse_slot(slot)?;
    let collection = collection_for(tracker, folder.as_deref())?;
    let task = tracker.task_by_serial(&collection, serial)?;

    let bytes = fs::read(file).with_context(|| format!("read {}", file.display()))?;
    let attachment = Attachment {
        media_type: media_type_for(file).to_string(),
        bytes,
    };
    tracker.set_image(&collection, &task.id, slot, Some(attachment))?;
    println!("Attached {} to #{serial}.", file.display());
    Ok(())
}

fn detach(
    tracker: &mut Tracker<JsonFileStore>,
    serial: u32,
    slot: u8,
    folder: Option<String>,
) -> Result<()> {
    let slot = parse_slot(slot)?;
    let collection = collection_for(tracker, folder.as_deref())?;
    let task = tracker.task_by_serial(&collection, serial)?;
    tracker.set_image(&collection, &task.id, slot, None)?;
    println!("Removed image from #{serial}.");
    Ok(())
}

fn parse_slot(n: u8) -> Result<Slot> {
    Slot::from_number(n).ok_or_else(|| anyhow::anyhow!("slot must be 1 or 2"))
}

fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// One-line summary: `#3  due 7-1-2024  (1-1-2024 -> 10-1-2024)  notes`
pub fn task_line(t: &Task) -> String {
    let mut line = format!(
        "#{:<3} due {:<10}  ({} -> {})",
        t.serial_number,
        format_date(t.current_date),
        format_date(t.created_at),
        format_date(t.end_date)
    );
    if let Some(text) = t.text(Slot::First) {
        line.push_str("  ");
        line.push_str(text);
    }
    if t.image1.is_some() || t.image2.is_some() {
        line.push_str("  [img]");
    }
    line
}

/// Like [`task_line`], flagging tasks due on `date`.
pub fn task_line_on(t: &Task, date: chrono::NaiveDate) -> String {
    if is_due_on(t, date) {
        format!("* {}", task_line(t))
    } else {
        format!("  {}", task_line(t))
    }
}
