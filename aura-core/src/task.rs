//! Task record.
//!
//! Field names serialize in camelCase so a stored record reads
//! `{ serialNumber, createdAt, endDate, currentDate, currentAuraIndex, ... }`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type TaskId = String;

/// One of the two text / image slots on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Slot::First),
            2 => Some(Slot::Second),
            _ => None,
        }
    }
}

/// Binary attachment (image1 / image2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,

    /// Dense 1..N display ordinal within the owning collection.
    pub serial_number: u32,

    /// Start of the scheduling window. Immutable.
    pub created_at: NaiveDate,
    /// End of the scheduling window. Immutable.
    pub end_date: NaiveDate,

    /// Active due date; always one of the window's aura dates.
    pub current_date: NaiveDate,
    /// Cached position of `current_date` in the aura sequence.
    pub current_aura_index: usize,

    #[serde(default)]
    pub text1: Option<String>,
    #[serde(default)]
    pub text2: Option<String>,
    #[serde(default)]
    pub image1: Option<Attachment>,
    #[serde(default)]
    pub image2: Option<Attachment>,

    /// Time of the last defer.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Task {
    pub fn text(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::First => self.text1.as_deref(),
            Slot::Second => self.text2.as_deref(),
        }
    }

    pub fn image(&self, slot: Slot) -> Option<&Attachment> {
        match slot {
            Slot::First => self.image1.as_ref(),
            Slot::Second => self.image2.as_ref(),
        }
    }

    /// Search match: `term` equals the serial (`7` or `#7`), or is a
    /// case-insensitive substring of either text field.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }

        let serial = self.serial_number.to_string();
        if term.strip_prefix('#').unwrap_or(term) == serial {
            return true;
        }

        let needle = term.to_lowercase();
        [self.text1.as_deref(), self.text2.as_deref()]
            .into_iter()
            .flatten()
            .any(|t| t.to_lowercase().contains(&needle))
    }
}

/// Fields supplied when a task is first written; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub serial_number: u32,
    pub created_at: NaiveDate,
    pub end_date: NaiveDate,
    pub current_date: NaiveDate,
    pub current_aura_index: usize,
}

impl NewTask {
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            serial_number: self.serial_number,
            created_at: self.created_at,
            end_date: self.end_date,
            current_date: self.current_date,
            current_aura_index: self.current_aura_index,
            text1: None,
            text2: None,
            image1: None,
            image2: None,
            last_updated: None,
        }
    }
}

/// Partial update. `None` leaves a field alone; `Some(None)` clears it.
///
/// `created_at` and `end_date` are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub current_date: Option<NaiveDate>,
    pub current_aura_index: Option<usize>,
    pub text1: Option<Option<String>>,
    pub text2: Option<Option<String>>,
    pub image1: Option<Option<Attachment>>,
    pub image2: Option<Option<Attachment>>,
    pub last_updated: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn text(slot: Slot, value: Option<String>) -> Self {
        match slot {
            Slot::First => Self {
                text1: Some(value),
                ..Self::default()
            },
            Slot::Second => Self {
                text2: Some(value),
                ..Self::default()
            },
        }
    }

    pub fn image(slot: Slot, value: Option<Attachment>) -> Self {
        match slot {
            Slot::First => Self {
                image1: Some(value),
                ..Self::default()
            },
            Slot::Second => Self {
                image2: Some(value),
                ..Self::default()
            },
        }
    }

    pub fn apply(&self, task: &mut Task) {
        if let Some(v) = self.current_date {
            task.current_date = v;
        }
        if let Some(v) = self.current_aura_index {
            task.current_aura_index = v;
        }
        if let Some(v) = &self.text1 {
            task.text1 = v.clone();
        }
        if let Some(v) = &self.text2 {
            task.text2 = v.clone();
        }
        if let Some(v) = &self.image1 {
            task.image1 = v.clone();
        }
        if let Some(v) = &self.image2 {
            task.image2 = v.clone();
        }
        if let Some(v) = self.last_updated {
            task.last_updated = v;
        }
    }
}
