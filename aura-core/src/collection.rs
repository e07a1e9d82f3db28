//! Collections: the top-level list and per-folder namespaces.
//!
//! Each collection has its own serial-number space. The initial due-date
//! policy is a property of the collection kind.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::due::InitialDateStrategy;
use crate::task::Task;

pub type FolderId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CollectionId {
    TopLevel,
    Folder(FolderId),
}

impl CollectionId {
    pub fn initial_date_strategy(&self) -> InitialDateStrategy {
        match self {
            CollectionId::TopLevel => InitialDateStrategy::SecondAuraDate,
            CollectionId::Folder(_) => InitialDateStrategy::FirstAuraDateAfterStart,
        }
    }

    /// Key a document store files this collection under.
    pub fn storage_key(&self) -> String {
        match self {
            CollectionId::TopLevel => "tasks".to_string(),
            CollectionId::Folder(id) => format!("folder-{id}"),
        }
    }

    pub fn folder_id(&self) -> Option<&str> {
        match self {
            CollectionId::TopLevel => None,
            CollectionId::Folder(id) => Some(id),
        }
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionId::TopLevel => write!(f, "top-level tasks"),
            CollectionId::Folder(id) => write!(f, "folder {id}"),
        }
    }
}

/// Rewrite serials to a dense `1..=N` in existing serial order.
///
/// Sorts `tasks` by serial and returns how many records changed.
pub fn compact_serials(tasks: &mut [Task]) -> usize {
    tasks.sort_by_key(|t| t.serial_number);

    let mut changed = 0;
    for (i, t) in tasks.iter_mut().enumerate() {
        let serial = i as u32 + 1;
        if t.serial_number != serial {
            t.serial_number = serial;
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::NewTask;
    use chrono::NaiveDate;

    fn task(id: &str, serial: u32) -> Task {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        NewTask {
            serial_number: serial,
            created_at: d,
            end_date: d,
            current_date: d,
            current_aura_index: 0,
        }
        .into_task(id.to_string())
    }

    #[test]
    fn test_compaction_closes_gaps_in_order() {
        let mut tasks = vec![task("c", 5), task("a", 1), task("b", 3)];
        let changed = compact_serials(&mut tasks);

        assert_eq!(changed, 2);
        let got: Vec<_> = tasks.iter().map(|t| (t.id.as_str(), t.serial_number)).collect();
        assert_eq!(got, vec![("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(compact_serials(&mut tasks), 0);
    }

    #[test]
    fn test_strategy_follows_collection_kind() {
        assert_eq!(
            CollectionId::TopLevel.initial_date_strategy(),
            InitialDateStrategy::SecondAuraDate
        );
        let folder = CollectionId::Folder("f1".to_string());
        assert_eq!(
            folder.initial_date_strategy(),
            InitialDateStrategy::FirstAuraDateAfterStart
        );
        assert_eq!(folder.storage_key(), "folder-f1");
        assert_eq!(CollectionId::TopLevel.storage_key(), "tasks");
    }
}
