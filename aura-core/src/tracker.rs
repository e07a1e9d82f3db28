//! Tracker service: runs user actions against a [`TaskStore`].
//!
//! Every action is a read / compute / write sequence. The scheduling parts
//! (aura dates, due state, defer) come from the pure modules; this layer
//! only adds serial numbering, persistence and logging.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::collection::{CollectionId, Folder};
use crate::due::{Advance, advance, initial_due_date, is_due_on, partition_due};
use crate::error::{TrackerError, TrackerResult};
use crate::store::{StoreError, TaskStore};
use crate::task::{Attachment, NewTask, Slot, Task, TaskPatch};
use crate::time::format_date;

/// A collection snapshot split by due state for one reference date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DueSplit {
    pub due: Vec<Task>,
    pub other: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderDueSummary {
    pub folder: Folder,
    pub count: usize,
    pub serials: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderMatches {
    pub folder: Folder,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub top_level: Vec<Task>,
    pub folders: Vec<FolderMatches>,
}

impl SearchResults {
    pub fn total(&self) -> usize {
        self.top_level.len() + self.folders.iter().map(|f| f.tasks.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

pub struct Tracker<S> {
    store: S,
}

impl<S: TaskStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Create a task for the window `[start, end]`.
    ///
    /// Rejected before any write when the window yields fewer than two aura
    /// dates.
    pub fn create_task(
        &mut self,
        collection: &CollectionId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> TrackerResult<Task> {
        let init = initial_due_date(start, end, collection.initial_date_strategy())?;
        let serial_number = self.store.list_tasks(collection)?.len() as u32 + 1;

        debug!(
            serial = serial_number,
            aura_dates = %init
                .aura_dates
                .iter()
                .map(|d| format_date(*d))
                .collect::<Vec<_>>()
                .join(", "),
            "generated aura dates"
        );

        let new = NewTask {
            serial_number,
            created_at: start,
            end_date: end,
            current_date: init.date,
            current_aura_index: init.index,
        };
        let id = self.store.create_task(collection, new.clone())?;

        info!(
            %collection,
            serial = serial_number,
            current_date = %format_date(init.date),
            "task created"
        );
        Ok(new.into_task(id))
    }

    pub fn task(&self, collection: &CollectionId, id: &str) -> TrackerResult<Task> {
        self.store
            .get_task(collection, id)?
            .ok_or_else(|| StoreError::TaskNotFound(id.to_string()).into())
    }

    pub fn task_by_serial(&self, collection: &CollectionId, serial: u32) -> TrackerResult<Task> {
        self.store
            .list_tasks(collection)?
            .into_iter()
            .find(|t| t.serial_number == serial)
            .ok_or_else(|| TrackerError::SerialNotFound {
                collection: collection.clone(),
                serial,
            })
    }

    pub fn tasks(&self, collection: &CollectionId) -> TrackerResult<Vec<Task>> {
        Ok(self.store.list_tasks(collection)?)
    }

    /// "Not done": move the task to its next aura date.
    ///
    /// A task with no aura date left is not touched.
    pub fn defer(
        &mut self,
        collection: &CollectionId,
        id: &str,
        now: DateTime<Utc>,
    ) -> TrackerResult<Advance> {
        let mut task = self.task(collection, id)?;
        let outcome = advance(&mut task, now);

        match outcome {
            Advance::Moved {
                from,
                to,
                index,
                drifted,
            } => {
                if drifted {
                    warn!(
                        %collection,
                        serial = task.serial_number,
                        current_date = %format_date(from),
                        "current date is not an aura date; using next later one"
                    );
                }
                let patch = TaskPatch {
                    current_date: Some(to),
                    current_aura_index: Some(index),
                    last_updated: Some(Some(now)),
                    ..TaskPatch::default()
                };
                self.store.update_task(collection, id, &patch)?;
                info!(
                    %collection,
                    serial = task.serial_number,
                    from = %format_date(from),
                    to = %format_date(to),
                    "task deferred"
                );
            }
            Advance::Exhausted => {
                info!(
                    %collection,
                    serial = task.serial_number,
                    "no aura date left; task awaits completion"
                );
            }
        }

        Ok(outcome)
    }

    /// "Done": delete the task, then close the serial gap it leaves.
    pub fn complete(&mut self, collection: &CollectionId, id: &str) -> TrackerResult<Task> {
        let task = self.task(collection, id)?;
        let renumbered = self.store.delete_and_compact(collection, id)?;

        info!(
            %collection,
            serial = task.serial_number,
            renumbered,
            "task completed"
        );
        Ok(task)
    }

    pub fn set_text(
        &mut self,
        collection: &CollectionId,
        id: &str,
        slot: Slot,
        text: Option<String>,
    ) -> TrackerResult<()> {
        let text = text.filter(|t| !t.trim().is_empty());
        self.store
            .update_task(collection, id, &TaskPatch::text(slot, text))?;
        Ok(())
    }

    pub fn set_image(
        &mut self,
        collection: &CollectionId,
        id: &str,
        slot: Slot,
        image: Option<Attachment>,
    ) -> TrackerResult<()> {
        self.store
            .update_task(collection, id, &TaskPatch::image(slot, image))?;
        Ok(())
    }

    pub fn due_on(&self, collection: &CollectionId, date: NaiveDate) -> TrackerResult<DueSplit> {
        let (due, other) = partition_due(self.store.list_tasks(collection)?, date);
        Ok(DueSplit { due, other })
    }

    /// Folders holding at least one task due on `date`.
    pub fn folders_with_due_tasks(&self, date: NaiveDate) -> TrackerResult<Vec<FolderDueSummary>> {
        let mut out = Vec::new();
        for folder in self.store.list_folders()? {
            let collection = CollectionId::Folder(folder.id.clone());
            let serials: Vec<u32> = self
                .store
                .list_tasks(&collection)?
                .iter()
                .filter(|t| is_due_on(t, date))
                .map(|t| t.serial_number)
                .collect();

            if !serials.is_empty() {
                out.push(FolderDueSummary {
                    folder,
                    count: serials.len(),
                    serials,
                });
            }
        }
        Ok(out)
    }

    /// Search the top level and every folder. See [`Task::matches`].
    ///
    /// A folder that cannot be read is skipped with a warning.
    pub fn search(&self, term: &str) -> TrackerResult<SearchResults> {
        if term.trim().is_empty() {
            return Ok(SearchResults::default());
        }

        let top_level = self
            .store
            .list_tasks(&CollectionId::TopLevel)?
            .into_iter()
            .filter(|t| t.matches(term))
            .collect();

        let mut folders = Vec::new();
        for folder in self.store.list_folders()? {
            let collection = CollectionId::Folder(folder.id.clone());
            let tasks = match self.store.list_tasks(&collection) {
                Ok(tasks) => tasks,
                Err(e) => {
                    warn!(folder = %folder.name, error = %e, "skipping folder in search");
                    continue;
                }
            };
            let tasks: Vec<Task> = tasks.into_iter().filter(|t| t.matches(term)).collect();
            if !tasks.is_empty() {
                folders.push(FolderMatches { folder, tasks });
            }
        }

        Ok(SearchResults { top_level, folders })
    }

    pub fn folders(&self) -> TrackerResult<Vec<Folder>> {
        Ok(self.store.list_folders()?)
    }

    pub fn create_folder(&mut self, name: &str) -> TrackerResult<Folder> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::EmptyFolderName);
        }
        let folder = self.store.create_folder(name)?;
        info!(folder = %folder.name, id = %folder.id, "folder created");
        Ok(folder)
    }

    pub fn rename_folder(&mut self, id: &str, name: &str) -> TrackerResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::EmptyFolderName);
        }
        self.store.rename_folder(id, name)?;
        info!(id, folder = name, "folder renamed");
        Ok(())
    }

    pub fn delete_folder(&mut self, id: &str) -> TrackerResult<()> {
        self.store.delete_folder(id)?;
        info!(id, "folder deleted");
        Ok(())
    }

    /// Find a folder by exact id, else by case-insensitive name.
    pub fn resolve_folder(&self, name_or_id: &str) -> TrackerResult<Folder> {
        let folders = self.store.list_folders()?;
        let needle = name_or_id.trim();

        folders
            .iter()
            .find(|f| f.id == needle)
            .or_else(|| folders.iter().find(|f| f.name.eq_ignore_ascii_case(needle)))
            .cloned()
            .ok_or_else(|| TrackerError::UnknownFolder(needle.to_string()))
    }
}
