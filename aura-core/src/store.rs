//! Persistence contract and in-memory implementation.
//!
//! The scheduling core never touches storage directly. A store only has to
//! hold records shaped like [`Task`] / [`Folder`], apply partial updates, and
//! hand back collections ordered by serial number. Writes are
//! last-writer-wins; nothing here checks for concurrent modification.

use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc::{self, Receiver, Sender};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::collection::{CollectionId, Folder, FolderId};
use crate::task::{NewTask, Task, TaskId, TaskPatch};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("folder {0} not found")]
    FolderNotFound(FolderId),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait TaskStore {
    /// Write a new record and return its assigned id.
    fn create_task(&mut self, collection: &CollectionId, task: NewTask) -> StoreResult<TaskId>;

    fn update_task(
        &mut self,
        collection: &CollectionId,
        id: &str,
        patch: &TaskPatch,
    ) -> StoreResult<()>;

    fn delete_task(&mut self, collection: &CollectionId, id: &str) -> StoreResult<()>;

    fn get_task(&self, collection: &CollectionId, id: &str) -> StoreResult<Option<Task>>;

    /// All tasks in `collection`, ordered by serial number.
    fn list_tasks(&self, collection: &CollectionId) -> StoreResult<Vec<Task>>;

    /// Reassign serials to a dense `1..=N`, keeping their order. Returns how
    /// many records changed. Implementations persist the result as one write.
    fn compact_serials(&mut self, collection: &CollectionId) -> StoreResult<usize>;

    /// Delete a task and close the serial gap it leaves.
    fn delete_and_compact(&mut self, collection: &CollectionId, id: &str) -> StoreResult<usize> {
        self.delete_task(collection, id)?;
        self.compact_serials(collection)
    }

    fn create_folder(&mut self, name: &str) -> StoreResult<Folder>;

    fn rename_folder(&mut self, id: &str, name: &str) -> StoreResult<()>;

    /// Remove a folder together with its task collection.
    fn delete_folder(&mut self, id: &str) -> StoreResult<()>;

    /// Folders in creation order.
    fn list_folders(&self) -> StoreResult<Vec<Folder>>;
}

/// Plain store contents: folders plus task collections keyed by
/// [`CollectionId::storage_key`]. Serializable as one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub collections: BTreeMap<String, Vec<Task>>,
}

impl StoreData {
    fn ensure_collection(&self, collection: &CollectionId) -> StoreResult<()> {
        match collection.folder_id() {
            Some(id) if !self.folders.iter().any(|f| f.id == id) => {
                Err(StoreError::FolderNotFound(id.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn task_mut(&mut self, collection: &CollectionId, id: &str) -> StoreResult<&mut Task> {
        self.collections
            .get_mut(&collection.storage_key())
            .and_then(|tasks| tasks.iter_mut().find(|t| t.id == id))
            .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))
    }

    fn folder_mut(&mut self, id: &str) -> StoreResult<&mut Folder> {
        self.folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| StoreError::FolderNotFound(id.to_string()))
    }
}

impl TaskStore for StoreData {
    fn create_task(&mut self, collection: &CollectionId, task: NewTask) -> StoreResult<TaskId> {
        self.ensure_collection(collection)?;
        let id = Uuid::new_v4().to_string();
        self.collections
            .entry(collection.storage_key())
            .or_default()
            .push(task.into_task(id.clone()));
        Ok(id)
    }

    fn update_task(
        &mut self,
        collection: &CollectionId,
        id: &str,
        patch: &TaskPatch,
    ) -> StoreResult<()> {
        patch.apply(self.task_mut(collection, id)?);
        Ok(())
    }

    fn delete_task(&mut self, collection: &CollectionId, id: &str) -> StoreResult<()> {
        let tasks = self
            .collections
            .get_mut(&collection.storage_key())
            .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(StoreError::TaskNotFound(id.to_string()));
        }
        Ok(())
    }

    fn get_task(&self, collection: &CollectionId, id: &str) -> StoreResult<Option<Task>> {
        Ok(self
            .collections
            .get(&collection.storage_key())
            .and_then(|tasks| tasks.iter().find(|t| t.id == id))
            .cloned())
    }

    fn list_tasks(&self, collection: &CollectionId) -> StoreResult<Vec<Task>> {
        self.ensure_collection(collection)?;
        let mut tasks = self
            .collections
            .get(&collection.storage_key())
            .cloned()
            .unwrap_or_default();
        tasks.sort_by_key(|t| t.serial_number);
        Ok(tasks)
    }

    fn compact_serials(&mut self, collection: &CollectionId) -> StoreResult<usize> {
        self.ensure_collection(collection)?;
        Ok(self
            .collections
            .get_mut(&collection.storage_key())
            .map(|tasks| crate::collection::compact_serials(tasks))
            .unwrap_or(0))
    }

    fn create_folder(&mut self, name: &str) -> StoreResult<Folder> {
        let folder = Folder {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.folders.push(folder.clone());
        Ok(folder)
    }

    fn rename_folder(&mut self, id: &str, name: &str) -> StoreResult<()> {
        self.folder_mut(id)?.name = name.to_string();
        Ok(())
    }

    fn delete_folder(&mut self, id: &str) -> StoreResult<()> {
        let before = self.folders.len();
        self.folders.retain(|f| f.id != id);
        if self.folders.len() == before {
            return Err(StoreError::FolderNotFound(id.to_string()));
        }
        self.collections
            .remove(&CollectionId::Folder(id.to_string()).storage_key());
        Ok(())
    }

    fn list_folders(&self) -> StoreResult<Vec<Folder>> {
        let mut folders = self.folders.clone();
        folders.sort_by_key(|f| f.created_at);
        Ok(folders)
    }
}

/// In-memory store with per-collection snapshot subscriptions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: StoreData,
    listeners: HashMap<CollectionId, Vec<Sender<Vec<Task>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }

    /// Receive the ordered snapshot of `collection` now and after every
    /// write to it. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self, collection: &CollectionId) -> Receiver<Vec<Task>> {
        let (tx, rx) = mpsc::channel();
        let snapshot = self.data.list_tasks(collection).unwrap_or_default();
        if tx.send(snapshot).is_ok() {
            self.listeners
                .entry(collection.clone())
                .or_default()
                .push(tx);
        }
        rx
    }

    fn notify(&mut self, collection: &CollectionId) {
        let Some(senders) = self.listeners.get_mut(collection) else {
            return;
        };
        let snapshot = self.data.list_tasks(collection).unwrap_or_default();
        senders.retain(|tx| tx.send(snapshot.clone()).is_ok());
        if senders.is_empty() {
            self.listeners.remove(collection);
        }
    }
}

impl TaskStore for MemoryStore {
    fn create_task(&mut self, collection: &CollectionId, task: NewTask) -> StoreResult<TaskId> {
        let id = self.data.create_task(collection, task)?;
        self.notify(collection);
        Ok(id)
    }

    fn update_task(
        &mut self,
        collection: &CollectionId,
        id: &str,
        patch: &TaskPatch,
    ) -> StoreResult<()> {
        self.data.update_task(collection, id, patch)?;
        self.notify(collection);
        Ok(())
    }

    fn delete_task(&mut self, collection: &CollectionId, id: &str) -> StoreResult<()> {
        self.data.delete_task(collection, id)?;
        self.notify(collection);
        Ok(())
    }

    fn get_task(&self, collection: &CollectionId, id: &str) -> StoreResult<Option<Task>> {
        self.data.get_task(collection, id)
    }

    fn list_tasks(&self, collection: &CollectionId) -> StoreResult<Vec<Task>> {
        self.data.list_tasks(collection)
    }

    fn compact_serials(&mut self, collection: &CollectionId) -> StoreResult<usize> {
        let changed = self.data.compact_serials(collection)?;
        if changed > 0 {
            self.notify(collection);
        }
        Ok(changed)
    }

    fn delete_and_compact(&mut self, collection: &CollectionId, id: &str) -> StoreResult<usize> {
        self.data.delete_task(collection, id)?;
        let changed = self.data.compact_serials(collection)?;
        self.notify(collection);
        Ok(changed)
    }

    fn create_folder(&mut self, name: &str) -> StoreResult<Folder> {
        self.data.create_folder(name)
    }

    fn rename_folder(&mut self, id: &str, name: &str) -> StoreResult<()> {
        self.data.rename_folder(id, name)
    }

    fn delete_folder(&mut self, id: &str) -> StoreResult<()> {
        self.data.delete_folder(id)?;
        let collection = CollectionId::Folder(id.to_string());
        // Folder is gone, so listeners get a final empty snapshot.
        if let Some(senders) = self.listeners.remove(&collection) {
            for tx in senders {
                let _ = tx.send(Vec::new());
            }
        }
        Ok(())
    }

    fn list_folders(&self) -> StoreResult<Vec<Folder>> {
        self.data.list_folders()
    }
}
