//! Single-file JSON store.
//!
//! The whole database (folders + task collections) lives in one document.
//! Every write rewrites the file via a temp file + rename, so a crash leaves
//! either the old or the new contents. Concurrent writers are
//! last-writer-wins.

use aura_core::{
    CollectionId, Folder, NewTask, StoreData, StoreError, StoreResult, Task, TaskId, TaskPatch,
    TaskStore,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: StoreData,
}

impl JsonFileStore {
    /// Load `path`, or start empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let data = if path.exists() {
            let s = fs::read_to_string(&path)?;
            if s.trim().is_empty() {
                StoreData::default()
            } else {
                serde_json::from_str(&s)
                    .map_err(|e| StoreError::Codec(format!("{}: {e}", path.display())))?
            }
        } else {
            StoreData::default()
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| StoreError::Codec(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TaskStore for JsonFileStore {
    fn create_task(&mut self, collection: &CollectionId, task: NewTask) -> StoreResult<TaskId> {
        let id = self.data.create_task(collection, task)?;
        self.save()?;
        Ok(id)
    }

    fn update_task(
        &mut self,
        collection: &CollectionId,
        id: &str,
        patch: &TaskPatch,
    ) -> StoreResult<()> {
        self.data.update_task(collection, id, patch)?;
        self.save()
    }

    fn delete_task(&mut self, collection: &CollectionId, id: &str) -> StoreResult<()> {
        self.data.delete_task(collection, id)?;
        self.save()
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
            self.save()?;
        }
        Ok(changed)
    }

    /// Delete and renumber in memory, then write the document once.
    fn delete_and_compact(&mut self, collection: &CollectionId, id: &str) -> StoreResult<usize> {
        self.data.delete_task(collection, id)?;
        let changed = self.data.compact_serials(collection)?;
        self.save()?;
        Ok(changed)
    }

    fn create_folder(&mut self, name: &str) -> StoreResult<Folder> {
        let folder = self.data.create_folder(name)?;
        self.save()?;
        Ok(folder)
    }

    fn rename_folder(&mut self, id: &str, name: &str) -> StoreResult<()> {
        self.data.rename_folder(id, name)?;
        self.save()
    }

    fn delete_folder(&mut self, id: &str) -> StoreResult<()> {
        self.data.delete_folder(id)?;
        self.save()
    }

    fn list_folders(&self) -> StoreResult<Vec<Folder>> {
        self.data.list_folders()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::{Slot, Tracker};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("tasks.json")).unwrap();
        assert!(store.list_tasks(&CollectionId::TopLevel).unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.json");
        let top = CollectionId::TopLevel;

        let mut tr = Tracker::new(JsonFileStore::open(&path).unwrap());
        let folder = tr.create_folder("Work").unwrap();
        let t = tr.create_task(&top, d(1), d(10)).unwrap();
        tr.set_text(&top, &t.id, Slot::First, Some("renew lease".into()))
            .unwrap();
        tr.defer(&top, &t.id, chrono::Utc::now()).unwrap();

        let reopened = Tracker::new(JsonFileStore::open(&path).unwrap());
        let loaded = reopened.task(&top, &t.id).unwrap();
        assert_eq!(loaded.current_date, d(4));
        assert_eq!(loaded.current_aura_index, 2);
        assert_eq!(loaded.text1.as_deref(), Some("renew lease"));
        assert_eq!(reopened.folders().unwrap(), vec![folder]);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_stored_document_uses_collection_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");

        let mut tr = Tracker::new(JsonFileStore::open(&path).unwrap());
        let folder = tr.create_folder("Home").unwrap();
        tr.create_task(&CollectionId::Folder(folder.id.clone()), d(1), d(3))
            .unwrap();

        let v: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let key = format!("folder-{}", folder.id);
        assert_eq!(v["collections"][key.as_str()][0]["serialNumber"], 1);
        assert_eq!(v["folders"][0]["name"], "Home");
    }

    #[test]
    fn test_completing_middle_task_persists_dense_serials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let top = CollectionId::TopLevel;

        let mut tr = Tracker::new(JsonFileStore::open(&path).unwrap());
        let ids: Vec<_> = (0..4)
            .map(|_| tr.create_task(&top, d(1), d(20)).unwrap().id)
            .collect();
        tr.complete(&top, &ids[1]).unwrap();

        let mut reopened = Tracker::new(JsonFileStore::open(&path).unwrap());
        let serials: Vec<_> = reopened
            .tasks(&top)
            .unwrap()
            .into_iter()
            .map(|t| (t.id, t.serial_number))
            .collect();
        assert_eq!(
            serials,
            vec![(ids[0].clone(), 1), (ids[2].clone(), 2), (ids[3].clone(), 3)]
        );

        let next = reopened.create_task(&top, d(1), d(20)).unwrap();
        assert_eq!(next.serial_number, 4);
    }

    #[test]
    fn test_corrupt_file_is_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Codec(_))));
    }
}
