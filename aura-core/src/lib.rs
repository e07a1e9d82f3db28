//! aura-core: aura-date scheduling for the Aura task tracker

pub mod aura;
pub mod collection;
pub mod due;
pub mod error;
pub mod store;
pub mod task;
pub mod time;
pub mod tracker;

pub use aura::{GapTier, generate_aura_dates};
pub use collection::{CollectionId, Folder, FolderId, compact_serials};
pub use due::{
    Advance, InitialDateStrategy, InitialDue, advance, aura_dates_for, aura_position,
    initial_due_date, is_due_on, next_aura_date, partition_due,
};
pub use error::{AuraError, TrackerError, TrackerResult};
pub use store::{MemoryStore, StoreData, StoreError, StoreResult, TaskStore};
pub use task::{Attachment, NewTask, Slot, Task, TaskId, TaskPatch};
pub use time::{format_date, parse_date};
pub use tracker::{DueSplit, FolderDueSummary, FolderMatches, SearchResults, Tracker};
