use chrono::NaiveDate;
use thiserror::Error;

use crate::collection::CollectionId;
use crate::store::StoreError;

/// Scheduling failures. These are deterministic functions of bad input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuraError {
    #[error("insufficient aura dates: window {start}..{end} yields {count} date(s), need at least 2")]
    InsufficientAuraDates {
        start: NaiveDate,
        end: NaiveDate,
        count: usize,
    },
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error(transparent)]
    Aura(#[from] AuraError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("no task #{serial} in {collection}")]
    SerialNotFound { collection: CollectionId, serial: u32 },

    #[error("no folder matching '{0}'")]
    UnknownFolder(String),

    #[error("folder name must not be empty")]
    EmptyFolderName,
}

pub type TrackerResult<T> = Result<T, TrackerError>;
