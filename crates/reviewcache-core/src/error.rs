use thiserror::Error;

use crate::store::StoreError;

/// Errors reported to callers of the sync layer.
///
/// Network failures never appear here: reads fall back to the local store and
/// writes are queued. What is left is a miss on both sides, or a store that
/// cannot be used.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl SyncError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound(_))
    }
}
