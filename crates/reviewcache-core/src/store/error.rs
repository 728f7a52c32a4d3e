use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable at {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error on {collection}: {source}")]
    Io {
        collection: &'static str,
        source: std::io::Error,
    },

    #[error("Corrupt {collection} collection: {source}")]
    Corrupt {
        collection: &'static str,
        source: serde_json::Error,
    },

    #[error("Failed to serialize {collection}: {source}")]
    Serialize {
        collection: &'static str,
        source: serde_json::Error,
    },

    #[error("Transaction on {collection} aborted: {reason}")]
    Aborted {
        collection: &'static str,
        reason: String,
    },
}
