//! Local-first synchronization.
//!
//! - `SyncEngine`: network first, local store on failure, queue on write failure
//! - `ReplayWorker`: drains the offline queues once the server is back
//! - `query`: cuisine/neighborhood filters and distinct lists over restaurants

pub mod engine;
pub mod query;
pub mod replay;

pub use engine::{SubmitOutcome, SyncEngine};
pub use replay::{FavoriteReplayMode, ReplayReport, ReplayWorker};
