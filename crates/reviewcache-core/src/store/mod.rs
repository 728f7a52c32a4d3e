//! Local persistent store for offline data access.
//!
//! `LocalStore` keeps four collections as JSON files under the data
//! directory:
//! - `restaurants`: keyed by restaurant id, newer `updatedAt` wins
//! - `reviews`: keyed by review id, newer `updatedAt` wins
//! - `offline_reviews`: reviews waiting for replay, keyed by sequence number
//! - `offline_favorites`: favorite toggles waiting for replay, keyed by
//!   restaurant id (last write wins)

mod collection;
pub mod error;
pub mod local;
pub mod merge;

pub use error::StoreError;
pub use local::{CollectionAges, LocalStore, PendingCounts};
pub use merge::merge_newer;
