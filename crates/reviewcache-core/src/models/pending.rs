use serde::{Deserialize, Serialize};

use super::{NewReview, Timestamp};

/// A review waiting to be replayed to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingReview {
    /// Queue sequence number, assigned on enqueue and never reused.
    pub seq: u64,
    pub review: NewReview,
    pub queued_at: Timestamp,
}

/// The latest favorite state the user chose for a restaurant while offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PendingFavorite {
    pub restaurant_id: i64,
    #[serde(rename = "isFavorite")]
    pub is_favorite: bool,
}

/// An entry for one of the pending queues.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingRecord {
    Review(NewReview),
    Favorite(PendingFavorite),
}
