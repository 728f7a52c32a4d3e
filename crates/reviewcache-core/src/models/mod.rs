//! Data models for restaurant-review entities.
//!
//! - `Restaurant`, `LatLng`: restaurant records served by `/restaurants`
//! - `Review`, `NewReview`: confirmed reviews and user submissions
//! - `PendingReview`, `PendingFavorite`: entries of the offline queues
//! - `Timestamp`: the `updatedAt` clock used for newer-wins merging

mod lenient;
pub mod pending;
pub mod restaurant;
pub mod review;
pub mod timestamp;

pub use pending::{PendingFavorite, PendingRecord, PendingReview};
pub use restaurant::{LatLng, Restaurant};
pub use review::{NewReview, Review};
pub use timestamp::Timestamp;

/// A server record that is keyed by id and versioned by `updatedAt`.
pub trait Versioned {
    fn key(&self) -> i64;
    fn updated_at(&self) -> Timestamp;
}
