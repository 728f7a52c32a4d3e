use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::collection::{Collection, CollectionFile};
use super::merge::merge_newer;
use super::StoreError;
use crate::models::{
    NewReview, PendingFavorite, PendingRecord, PendingReview, Restaurant, Review, Timestamp,
};

/// Persistent on-device store for restaurants, reviews and the offline queues.
///
/// Each collection lives in its own JSON file under the data directory.
/// Share one instance (behind an `Arc`) between every component that touches
/// the same directory; the per-collection locks only serialize writers that
/// go through the same `LocalStore`.
pub struct LocalStore {
    data_dir: PathBuf,
    restaurants: Collection<i64, Restaurant>,
    reviews: Collection<i64, Review>,
    offline_reviews: Collection<u64, PendingReview>,
    offline_favorites: Collection<i64, PendingFavorite>,
}

impl LocalStore {
    /// Open (creating if needed) the store rooted at `data_dir`.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|source| StoreError::Unavailable {
                path: data_dir.clone(),
                source,
            })?;

        debug!(?data_dir, "Local store opened");
        Ok(Self {
            restaurants: Collection::new(&data_dir, "restaurants"),
            reviews: Collection::new(&data_dir, "reviews"),
            offline_reviews: Collection::new(&data_dir, "offline_reviews"),
            offline_favorites: Collection::new(&data_dir, "offline_favorites"),
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // ===== Restaurants =====

    /// Merge one or many restaurants, newer `updatedAt` wins.
    pub async fn put_restaurants<I>(&self, restaurants: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = Restaurant>,
    {
        let incoming: Vec<Restaurant> = restaurants.into_iter().collect();
        self.restaurants
            .update(move |file| {
                let written = merge_newer(&mut file.records, incoming);
                (written, written > 0)
            })
            .await
    }

    pub async fn get_restaurants(&self) -> Result<Vec<Restaurant>, StoreError> {
        self.restaurants
            .read(|file| file.records.values().cloned().collect())
            .await
    }

    pub async fn get_restaurant(&self, id: i64) -> Result<Option<Restaurant>, StoreError> {
        self.restaurants
            .read(move |file| file.records.get(&id).cloned())
            .await
    }

    // ===== Reviews =====

    /// Merge one or many reviews, newer `updatedAt` wins.
    pub async fn put_reviews<I>(&self, reviews: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = Review>,
    {
        let incoming: Vec<Review> = reviews.into_iter().collect();
        self.reviews
            .update(move |file| {
                let written = merge_newer(&mut file.records, incoming);
                (written, written > 0)
            })
            .await
    }

    pub async fn get_reviews(&self, restaurant_id: i64) -> Result<Vec<Review>, StoreError> {
        self.reviews
            .read(move |file| {
                file.records
                    .values()
                    .filter(|r| r.restaurant_id == restaurant_id)
                    .cloned()
                    .collect()
            })
            .await
    }

    // ===== Offline queues =====

    /// Add a record to its pending queue.
    ///
    /// Reviews are appended under a fresh sequence number. Favorites are keyed
    /// by restaurant, so a newer toggle replaces any earlier pending value.
    pub async fn put_offline_pending(&self, record: PendingRecord) -> Result<(), StoreError> {
        match record {
            PendingRecord::Review(review) => self.put_offline_review(review).await.map(|_| ()),
            PendingRecord::Favorite(favorite) => {
                self.put_offline_favorite(favorite.restaurant_id, favorite.is_favorite)
                    .await
            }
        }
    }

    /// Queue a review and return its sequence number.
    pub async fn put_offline_review(&self, review: NewReview) -> Result<u64, StoreError> {
        let seq = self
            .offline_reviews
            .update(move |file| {
                file.last_seq += 1;
                let seq = file.last_seq;
                file.records.insert(
                    seq,
                    PendingReview {
                        seq,
                        review,
                        queued_at: Timestamp::now(),
                    },
                );
                (seq, true)
            })
            .await?;
        info!(seq, "Review queued for later sync");
        Ok(seq)
    }

    pub async fn put_offline_favorite(
        &self,
        restaurant_id: i64,
        is_favorite: bool,
    ) -> Result<(), StoreError> {
        self.offline_favorites
            .update(move |file| {
                let pending = PendingFavorite {
                    restaurant_id,
                    is_favorite,
                };
                let previous = file.records.insert(restaurant_id, pending);
                ((), previous != Some(pending))
            })
            .await?;
        info!(restaurant_id, is_favorite, "Favorite queued for later sync");
        Ok(())
    }

    /// Pending reviews in the order they were queued.
    pub async fn get_offline_reviews(&self) -> Result<Vec<PendingReview>, StoreError> {
        self.offline_reviews
            .read(|file| file.records.values().cloned().collect())
            .await
    }

    pub async fn get_offline_favorites(&self) -> Result<Vec<PendingFavorite>, StoreError> {
        self.offline_favorites
            .read(|file| file.records.values().copied().collect())
            .await
    }

    /// Remove one pending review. Returns whether it was still queued.
    pub async fn remove_offline_review(&self, seq: u64) -> Result<bool, StoreError> {
        self.offline_reviews
            .update(move |file| {
                let removed = file.records.remove(&seq).is_some();
                (removed, removed)
            })
            .await
    }

    /// Remove a pending favorite if it still holds `is_favorite`.
    ///
    /// A toggle queued while the old value was being replayed is left alone.
    pub async fn remove_offline_favorite(
        &self,
        restaurant_id: i64,
        is_favorite: bool,
    ) -> Result<bool, StoreError> {
        self.offline_favorites
            .update(move |file| match file.records.get(&restaurant_id) {
                Some(pending) if pending.is_favorite == is_favorite => {
                    file.records.remove(&restaurant_id);
                    (true, true)
                }
                _ => (false, false),
            })
            .await
    }

    pub async fn clear_offline_reviews(&self) -> Result<(), StoreError> {
        self.offline_reviews.update(clear_records).await
    }

    pub async fn clear_offline_favorites(&self) -> Result<(), StoreError> {
        self.offline_favorites.update(clear_records).await
    }

    // ===== Status =====

    /// How long ago each collection was last written.
    pub async fn collection_ages(&self) -> Result<CollectionAges, StoreError> {
        let now = Utc::now();
        let age = move |saved_at: Option<DateTime<Utc>>| {
            saved_at
                .map(|at| age_display(now, at))
                .unwrap_or_else(|| "never".to_string())
        };

        Ok(CollectionAges {
            restaurants: self.restaurants.read(|f| age(f.saved_at)).await?,
            reviews: self.reviews.read(|f| age(f.saved_at)).await?,
            offline_reviews: self.offline_reviews.read(|f| age(f.saved_at)).await?,
            offline_favorites: self.offline_favorites.read(|f| age(f.saved_at)).await?,
        })
    }

    pub async fn pending_counts(&self) -> Result<PendingCounts, StoreError> {
        Ok(PendingCounts {
            reviews: self.offline_reviews.read(|f| f.records.len()).await?,
            favorites: self.offline_favorites.read(|f| f.records.len()).await?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionAges {
    pub restaurants: String,
    pub reviews: String,
    pub offline_reviews: String,
    pub offline_favorites: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PendingCounts {
    pub reviews: usize,
    pub favorites: usize,
}

impl PendingCounts {
    pub fn is_empty(&self) -> bool {
        self.reviews == 0 && self.favorites == 0
    }
}

fn clear_records<K: Ord, V>(file: &mut CollectionFile<K, V>) -> ((), bool) {
    let changed = !file.records.is_empty();
    file.records.clear();
    ((), changed)
}

/// Human-readable age, rounded to the nearest unit.
fn age_display(now: DateTime<Utc>, saved_at: DateTime<Utc>) -> String {
    let minutes = (now - saved_at).num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}
