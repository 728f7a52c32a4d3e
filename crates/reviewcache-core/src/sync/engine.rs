use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::error::SyncError;
use crate::models::{NewReview, Restaurant, Review};
use crate::store::LocalStore;

/// Result of a user write that was accepted by the sync layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    /// The server confirmed the write.
    Synced(T),
    /// The server was unreachable; the write is stored for replay.
    Queued,
}

impl<T> SubmitOutcome<T> {
    pub fn is_queued(&self) -> bool {
        matches!(self, SubmitOutcome::Queued)
    }
}

/// Network-first reads with local fallback, network-first writes with
/// durable queuing.
///
/// Each operation attempts the network once. On success the data is merged
/// into the local store and returned. On failure reads are answered from the
/// store (or `NotFound` if it has nothing) and writes are queued.
pub struct SyncEngine {
    api: ApiClient,
    store: Arc<LocalStore>,
}

impl SyncEngine {
    pub fn new(api: ApiClient, store: Arc<LocalStore>) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &Arc<LocalStore> {
        &self.store
    }

    pub async fn fetch_restaurants(&self) -> Result<Vec<Restaurant>, SyncError> {
        match self.api.fetch_all_restaurants().await {
            Ok(restaurants) => {
                let written = self.store.put_restaurants(restaurants.clone()).await?;
                debug!(count = restaurants.len(), written, "Restaurants fetched from network");
                Ok(restaurants)
            }
            Err(e) => {
                log_fallback("restaurants", &e);
                let cached = self.store.get_restaurants().await?;
                if cached.is_empty() {
                    return Err(SyncError::NotFound(
                        "No restaurants found in local store".to_string(),
                    ));
                }
                debug!(count = cached.len(), "Serving restaurants from local store");
                Ok(cached)
            }
        }
    }

    pub async fn fetch_restaurant_by_id(&self, id: i64) -> Result<Restaurant, SyncError> {
        match self.api.fetch_restaurant(id).await {
            Ok(restaurant) => {
                self.store.put_restaurants([restaurant.clone()]).await?;
                Ok(restaurant)
            }
            Err(e) => {
                log_fallback("restaurant", &e);
                self.store.get_restaurant(id).await?.ok_or_else(|| {
                    SyncError::NotFound(format!("Restaurant {} not found in local store", id))
                })
            }
        }
    }

    /// Reviews of one restaurant. Offline, answered from the cached reviews.
    pub async fn fetch_reviews_by_restaurant_id(
        &self,
        restaurant_id: i64,
    ) -> Result<Vec<Review>, SyncError> {
        match self.api.fetch_reviews(restaurant_id).await {
            Ok(reviews) => {
                let written = self.store.put_reviews(reviews.clone()).await?;
                debug!(restaurant_id, count = reviews.len(), written, "Reviews fetched from network");
                Ok(reviews)
            }
            Err(e) => {
                log_fallback("reviews", &e);
                let cached = self.store.get_reviews(restaurant_id).await?;
                if cached.is_empty() {
                    return Err(SyncError::NotFound(format!(
                        "No reviews for restaurant {} in local store",
                        restaurant_id
                    )));
                }
                Ok(cached)
            }
        }
    }

    /// Submit a review, queuing it if the server cannot be reached.
    ///
    /// A network failure is not an error for the caller: the review is
    /// durably queued and `SubmitOutcome::Queued` is returned.
    pub async fn submit_review(
        &self,
        review: NewReview,
    ) -> Result<SubmitOutcome<Review>, SyncError> {
        match self.api.submit_review(&review).await {
            Ok(confirmed) => {
                self.store.put_reviews([confirmed.clone()]).await?;
                info!(review_id = confirmed.id, "Review submitted");
                Ok(SubmitOutcome::Synced(confirmed))
            }
            Err(e) => {
                warn!(
                    restaurant_id = review.restaurant_id,
                    error = %e,
                    "Review could not be posted, adding to offline reviews"
                );
                self.store.put_offline_review(review).await?;
                Ok(SubmitOutcome::Queued)
            }
        }
    }

    /// Mark or unmark a favorite, queuing the toggle if the server cannot be
    /// reached. A confirmed restaurant record is merged into the store.
    pub async fn submit_favorite(
        &self,
        restaurant_id: i64,
        is_favorite: bool,
    ) -> Result<SubmitOutcome<Option<Restaurant>>, SyncError> {
        match self.api.submit_favorite(restaurant_id, is_favorite).await {
            Ok(confirmed) => {
                if let Some(ref restaurant) = confirmed {
                    self.store.put_restaurants([restaurant.clone()]).await?;
                }
                info!(restaurant_id, is_favorite, "Favorite submitted");
                Ok(SubmitOutcome::Synced(confirmed))
            }
            Err(e) => {
                warn!(
                    restaurant_id,
                    is_favorite,
                    error = %e,
                    "Favorite could not be posted, adding to offline favorites"
                );
                self.store.put_offline_favorite(restaurant_id, is_favorite).await?;
                Ok(SubmitOutcome::Queued)
            }
        }
    }
}

fn log_fallback(what: &str, error: &ApiError) {
    info!(what, error = %error, "Network fetch failed, trying local store");
}
