//! Offline-first data layer for a restaurant-review application.
//!
//! Restaurants and reviews are fetched from the review service and cached in
//! a local store; when the service is unreachable, reads are answered from
//! the cache and writes (reviews, favorite toggles) are queued for replay.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod sync;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use error::SyncError;
pub use models::{
    LatLng, NewReview, PendingFavorite, PendingRecord, PendingReview, Restaurant, Review,
    Timestamp,
};
pub use store::{LocalStore, StoreError};
pub use sync::{FavoriteReplayMode, ReplayReport, ReplayWorker, SubmitOutcome, SyncEngine};

/// A sync engine and replay worker sharing one API client and local store.
pub struct ReviewCache {
    pub engine: Arc<SyncEngine>,
    pub replay: Arc<ReplayWorker>,
}

impl ReviewCache {
    /// Wire up the components described by `config`.
    pub async fn open(config: &Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let store = Arc::new(
            LocalStore::open(&data_dir)
                .await
                .with_context(|| format!("Failed to open local store at {}", data_dir.display()))?,
        );
        let api = ApiClient::new(config.base_url.clone(), config.request_timeout())
            .context("Failed to create API client")?;
        debug!(base_url = api.base_url(), ?data_dir, "Review cache ready");

        Ok(Self {
            engine: Arc::new(SyncEngine::new(api.clone(), store.clone())),
            replay: Arc::new(ReplayWorker::new(api, store, config.favorite_replay)),
        })
    }

    pub fn store(&self) -> &Arc<LocalStore> {
        self.engine.store()
    }
}
