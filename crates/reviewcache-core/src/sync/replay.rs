use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::store::{LocalStore, StoreError};

/// Maximum favorite toggles replayed at once.
const MAX_CONCURRENT_FAVORITES: usize = 4;

/// What to drop from the favorites queue after a successful replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteReplayMode {
    /// Remove only the entry that was accepted.
    #[default]
    PerEntry,
    /// Clear the whole queue once any entry is accepted.
    ClearAll,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Another replay was already running; nothing was attempted.
    pub skipped: bool,
    pub reviews_synced: usize,
    pub reviews_failed: usize,
    pub favorites_synced: usize,
    pub favorites_failed: usize,
}

impl ReplayReport {
    pub fn attempted(&self) -> usize {
        self.reviews_synced + self.reviews_failed + self.favorites_synced + self.favorites_failed
    }

    pub fn all_synced(&self) -> bool {
        !self.skipped && self.reviews_failed == 0 && self.favorites_failed == 0
    }
}

/// Drains the offline queues against the server.
pub struct ReplayWorker {
    api: ApiClient,
    store: Arc<LocalStore>,
    favorite_mode: FavoriteReplayMode,
    running: Mutex<()>,
}

impl ReplayWorker {
    pub fn new(api: ApiClient, store: Arc<LocalStore>, favorite_mode: FavoriteReplayMode) -> Self {
        Self {
            api,
            store,
            favorite_mode,
            running: Mutex::new(()),
        }
    }

    /// Replay everything queued once. Entries that fail stay queued.
    pub async fn run_once(&self) -> Result<ReplayReport, StoreError> {
        let Ok(_running) = self.running.try_lock() else {
            debug!("Replay already in progress, skipping");
            return Ok(ReplayReport {
                skipped: true,
                ..Default::default()
            });
        };

        let mut report = ReplayReport::default();
        self.replay_reviews(&mut report).await?;
        self.replay_favorites(&mut report).await?;

        if report.attempted() > 0 {
            info!(
                reviews_synced = report.reviews_synced,
                reviews_failed = report.reviews_failed,
                favorites_synced = report.favorites_synced,
                favorites_failed = report.favorites_failed,
                "Offline replay finished"
            );
        }
        Ok(report)
    }

    /// Replay reviews oldest first so the server sees them in submission order.
    async fn replay_reviews(&self, report: &mut ReplayReport) -> Result<(), StoreError> {
        let pending = self.store.get_offline_reviews().await?;
        let total = pending.len();

        for (index, entry) in pending.into_iter().enumerate() {
            match self.api.submit_review(&entry.review).await {
                Ok(confirmed) => {
                    if let Err(e) = self.store.remove_offline_review(entry.seq).await {
                        // Still queued, so the next pass posts it again
                        error!(
                            seq = entry.seq,
                            review_id = confirmed.id,
                            restaurant_id = confirmed.restaurant_id,
                            error = %e,
                            "Review was posted but could not be removed from offline reviews"
                        );
                        return Err(e);
                    }
                    self.store.put_reviews([confirmed]).await?;
                    report.reviews_synced += 1;
                }
                Err(e) if e.is_unreachable() => {
                    // Server is gone; the rest would only wait on timeouts
                    warn!(seq = entry.seq, error = %e, "Server unreachable, stopping review replay");
                    report.reviews_failed += total - index;
                    break;
                }
                Err(e) => {
                    warn!(seq = entry.seq, error = %e, "Offline review couldn't be synced, leaving it queued");
                    report.reviews_failed += 1;
                }
            }
        }
        Ok(())
    }

    async fn replay_favorites(&self, report: &mut ReplayReport) -> Result<(), StoreError> {
        let pending = self.store.get_offline_favorites().await?;
        if pending.is_empty() {
            return Ok(());
        }

        let api = &self.api;
        let results: Vec<_> = stream::iter(pending)
            .map(move |favorite| async move {
                let result = api
                    .submit_favorite(favorite.restaurant_id, favorite.is_favorite)
                    .await;
                (favorite, result)
            })
            .buffer_unordered(MAX_CONCURRENT_FAVORITES)
            .collect()
            .await;

        for (favorite, result) in results {
            match result {
                Ok(confirmed) => {
                    if let Some(restaurant) = confirmed {
                        self.store.put_restaurants([restaurant]).await?;
                    }
                    if self.favorite_mode == FavoriteReplayMode::PerEntry {
                        self.store
                            .remove_offline_favorite(favorite.restaurant_id, favorite.is_favorite)
                            .await?;
                    }
                    report.favorites_synced += 1;
                }
                Err(e) => {
                    warn!(
                        restaurant_id = favorite.restaurant_id,
                        error = %e,
                        "Offline favorite couldn't be synced, leaving it queued"
                    );
                    report.favorites_failed += 1;
                }
            }
        }

        if self.favorite_mode == FavoriteReplayMode::ClearAll && report.favorites_synced > 0 {
            self.store.clear_offline_favorites().await?;
            debug!("Cleared offline favorites");
        }
        Ok(())
    }

    /// Run `run_once` every `every` until `shutdown` becomes true or its
    /// sender is dropped. The first pass runs immediately.
    pub fn spawn_periodic(
        self: Arc<Self>,
        every: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once().await {
                            error!(error = %e, "Offline replay failed");
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("Replay worker stopped");
        })
    }
}
