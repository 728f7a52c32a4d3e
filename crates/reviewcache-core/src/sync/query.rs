//! Derived restaurant queries layered on `SyncEngine::fetch_restaurants`.
//!
//! The filters work the same online and offline, since they only see what the
//! engine returns.

use std::collections::HashSet;

use super::SyncEngine;
use crate::error::SyncError;
use crate::models::Restaurant;

/// Filter value that disables filtering on its axis.
pub const ALL: &str = "all";

pub fn filter_by_cuisine(restaurants: Vec<Restaurant>, cuisine: &str) -> Vec<Restaurant> {
    restaurants
        .into_iter()
        .filter(|r| r.matches_cuisine(cuisine))
        .collect()
}

pub fn filter_by_neighborhood(restaurants: Vec<Restaurant>, neighborhood: &str) -> Vec<Restaurant> {
    restaurants
        .into_iter()
        .filter(|r| r.matches_neighborhood(neighborhood))
        .collect()
}

/// Filter on both axes; `"all"` on either axis keeps every value.
pub fn filter_by_cuisine_and_neighborhood(
    restaurants: Vec<Restaurant>,
    cuisine: &str,
    neighborhood: &str,
) -> Vec<Restaurant> {
    restaurants
        .into_iter()
        .filter(|r| cuisine == ALL || r.matches_cuisine(cuisine))
        .filter(|r| neighborhood == ALL || r.matches_neighborhood(neighborhood))
        .collect()
}

pub fn distinct_neighborhoods(restaurants: &[Restaurant]) -> Vec<String> {
    distinct(restaurants.iter().map(|r| r.neighborhood.as_str()))
}

pub fn distinct_cuisines(restaurants: &[Restaurant]) -> Vec<String> {
    distinct(restaurants.iter().map(|r| r.cuisine_type.as_str()))
}

/// Unique values in first-occurrence order.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

impl SyncEngine {
    pub async fn fetch_restaurants_by_cuisine(
        &self,
        cuisine: &str,
    ) -> Result<Vec<Restaurant>, SyncError> {
        Ok(filter_by_cuisine(self.fetch_restaurants().await?, cuisine))
    }

    pub async fn fetch_restaurants_by_neighborhood(
        &self,
        neighborhood: &str,
    ) -> Result<Vec<Restaurant>, SyncError> {
        Ok(filter_by_neighborhood(self.fetch_restaurants().await?, neighborhood))
    }

    pub async fn fetch_restaurants_by_cuisine_and_neighborhood(
        &self,
        cuisine: &str,
        neighborhood: &str,
    ) -> Result<Vec<Restaurant>, SyncError> {
        Ok(filter_by_cuisine_and_neighborhood(
            self.fetch_restaurants().await?,
            cuisine,
            neighborhood,
        ))
    }

    pub async fn fetch_neighborhoods(&self) -> Result<Vec<String>, SyncError> {
        Ok(distinct_neighborhoods(&self.fetch_restaurants().await?))
    }

    pub async fn fetch_cuisines(&self) -> Result<Vec<String>, SyncError> {
        Ok(distinct_cuisines(&self.fetch_restaurants().await?))
    }
}
