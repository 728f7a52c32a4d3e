//! HTTP client for the restaurant-review service.
//!
//! Every call makes exactly one request. Retry and fallback policy belongs to
//! the sync layer, so a failure here is always reported straight back.

use std::time::Duration;

use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::ApiError;
use crate::models::{NewReview, Restaurant, Review};

/// Default location of the development server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:1337";

/// API client for the review service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url`; `timeout` bounds each whole request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        debug!(url, "GET succeeded");
        Self::parse_json(response, what).await
    }

    // ===== Restaurants =====

    /// `GET /restaurants`
    pub async fn fetch_all_restaurants(&self) -> Result<Vec<Restaurant>, ApiError> {
        self.get(&self.url("/restaurants"), &[], "restaurants").await
    }

    /// `GET /restaurants/{id}`
    pub async fn fetch_restaurant(&self, id: i64) -> Result<Restaurant, ApiError> {
        self.get(&self.url(&format!("/restaurants/{}", id)), &[], "restaurant")
            .await
    }

    // ===== Reviews =====

    /// `GET /reviews/?restaurant_id={id}`
    pub async fn fetch_reviews(&self, restaurant_id: i64) -> Result<Vec<Review>, ApiError> {
        self.get(
            &self.url("/reviews/"),
            &[("restaurant_id", restaurant_id.to_string())],
            "reviews",
        )
        .await
    }

    /// `POST /reviews/` - returns the review as stored by the server.
    pub async fn submit_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        let response = self
            .client
            .post(self.url("/reviews/"))
            .json(review)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let confirmed: Review = Self::parse_json(response, "review").await?;
        debug!(review_id = confirmed.id, restaurant_id = confirmed.restaurant_id, "Review accepted");
        Ok(confirmed)
    }

    // ===== Favorites =====

    /// `POST /restaurants/{id}/?is_favorite={bool}`
    ///
    /// Returns the updated restaurant when the confirmation payload is one;
    /// any other successful payload yields `None`.
    pub async fn submit_favorite(
        &self,
        restaurant_id: i64,
        is_favorite: bool,
    ) -> Result<Option<Restaurant>, ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/restaurants/{}/", restaurant_id)))
            .query(&[("is_favorite", is_favorite)])
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;

        match serde_json::from_str::<Restaurant>(&text) {
            Ok(restaurant) => Ok(Some(restaurant)),
            Err(e) => {
                debug!(restaurant_id, error = %e, "Favorite confirmation is not a restaurant record");
                Ok(None)
            }
        }
    }
}
