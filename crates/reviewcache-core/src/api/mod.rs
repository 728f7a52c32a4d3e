//! REST API client module for the restaurant-review service.
//!
//! This module provides the `ApiClient` for fetching restaurants and reviews
//! and for submitting reviews and favorite toggles.
//!
//! The service needs no authentication. Its base URL is configurable and
//! defaults to the local development server.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::ApiError;
