use serde::{Deserialize, Serialize};

use super::{lenient, Timestamp, Versioned};

/// A review confirmed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Review {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(deserialize_with = "lenient::int")]
    pub restaurant_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(deserialize_with = "lenient::rating")]
    pub rating: u8,
    #[serde(default, alias = "text")]
    pub comments: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Timestamp,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Timestamp,
}

impl Versioned for Review {
    fn key(&self) -> i64 {
        self.id
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

/// A review as submitted by the user, before the server assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewReview {
    pub restaurant_id: i64,
    pub name: String,
    pub rating: u8,
    pub comments: String,
}

impl NewReview {
    pub fn new(
        restaurant_id: i64,
        name: impl Into<String>,
        rating: u8,
        comments: impl Into<String>,
    ) -> Self {
        Self {
            restaurant_id,
            name: name.into(),
            rating,
            comments: comments.into(),
        }
    }
}
