use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{lenient, Timestamp, Versioned};

/// Map position of a restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Restaurant {
    #[serde(deserialize_with = "lenient::int")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub cuisine_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photograph: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latlng: Option<LatLng>,
    /// Day name to opening hours text, e.g. "Monday" -> "5:30 pm - 11:00 pm".
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub operating_hours: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_favorite: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: Timestamp,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Timestamp,
}

impl Restaurant {
    pub fn matches_cuisine(&self, cuisine: &str) -> bool {
        self.cuisine_type == cuisine
    }

    pub fn matches_neighborhood(&self, neighborhood: &str) -> bool {
        self.neighborhood == neighborhood
    }
}

impl Versioned for Restaurant {
    fn key(&self) -> i64 {
        self.id
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}
