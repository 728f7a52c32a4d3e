use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Record timestamp in epoch milliseconds.
///
/// The server has sent both epoch millis and RFC 3339 strings for
/// `createdAt`/`updatedAt` over time, so both are accepted on input.
/// A missing or null timestamp is 0, which loses every newer-wins merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn millis(&self) -> i64 {
        self.0
    }

    /// Parse either an integer millisecond count or an RFC 3339 date.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(millis) = s.parse::<i64>() {
            return Some(Self(millis));
        }
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc).timestamp_millis()))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Null,
            Millis(i64),
            Float(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Null => Ok(Timestamp(0)),
            Raw::Millis(millis) => Ok(Timestamp(millis)),
            Raw::Float(millis) => Ok(Timestamp(millis as i64)),
            Raw::Text(s) => Timestamp::parse(&s)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", s))),
        }
    }
}
