//! Tolerant field deserializers.
//!
//! Records posted through HTML forms come back from the server with numbers
//! and booleans encoded as strings (`"restaurant_id": "3"`,
//! `"is_favorite": "true"`), so these accept both shapes.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

pub(crate) fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(n) => Ok(n),
        // Whole floats only; truncating 1.7 to 1 would merge distinct records
        NumberOrString::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        NumberOrString::Float(f) => Err(de::Error::custom(format!(
            "expected an integer, got {}",
            f
        ))),
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected an integer, got {:?}", s))),
    }
}

pub(crate) fn rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let n = int(deserializer)?;
    u8::try_from(n).map_err(|_| de::Error::custom(format!("rating out of range: {}", n)))
}

pub(crate) fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Null,
        Bool(bool),
        Text(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Null => Ok(false),
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Text(s) => match s.trim() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(de::Error::custom(format!("expected a boolean, got {:?}", other))),
        },
    }
}
