//! Steam account identifier.
//!
//! Steam ids are 64-bit integers that exceed the 53-bit mantissa of an IEEE
//! double, so every external representation uses a decimal string. Decoding
//! accepts either a string or a JSON integer because the upstream API and
//! our own clients disagree on the shape.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// A non-negative 64-bit Steam account id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SteamId(i64);

impl SteamId {
    /// Wrap a raw id, rejecting negative values.
    pub fn new(value: i64) -> Result<Self, CoreError> {
        if value < 0 {
            return Err(CoreError::Validation(format!(
                "steam_id must be non-negative, got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// The raw value as stored in the database.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SteamId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| CoreError::Validation(format!("invalid steam_id format: {s}")))?;
        Self::new(value)
    }
}

impl TryFrom<i64> for SteamId {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for SteamId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SteamId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SteamIdVisitor)
    }
}

struct SteamIdVisitor;

impl<'de> Visitor<'de> for SteamIdVisitor {
    type Value = SteamId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative steam id as an integer or decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        SteamId::new(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let v = i64::try_from(v).map_err(|_| E::custom(format!("steam_id out of range: {v}")))?;
        SteamId::new(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
