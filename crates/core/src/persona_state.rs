//! Steam presence ("persona") state.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Presence state of a Steam account.
///
/// `Unknown` is the internal default for a subject with no recorded event.
/// It is never accepted from the upstream API or from stored rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PersonaState {
    #[default]
    Unknown,
    Offline,
    Online,
    Busy,
    Away,
    Snooze,
    LookingToTrade,
    LookingToPlay,
}

/// Every state that can be observed upstream, in code order.
const OBSERVABLE: [PersonaState; 7] = [
    PersonaState::Offline,
    PersonaState::Online,
    PersonaState::Busy,
    PersonaState::Away,
    PersonaState::Snooze,
    PersonaState::LookingToTrade,
    PersonaState::LookingToPlay,
];

impl PersonaState {
    /// Numeric code used by the Steam API and the `persona_state` columns.
    pub fn code(self) -> i32 {
        match self {
            Self::Unknown => -1,
            Self::Offline => 0,
            Self::Online => 1,
            Self::Busy => 2,
            Self::Away => 3,
            Self::Snooze => 4,
            Self::LookingToTrade => 5,
            Self::LookingToPlay => 6,
        }
    }

    /// Canonical display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Offline => "Offline",
            Self::Online => "Online",
            Self::Busy => "Busy",
            Self::Away => "Away",
            Self::Snooze => "Snooze",
            Self::LookingToTrade => "Looking to Trade",
            Self::LookingToPlay => "Looking to Play",
        }
    }

    /// Decode an observable state from its numeric code (0-6).
    pub fn from_code(code: i64) -> Result<Self, CoreError> {
        usize::try_from(code)
            .ok()
            .and_then(|i| OBSERVABLE.get(i).copied())
            .ok_or_else(|| CoreError::Validation(format!("invalid persona state value: {code}")))
    }

    /// Decode an observable state from its canonical name.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        OBSERVABLE
            .iter()
            .copied()
            .find(|s| s.name() == name)
            .ok_or_else(|| CoreError::Validation(format!("unknown persona state: {name}")))
    }
}

impl fmt::Display for PersonaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for PersonaState {
    type Error = CoreError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(i64::from(code))
    }
}

impl Serialize for PersonaState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for PersonaState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PersonaStateVisitor)
    }
}

/// Two-branch decode: an integer code first, then a canonical name.
struct PersonaStateVisitor;

impl<'de> Visitor<'de> for PersonaStateVisitor {
    type Value = PersonaState;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a persona state code (0-6) or name")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        PersonaState::from_code(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let v = i64::try_from(v).map_err(|_| E::custom(format!("invalid persona state value: {v}")))?;
        PersonaState::from_code(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        PersonaState::from_name(v).map_err(E::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_names() {
        for code in 0..=6 {
            let state = PersonaState::from_code(code).unwrap();
            let by_name = PersonaState::from_name(state.name()).unwrap();
            assert_eq!(i64::from(by_name.code()), code);
        }
    }

    #[test]
    fn serializes_as_display_name() {
        let json = serde_json::to_string(&PersonaState::LookingToTrade).unwrap();
        assert_eq!(json, "\"Looking to Trade\"");
    }

    #[test]
    fn deserializes_integer_and_string() {
        let a: PersonaState = serde_json::from_str("3").unwrap();
        let b: PersonaState = serde_json::from_str("\"Away\"").unwrap();
        assert_eq!(a, PersonaState::Away);
        assert_eq!(b, PersonaState::Away);
    }

    #[test]
    fn rejects_out_of_range_codes() {
        assert!(serde_json::from_str::<PersonaState>("7").is_err());
        assert!(serde_json::from_str::<PersonaState>("-1").is_err());
        assert!(PersonaState::try_from(99).is_err());
    }

    #[test]
    fn rejects_unknown_sentinel_and_unrecognized_names() {
        assert!(serde_json::from_str::<PersonaState>("\"Unknown\"").is_err());
        assert!(serde_json::from_str::<PersonaState>("\"online\"").is_err());
        assert!(serde_json::from_str::<PersonaState>("1.5").is_err());
    }

    #[test]
    fn default_is_unknown() {
        assert_eq!(PersonaState::default(), PersonaState::Unknown);
        assert_eq!(PersonaState::Unknown.code(), -1);
    }
}
