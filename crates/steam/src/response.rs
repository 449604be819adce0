//! Upstream response payloads.
//!
//! Only the retained subset of each player profile is decoded; unknown
//! fields are ignored and missing optional fields take their defaults.
//! A missing `personastate` decodes as `Offline`, never `Unknown`.

use serde::Deserialize;
use steamwatch_core::persona_state::PersonaState;
use steamwatch_core::steam_id::SteamId;

/// Body of `GET /ISteamUser/GetPlayerSummaries/v2/`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSummariesResponse {
    pub response: PlayerList,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerList {
    #[serde(default)]
    pub players: Vec<PlayerSummary>,
}

/// One player profile as reported by Steam.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerSummary {
    #[serde(rename = "steamid")]
    pub steam_id: SteamId,
    #[serde(rename = "personaname", default)]
    pub persona_name: String,
    #[serde(rename = "personastate", default = "offline")]
    pub persona_state: PersonaState,
    #[serde(rename = "profilestate", default)]
    pub profile_state: i32,
    #[serde(rename = "avatarhash", default)]
    pub avatar_hash: String,
    #[serde(rename = "lastlogoff", default)]
    pub last_logoff: i64,
    #[serde(rename = "gameid", default)]
    pub game_id: String,
}

fn offline() -> PersonaState {
    PersonaState::Offline
}

impl PlayerSummariesResponse {
    /// The first player in the response, if any.
    pub fn player(self) -> Option<PlayerSummary> {
        self.response.players.into_iter().next()
    }
}
