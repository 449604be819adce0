//! Player snapshot models and DTOs.
//!
//! Only a fixed subset of the upstream profile is retained.

use serde::Serialize;
use sqlx::FromRow;
use steamwatch_core::persona_state::PersonaState;
use steamwatch_core::search::{Pagination, SortOrder};
use steamwatch_core::steam_id::SteamId;
use steamwatch_core::types::{DbId, Timestamp};

/// A snapshot of a Steam account taken at one poll. Immutable.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Player {
    pub id: DbId,
    #[sqlx(try_from = "i64")]
    pub steam_id: SteamId,
    pub persona_name: String,
    #[sqlx(try_from = "i32")]
    pub persona_state: PersonaState,
    pub profile_state: i32,
    pub avatar_hash: String,
    pub last_logoff: i64,
    pub game_id: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a snapshot. Id and timestamp are assigned by the caller.
#[derive(Debug, Clone)]
pub struct CreatePlayer {
    pub steam_id: SteamId,
    pub persona_name: String,
    pub persona_state: PersonaState,
    pub profile_state: i32,
    pub avatar_hash: String,
    pub last_logoff: i64,
    pub game_id: String,
}

/// Filters for searching snapshots.
#[derive(Debug, Clone, Default)]
pub struct PlayerSearch {
    pub steam_id: Option<SteamId>,
    pub start_created_at: Option<Timestamp>,
    pub end_created_at: Option<Timestamp>,
    pub sort_by_created_at: Option<SortOrder>,
    pub pagination: Pagination,
}
