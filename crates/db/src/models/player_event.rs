//! Presence transition models and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use steamwatch_core::persona_state::PersonaState;
use steamwatch_core::search::{Pagination, SortOrder};
use steamwatch_core::steam_id::SteamId;
use steamwatch_core::types::{DbId, Timestamp};

/// A change in presence state relative to the previous event for the same
/// account. Immutable.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlayerEvent {
    pub id: DbId,
    #[sqlx(try_from = "i64")]
    pub steam_id: SteamId,
    pub persona_name: String,
    #[sqlx(try_from = "i32")]
    pub persona_state: PersonaState,
    pub created_at: Timestamp,
}

/// DTO for inserting an event.
#[derive(Debug, Clone)]
pub struct CreatePlayerEvent {
    pub steam_id: SteamId,
    pub persona_name: String,
    pub persona_state: PersonaState,
}

/// Filters for searching events.
#[derive(Debug, Clone, Default)]
pub struct PlayerEventSearch {
    pub steam_id: Option<SteamId>,
    pub start_created_at: Option<Timestamp>,
    pub end_created_at: Option<Timestamp>,
    pub sort_by_created_at: Option<SortOrder>,
    pub pagination: Pagination,
}
