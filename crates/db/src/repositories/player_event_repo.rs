//! Repository for the `player_events` table.

use sqlx::{PgExecutor, PgPool};
use steamwatch_core::steam_id::SteamId;
use steamwatch_core::types::{DbId, Timestamp};

use crate::models::player_event::{CreatePlayerEvent, PlayerEvent, PlayerEventSearch};
use crate::search::{self, Compare, Predicates, SearchPage, SearchRequest, Searchable, Sort};

/// Column list for `player_events` queries.
const COLUMNS: &str = "id, steam_id, persona_name, persona_state, created_at";

impl Searchable for PlayerEvent {
    const TABLE: &'static str = "player_events";
    const ALIAS: &'static str = "pe";
    const COLUMNS: &'static str = COLUMNS;
}

/// Append-only access to presence transitions.
pub struct PlayerEventRepo;

impl PlayerEventRepo {
    /// Insert an event with a caller-assigned id and timestamp.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        created_at: Timestamp,
        dto: &CreatePlayerEvent,
    ) -> Result<PlayerEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO player_events \
                (id, steam_id, persona_name, persona_state, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlayerEvent>(&query)
            .bind(id)
            .bind(dto.steam_id.get())
            .bind(&dto.persona_name)
            .bind(dto.persona_state.code())
            .bind(created_at)
            .fetch_one(executor)
            .await
    }

    /// Most recent event for an account, if any.
    ///
    /// Ties on `created_at` are broken by id, which is time-ordered.
    pub async fn find_latest<'e, E: PgExecutor<'e>>(
        executor: E,
        steam_id: SteamId,
    ) -> Result<Option<PlayerEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM player_events WHERE steam_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, PlayerEvent>(&query)
            .bind(steam_id.get())
            .fetch_optional(executor)
            .await
    }

    /// All events for an account in creation order.
    pub async fn list_for(
        pool: &PgPool,
        steam_id: SteamId,
    ) -> Result<Vec<PlayerEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM player_events WHERE steam_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, PlayerEvent>(&query)
            .bind(steam_id.get())
            .fetch_all(pool)
            .await
    }

    /// Search events by account and creation time.
    pub async fn search(
        pool: &PgPool,
        params: &PlayerEventSearch,
    ) -> Result<SearchPage<PlayerEvent>, sqlx::Error> {
        let mut predicates = Predicates::new();
        predicates
            .push_opt("steam_id", Compare::Eq, params.steam_id.map(SteamId::get))
            .push_opt("created_at", Compare::Gte, params.start_created_at)
            .push_opt("created_at", Compare::Lte, params.end_created_at);

        let req = SearchRequest {
            predicates,
            sort: params.sort_by_created_at.map(|order| Sort {
                column: "created_at",
                order,
            }),
            pagination: params.pagination,
        };

        search::search::<PlayerEvent>(pool, &req).await
    }
}
