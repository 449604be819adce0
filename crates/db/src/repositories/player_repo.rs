//! Repository for the `players` snapshot table.

use sqlx::{PgExecutor, PgPool};
use steamwatch_core::steam_id::SteamId;
use steamwatch_core::types::{DbId, Timestamp};

use crate::models::player::{CreatePlayer, Player, PlayerSearch};
use crate::search::{self, Compare, Predicates, SearchPage, SearchRequest, Searchable, Sort};

/// Column list for `players` queries.
const COLUMNS: &str = "\
    id, steam_id, persona_name, persona_state, profile_state, \
    avatar_hash, last_logoff, game_id, created_at";

impl Searchable for Player {
    const TABLE: &'static str = "players";
    const ALIAS: &'static str = "p";
    const COLUMNS: &'static str = COLUMNS;
}

/// Append-only access to player snapshots.
pub struct PlayerRepo;

impl PlayerRepo {
    /// Insert a snapshot with a caller-assigned id and timestamp.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        created_at: Timestamp,
        dto: &CreatePlayer,
    ) -> Result<Player, sqlx::Error> {
        let query = format!(
            "INSERT INTO players \
                (id, steam_id, persona_name, persona_state, profile_state, \
                 avatar_hash, last_logoff, game_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Player>(&query)
            .bind(id)
            .bind(dto.steam_id.get())
            .bind(&dto.persona_name)
            .bind(dto.persona_state.code())
            .bind(dto.profile_state)
            .bind(&dto.avatar_hash)
            .bind(dto.last_logoff)
            .bind(&dto.game_id)
            .bind(created_at)
            .fetch_one(executor)
            .await
    }

    /// Count snapshots recorded for one account.
    pub async fn count_for(pool: &PgPool, steam_id: SteamId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM players WHERE steam_id = $1")
            .bind(steam_id.get())
            .fetch_one(pool)
            .await
    }

    /// Search snapshots by account and creation time.
    pub async fn search(
        pool: &PgPool,
        params: &PlayerSearch,
    ) -> Result<SearchPage<Player>, sqlx::Error> {
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

        search::search::<Player>(pool, &req).await
    }
}
