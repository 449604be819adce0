//! Handlers for player snapshots.

use axum::extract::{Query, State};
use axum::Json;
use steamwatch_db::models::player::Player;
use steamwatch_db::repositories::PlayerRepo;

use crate::error::AppResult;
use crate::query::HistoryParams;
use crate::response::PageResponse;
use crate::state::AppState;

/// GET /api/players
pub async fn list_players(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<PageResponse<Player>>> {
    let search = params.into_player_search()?;
    let page = PlayerRepo::search(&state.pool, &search).await?;
    Ok(Json(PageResponse::new("players", page)))
}
