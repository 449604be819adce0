//! Handlers for presence transitions.

use axum::extract::{Query, State};
use axum::Json;
use steamwatch_db::models::player_event::PlayerEvent;
use steamwatch_db::repositories::PlayerEventRepo;

use crate::error::AppResult;
use crate::query::HistoryParams;
use crate::response::PageResponse;
use crate::state::AppState;

/// GET /api/player_events
pub async fn list_player_events(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<PageResponse<PlayerEvent>>> {
    let search = params.into_event_search()?;
    let page = PlayerEventRepo::search(&state.pool, &search).await?;
    Ok(Json(PageResponse::new("player_events", page)))
}
