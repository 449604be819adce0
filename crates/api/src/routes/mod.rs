pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /players          snapshot history (GET)
/// /player_events    presence transitions (GET)
/// /audit_logs       captured log lines (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/players", get(handlers::players::list_players))
        .route("/player_events", get(handlers::player_events::list_player_events))
        .route("/audit_logs", get(handlers::audit_logs::list_audit_logs))
}
