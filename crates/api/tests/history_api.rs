//! Integration tests for `/api/players`, `/api/player_events`, and
//! `/api/audit_logs`.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, TimeZone, Utc};
use common::{body_json, get};
use serde_json::json;
use sqlx::PgPool;
use steamwatch_core::persona_state::PersonaState;
use steamwatch_core::steam_id::SteamId;
use steamwatch_core::types::Timestamp;
use steamwatch_db::models::player::CreatePlayer;
use steamwatch_db::models::player_event::CreatePlayerEvent;
use steamwatch_db::repositories::{AuditLogRepo, PlayerEventRepo, PlayerRepo};

const GABE: i64 = 76561197960287930;
const ROBIN: i64 = 76561197960435530;

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

async fn seed_snapshots(pool: &PgPool, steam_id: i64, count: i64, id_base: i64) {
    for i in 0..count {
        let dto = CreatePlayer {
            steam_id: SteamId::new(steam_id).unwrap(),
            persona_name: format!("player-{i}"),
            persona_state: PersonaState::Online,
            profile_state: 1,
            avatar_hash: String::new(),
            last_logoff: 0,
            game_id: String::new(),
        };
        PlayerRepo::create(pool, id_base + i, t0() + Duration::minutes(i), &dto)
            .await
            .unwrap();
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn players_default_page(pool: PgPool) {
    seed_snapshots(&pool, GABE, 30, 1_000).await;

    let json = body_json(get(common::build_test_app(pool), "/api/players").await).await;

    assert_eq!(json["total_count"], 30);
    assert_eq!(json["page"], 1);
    assert_eq!(json["per_page"], 25);
    assert_eq!(json["players"].as_array().unwrap().len(), 25);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn players_filter_sort_and_page(pool: PgPool) {
    seed_snapshots(&pool, GABE, 12, 1_000).await;
    seed_snapshots(&pool, ROBIN, 4, 2_000).await;

    let uri = format!("/api/players?steam_id={GABE}&sort_by%5Bcreated_at%5D=desc&page=2&limit=5");
    let response = get(common::build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["total_count"], 12);
    let players = json["players"].as_array().unwrap();
    let ids: Vec<_> = players.iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1_006, 1_005, 1_004, 1_003, 1_002]);
    assert_eq!(players[0]["steam_id"], GABE.to_string());
    assert_eq!(players[0]["persona_state"], "Online");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn players_time_window(pool: PgPool) {
    seed_snapshots(&pool, GABE, 10, 1_000).await;

    let uri = "/api/players?start_created_at=2025-06-01T00:03:00Z\
               &end_created_at=2025-06-01T00:06:00Z&sort_by%5Bcreated_at%5D=asc";
    let json = body_json(get(common::build_test_app(pool), uri).await).await;

    assert_eq!(json["total_count"], 4);
    assert_eq!(json["players"][0]["id"], 1_003);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn players_malformed_params_use_defaults(pool: PgPool) {
    seed_snapshots(&pool, GABE, 3, 1_000).await;

    let uri = "/api/players?page=abc&limit=-4&steam_id=xyz&start_created_at=soon";
    let response = get(common::build_test_app(pool), uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["page"], 1);
    assert_eq!(json["per_page"], 25);
    assert_eq!(json["total_count"], 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn players_limit_is_capped(pool: PgPool) {
    seed_snapshots(&pool, GABE, 120, 1_000).await;

    let json = body_json(get(common::build_test_app(pool), "/api/players?limit=500").await).await;

    assert_eq!(json["per_page"], 100);
    assert_eq!(json["players"].as_array().unwrap().len(), 100);
    assert_eq!(json["total_count"], 120);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn players_negative_steam_id_is_rejected(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/players?steam_id=-1").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn players_inverted_range_is_rejected(pool: PgPool) {
    let uri = "/api/players?start_created_at=2025-06-02T00:00:00Z&end_created_at=2025-06-01T00:00:00Z";
    let response = get(common::build_test_app(pool), uri).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Player events
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn player_events_are_listed(pool: PgPool) {
    let states = [PersonaState::Online, PersonaState::Away, PersonaState::LookingToPlay];
    for (i, state) in states.into_iter().enumerate() {
        let dto = CreatePlayerEvent {
            steam_id: SteamId::new(GABE).unwrap(),
            persona_name: "Gabe".into(),
            persona_state: state,
        };
        PlayerEventRepo::create(&pool, 10 + i as i64, t0() + Duration::minutes(i as i64), &dto)
            .await
            .unwrap();
    }

    let uri = format!("/api/player_events?steam_id={GABE}&sort_by%5Bcreated_at%5D=desc");
    let json = body_json(get(common::build_test_app(pool), &uri).await).await;

    assert_eq!(json["total_count"], 3);
    assert_eq!(json["player_events"][0]["persona_state"], "Looking to Play");
    assert_eq!(json["player_events"][2]["persona_state"], "Online");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn player_events_bad_sort_is_rejected(pool: PgPool) {
    let response = get(
        common::build_test_app(pool),
        "/api/player_events?sort_by%5Bcreated_at%5D=newest",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Audit logs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn audit_logs_are_flattened(pool: PgPool) {
    for id in 1..=3_i64 {
        AuditLogRepo::create(
            &pool,
            id,
            t0() + Duration::seconds(id),
            &json!({ "level": "info", "message": format!("line {id}") }),
        )
        .await
        .unwrap();
    }

    let json = body_json(
        get(common::build_test_app(pool), "/api/audit_logs?sort_by%5Bid%5D=desc&limit=2").await,
    )
    .await;

    assert_eq!(json["total_count"], 3);
    let logs = json["audit_logs"].as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["audit_id"], 3);
    assert_eq!(logs[0]["message"], "line 3");
    assert!(logs[0]["audit_created_at"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn audit_logs_invalid_sort_is_rejected(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/audit_logs?sort_by%5Bid%5D=sideways").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}
