//! Per-account poll: fetch, snapshot, and state-change detection.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use steamwatch_core::snowflake::Snowflake;
use steamwatch_core::steam_id::SteamId;
use steamwatch_core::types::DbId;
use steamwatch_db::models::player::CreatePlayer;
use steamwatch_db::models::player_event::CreatePlayerEvent;
use steamwatch_db::repositories::{PlayerEventRepo, PlayerRepo};
use steamwatch_db::DbPool;
use steamwatch_steam::PlayerSummary;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::TrackerError;
use crate::source::PlayerSource;

/// Result of a tick that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Steam returned no player for the account. Nothing was written.
    NoPlayer,
    /// A snapshot was stored; the presence state matched the last event.
    Unchanged { player_id: DbId },
    /// A snapshot and a new event were stored.
    Transitioned { player_id: DbId, event_id: DbId },
}

/// Polls one Steam account.
///
/// Ticks may overlap. The read-latest-event / insert-event step is
/// serialized by `transition_lock` and runs in one transaction, so
/// consecutive events for the account never repeat a state.
pub struct PlayerTracker<P> {
    pool: DbPool,
    ids: Arc<Snowflake>,
    source: P,
    steam_id: SteamId,
    cancel: CancellationToken,
    transition_lock: Mutex<()>,
}

impl<P: PlayerSource> PlayerTracker<P> {
    pub fn new(
        pool: DbPool,
        ids: Arc<Snowflake>,
        source: P,
        steam_id: SteamId,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            pool,
            ids,
            source,
            steam_id,
            cancel,
            transition_lock: Mutex::new(()),
        }
    }

    /// Run one poll.
    ///
    /// A fetch failure or a missing player writes nothing. Once the
    /// snapshot is stored, a failure in the event step leaves the snapshot
    /// in place.
    pub async fn tick(&self) -> Result<TickOutcome, TrackerError> {
        let Some(summary) = self.guard(self.source.fetch_player(self.steam_id)).await? else {
            return Ok(TickOutcome::NoPlayer);
        };

        let player_id = self.store_snapshot(&summary).await?;

        let _serialized = self.transition_lock.lock().await;
        let mut tx = self.guard(self.pool.begin()).await?;

        let previous = self
            .guard(PlayerEventRepo::find_latest(&mut *tx, summary.steam_id))
            .await?
            .map(|e| e.persona_state)
            .unwrap_or_default();

        if previous == summary.persona_state {
            tracing::debug!(
                steam_id = %summary.steam_id,
                persona_state = %previous,
                "Player state unchanged",
            );
            return Ok(TickOutcome::Unchanged { player_id });
        }

        let event = CreatePlayerEvent {
            steam_id: summary.steam_id,
            persona_name: summary.persona_name.clone(),
            persona_state: summary.persona_state,
        };
        let event = self
            .guard(PlayerEventRepo::create(&mut *tx, self.ids.generate(), Utc::now(), &event))
            .await?;
        self.guard(tx.commit()).await?;

        tracing::info!(
            steam_id = %summary.steam_id,
            from = %previous,
            to = %event.persona_state,
            event_id = event.id,
            "Player state changed",
        );

        Ok(TickOutcome::Transitioned {
            player_id,
            event_id: event.id,
        })
    }

    /// Run one poll and log the outcome. Never fails.
    pub async fn run_tick(&self) {
        match self.tick().await {
            Ok(TickOutcome::NoPlayer) => {
                tracing::warn!(steam_id = %self.steam_id, "No player returned");
            }
            Ok(TickOutcome::Unchanged { .. } | TickOutcome::Transitioned { .. }) => {}
            Err(TrackerError::Cancelled) => {
                tracing::info!(steam_id = %self.steam_id, "Tick abandoned on shutdown");
            }
            Err(e @ TrackerError::Fetch(_)) => {
                tracing::error!(steam_id = %self.steam_id, error = %e, "Failed to get player summaries");
            }
            Err(e @ TrackerError::Database(_)) => {
                tracing::error!(steam_id = %self.steam_id, error = %e, "Failed to persist tick");
            }
        }
    }

    async fn store_snapshot(&self, summary: &PlayerSummary) -> Result<DbId, TrackerError> {
        let dto = CreatePlayer {
            steam_id: summary.steam_id,
            persona_name: summary.persona_name.clone(),
            persona_state: summary.persona_state,
            profile_state: summary.profile_state,
            avatar_hash: summary.avatar_hash.clone(),
            last_logoff: summary.last_logoff,
            game_id: summary.game_id.clone(),
        };
        let player = self
            .guard(PlayerRepo::create(&self.pool, self.ids.generate(), Utc::now(), &dto))
            .await?;

        tracing::debug!(
            steam_id = %player.steam_id,
            player_id = player.id,
            persona_state = %player.persona_state,
            "Stored player snapshot",
        );
        Ok(player.id)
    }

    /// Await `fut` unless shutdown starts first.
    async fn guard<T, E>(&self, fut: impl Future<Output = Result<T, E>>) -> Result<T, TrackerError>
    where
        E: Into<TrackerError>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(TrackerError::Cancelled),
            result = fut => result.map_err(Into::into),
        }
    }
}

