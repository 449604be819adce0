//! Where player summaries come from.

use std::future::Future;

use steamwatch_core::steam_id::SteamId;
use steamwatch_steam::{PlayerSummary, SteamClient, SteamError};

/// Supplies the current profile of one account.
///
/// Implementations handle their own retries; the tracker calls this once
/// per tick.
pub trait PlayerSource: Send + Sync {
    fn fetch_player(
        &self,
        steam_id: SteamId,
    ) -> impl Future<Output = Result<Option<PlayerSummary>, SteamError>> + Send;
}

impl PlayerSource for SteamClient {
    async fn fetch_player(&self, steam_id: SteamId) -> Result<Option<PlayerSummary>, SteamError> {
        SteamClient::fetch_player(self, steam_id).await
    }
}
