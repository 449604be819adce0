use steamwatch_steam::SteamError;

/// Why a single tick did not complete.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Failed to fetch player: {0}")]
    Fetch(#[from] SteamError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Tick cancelled by shutdown")]
    Cancelled,
}
