//! Client for the Steam Web API `GetPlayerSummaries` endpoint.
//!
//! [`SteamClient`] performs single requests; [`SteamClient::fetch_player`]
//! wraps them in the fixed-delay [`RetryPolicy`].

pub mod client;
pub mod error;
pub mod response;
pub mod retry;

pub use client::SteamClient;
pub use error::SteamError;
pub use response::{PlayerSummariesResponse, PlayerSummary};
pub use retry::RetryPolicy;
