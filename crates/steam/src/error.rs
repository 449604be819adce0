/// Errors from the Steam Web API layer.
#[derive(Debug, thiserror::Error)]
pub enum SteamError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Steam returned a non-2xx status code.
    #[error("Steam API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body was not a valid `GetPlayerSummaries` payload.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Every attempt allowed by the retry policy failed.
    #[error("Failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<SteamError>,
    },
}
