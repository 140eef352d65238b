use thiserror::Error;

/// Top-level error type for the `pitlight-api` crate.
///
/// Classifies every failure mode of the remote lighting API into either a
/// permanent error (bad token, malformed request) or a transient one worth
/// retrying. `pitlight-core` maps these into session state transitions.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token rejected by the API (HTTP 401). Permanent -- never retried.
    #[error("Invalid API token")]
    InvalidToken,

    // ── Transient classifications ───────────────────────────────────
    /// Rate limited by the API (HTTP 429). Includes retry-after in seconds.
    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Server-side failure (HTTP 5xx).
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Request exceeded the transport timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // ── Permanent classifications ───────────────────────────────────
    /// Structured error from the API (remaining 4xx statuses).
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the cached token is invalid
    /// and the session must be torn down.
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, Self::InvalidToken)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Server { .. } | Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
