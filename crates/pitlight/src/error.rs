//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use pitlight_core::{ApiError, CoreError};

/// Exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Authentication ───────────────────────────────────────────────

    #[error("API token was rejected")]
    #[diagnostic(
        code(pitlight::auth_failed),
        help(
            "The stored token is no longer valid and has been cleared.\n\
             Generate a new token and run: pitlight connect"
        )
    )]
    AuthFailed,

    #[error("No API token stored for profile '{profile}'")]
    #[diagnostic(
        code(pitlight::no_credentials),
        help(
            "Run: pitlight connect\n\
             Or set the PITLIGHT_API_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Connection ───────────────────────────────────────────────────

    #[error("Not connected to the lighting API")]
    #[diagnostic(
        code(pitlight::not_connected),
        help("Run: pitlight connect")
    )]
    NotConnected,

    #[error("Could not reach the lighting API: {message}")]
    #[diagnostic(
        code(pitlight::connection_failed),
        help("Check network connectivity and the API URL (--api-url or the profile).")
    )]
    ConnectionFailed { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(pitlight::timeout),
        help("Increase the timeout with --timeout or check API responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Selection ────────────────────────────────────────────────────

    #[error("No lights selected")]
    #[diagnostic(
        code(pitlight::no_selection),
        help(
            "Select the lights to drive first:\n\
             pitlight lights\n\
             pitlight select <id>"
        )
    )]
    NoSelection,

    #[error("Light '{id}' not found")]
    #[diagnostic(
        code(pitlight::light_not_found),
        help("Run: pitlight lights to see the available light ids")
    )]
    LightNotFound { id: String },

    // ── Flag dispatch ────────────────────────────────────────────────

    #[error("Flag sequence failed after {completed} step(s): {message}")]
    #[diagnostic(
        code(pitlight::sequence_failed),
        help(
            "The lights may be in an intermediate state.\n\
             Re-apply the flag once the API is reachable again."
        )
    )]
    SequenceFailed { completed: usize, message: String },

    #[error("API error: {message}")]
    #[diagnostic(code(pitlight::api_error))]
    ApiError { message: String },

    // ── Configuration / storage ──────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(pitlight::config))]
    Config(#[from] pitlight_config::ConfigError),

    #[error("Credential storage failed: {0}")]
    #[diagnostic(
        code(pitlight::store),
        help("Check that the system keyring service is available.")
    )]
    Store(String),

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Fill in the active profile name where the generic `CoreError`
    /// conversion could not know it.
    #[must_use]
    pub fn with_profile(mut self, profile: &str) -> Self {
        if let Self::NoCredentials { profile: p } = &mut self {
            *p = profile.to_owned();
        }
        self
    }

    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthFailed | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotConnected | Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::LightNotFound { .. } => exit_code::NOT_FOUND,
            Self::NoSelection => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        if err.is_invalid_token() {
            return Self::AuthFailed;
        }
        match err {
            CoreError::Disconnected => Self::NotConnected,

            CoreError::NoSelection => Self::NoSelection,

            CoreError::Credential(message) => {
                if message.contains("no stored") {
                    Self::NoCredentials {
                        profile: "current".into(),
                    }
                } else {
                    Self::Store(message)
                }
            }

            CoreError::Selection(message) => Self::Store(message),

            CoreError::SequenceAborted { completed, source } => match source {
                ApiError::Timeout { timeout_secs } => Self::Timeout {
                    seconds: timeout_secs,
                },
                other => Self::SequenceFailed {
                    completed,
                    message: other.to_string(),
                },
            },

            CoreError::Api(api) => match api {
                ApiError::Timeout { timeout_secs } => Self::Timeout {
                    seconds: timeout_secs,
                },
                ApiError::Transport(e) => Self::ConnectionFailed {
                    message: e.to_string(),
                },
                other => Self::ApiError {
                    message: other.to_string(),
                },
            },
        }
    }
}
