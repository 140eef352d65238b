//! Shared command helpers: profile resolution and session construction.

use std::sync::Arc;

use pitlight_config::{KeyringCredentialStore, ProfileSelectionStore};
use pitlight_core::{CredentialStore, SelectionStore, Session, SessionConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything needed to build a session for the active profile.
pub struct SessionParts {
    pub profile_name: String,
    pub config: SessionConfig,
    pub credentials: Arc<dyn CredentialStore>,
    pub selections: Arc<dyn SelectionStore>,
}

/// Resolve the active profile and CLI overrides into session parts.
pub fn session_parts(global: &GlobalOpts) -> SessionParts {
    let file_config = pitlight_config::load_config_or_default();
    let profile_name = file_config.profile_name(global.profile.as_deref());
    let mut profile = file_config.profile(&profile_name);

    if let Some(ref url) = global.api_url {
        profile.api_url = Some(url.clone());
    }
    if let Some(secs) = global.timeout {
        profile.timeout = Some(secs);
    }

    let config = pitlight_config::profile_to_session_config(&profile);
    let credentials = Arc::new(KeyringCredentialStore::new(
        &profile_name,
        profile.api_token_env.clone(),
    ));
    let selections = Arc::new(ProfileSelectionStore::new(&profile_name));

    SessionParts {
        profile_name,
        config,
        credentials,
        selections,
    }
}

/// Build an unconnected session for the active profile.
///
/// `monitored: false` disables the liveness monitor (one-shot commands).
pub fn build_session(global: &GlobalOpts, monitored: bool) -> Result<Session, CliError> {
    session_from_parts(session_parts(global), monitored)
}

/// Build an unconnected session from already-resolved parts.
pub fn session_from_parts(mut parts: SessionParts, monitored: bool) -> Result<Session, CliError> {
    if !monitored {
        parts.config.monitor_interval = std::time::Duration::ZERO;
    }
    Session::new(parts.config, parts.credentials, parts.selections).map_err(Into::into)
}
