//! Shared configuration for the pitlight CLI.
//!
//! TOML profiles, API token resolution (env + keyring), and persistence
//! of the per-profile light selection. The stores here implement the
//! persistence ports defined by `pitlight_core`.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pitlight_core::{CredentialStore, SelectionStore, SessionConfig, StoreError};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    /// Named profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Resolve the effective profile name: explicit flag, then
    /// `default_profile`, then `"default"`.
    pub fn profile_name(&self, flag: Option<&str>) -> String {
        flag.map(ToOwned::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// The named profile, or a default one if it was never written.
    pub fn profile(&self, name: &str) -> Profile {
        self.profiles.get(name).cloned().unwrap_or_default()
    }
}

/// A named venue profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Lighting API base URL override.
    pub api_url: Option<String>,

    /// Request timeout override, seconds.
    pub timeout: Option<u64>,

    /// Liveness probe interval override, seconds. Zero disables the
    /// connection monitor.
    pub monitor_interval: Option<u64>,

    /// Environment variable holding the API token (checked before the
    /// system keyring).
    pub api_token_env: Option<String>,

    /// Selected light ids.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub selection: BTreeSet<String>,
}

/// Translate a profile into a `SessionConfig`, starting from defaults.
pub fn profile_to_session_config(profile: &Profile) -> SessionConfig {
    let mut cfg = SessionConfig::default();
    if let Some(ref url) = profile.api_url {
        cfg.api_url = url.clone();
    }
    if let Some(secs) = profile.timeout {
        cfg.transport.timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = profile.monitor_interval {
        cfg.monitor_interval = Duration::from_secs(secs);
    }
    cfg
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "pitlight", "pitlight").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("pitlight");
    p
}

// ── Config loading & saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit path (tests, `--config` style overrides).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PITLIGHT_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

/// Save to an explicit path.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential store (env + keyring) ────────────────────────────────

const KEYRING_SERVICE: &str = "pitlight";

/// API token storage backed by the system keyring, with an optional
/// environment-variable override checked first on reads.
///
/// Writes always target the keyring; the env var is read-only input.
pub struct KeyringCredentialStore {
    profile: String,
    token_env: Option<String>,
}

impl KeyringCredentialStore {
    pub fn new(profile: impl Into<String>, token_env: Option<String>) -> Self {
        Self {
            profile: profile.into(),
            token_env,
        }
    }

    fn entry(&self) -> Result<keyring::Entry, StoreError> {
        keyring::Entry::new(KEYRING_SERVICE, &format!("{}/api-token", self.profile))
            .map_err(|e| StoreError(e.to_string()))
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self) -> Result<Option<SecretString>, StoreError> {
        if let Some(ref env_name) = self.token_env {
            if let Ok(val) = std::env::var(env_name) {
                return Ok(Some(SecretString::from(val)));
            }
        }
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(SecretString::from(token))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StoreError(e.to_string())),
        }
    }

    fn set(&self, token: &SecretString) -> Result<(), StoreError> {
        self.entry()?
            .set_password(token.expose_secret())
            .map_err(|e| StoreError(e.to_string()))
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StoreError(e.to_string())),
        }
    }
}

// ── Selection store (profile file) ──────────────────────────────────

/// Selection persistence in the profile's TOML section.
pub struct ProfileSelectionStore {
    path: PathBuf,
    profile: String,
}

impl ProfileSelectionStore {
    pub fn new(profile: impl Into<String>) -> Self {
        Self::with_path(config_path(), profile)
    }

    pub fn with_path(path: PathBuf, profile: impl Into<String>) -> Self {
        Self {
            path,
            profile: profile.into(),
        }
    }
}

impl SelectionStore for ProfileSelectionStore {
    fn get(&self) -> Result<BTreeSet<String>, StoreError> {
        let config = load_config_from(&self.path).map_err(|e| StoreError(e.to_string()))?;
        Ok(config.profile(&self.profile).selection)
    }

    fn set(&self, selection: &BTreeSet<String>) -> Result<(), StoreError> {
        let mut config = load_config_from(&self.path).map_err(|e| StoreError(e.to_string()))?;
        config
            .profiles
            .entry(self.profile.clone())
            .or_default()
            .selection = selection.clone();
        save_config_to(&self.path, &config).map_err(|e| StoreError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.profiles.insert(
            "spa".into(),
            Profile {
                api_url: Some("https://lights.example/v1".into()),
                timeout: Some(20),
                monitor_interval: Some(30),
                api_token_env: None,
                selection: BTreeSet::from(["d1".to_owned(), "d2".to_owned()]),
            },
        );
        save_config_to(&path, &config).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let profile = loaded.profile("spa");
        assert_eq!(profile.api_url.as_deref(), Some("https://lights.example/v1"));
        assert_eq!(profile.timeout, Some(20));
        assert_eq!(profile.selection.len(), 2);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn profile_name_resolution_order() {
        let mut config = Config::default();
        assert_eq!(config.profile_name(Some("monza")), "monza");
        assert_eq!(config.profile_name(None), "default");
        config.default_profile = Some("spa".into());
        assert_eq!(config.profile_name(None), "spa");
        config.default_profile = None;
        assert_eq!(config.profile_name(None), "default");
    }

    #[test]
    fn profile_overrides_flow_into_session_config() {
        let profile = Profile {
            api_url: Some("https://lights.example/v1".into()),
            timeout: Some(5),
            monitor_interval: Some(0),
            ..Profile::default()
        };
        let cfg = profile_to_session_config(&profile);
        assert_eq!(cfg.api_url, "https://lights.example/v1");
        assert_eq!(cfg.transport.timeout, Duration::from_secs(5));
        assert!(cfg.monitor_interval.is_zero());

        let defaults = profile_to_session_config(&Profile::default());
        assert_eq!(defaults.transport.timeout, Duration::from_secs(15));
        assert_eq!(defaults.monitor_interval, Duration::from_secs(60));
    }

    #[test]
    fn selection_store_round_trips_per_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let store = ProfileSelectionStore::with_path(path.clone(), "spa");
        assert!(store.get().unwrap().is_empty());

        let selection = BTreeSet::from(["d2".to_owned(), "d1".to_owned()]);
        store.set(&selection).unwrap();
        assert_eq!(store.get().unwrap(), selection);

        // Other profiles are untouched.
        let other = ProfileSelectionStore::with_path(path, "monza");
        assert!(other.get().unwrap().is_empty());
    }
}
