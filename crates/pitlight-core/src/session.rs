// ── Session facade ──
//
// Full lifecycle management for a lighting API session: authentication,
// background connection monitoring, device selection, and flag effect
// dispatch. The session is the only writer of connection state and the
// cached credential; the sequencer only ever reads a selector string.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use secrecy::SecretString;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pitlight_api::{Light, LightClient};

use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::flag::{FeedFlag, FlagEffect};
use crate::monitor;
use crate::sequence;
use crate::sequencer;
use crate::store::{CredentialStore, SelectionStore};

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
///
/// `AuthRevoked` is terminal and distinct from `Disconnected` so callers
/// can prompt for re-authentication specifically rather than offering a
/// plain reconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    AuthRevoked,
}

// ── Session ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<SessionInner>`. Manages the connection
/// lifecycle, the background liveness monitor, the device selection, and
/// serialized flag effect execution.
#[derive(Clone)]
pub struct Session {
    pub(crate) inner: Arc<SessionInner>,
}

pub(crate) struct SessionInner {
    pub(crate) config: SessionConfig,
    pub(crate) credentials: Arc<dyn CredentialStore>,
    pub(crate) selections: Arc<dyn SelectionStore>,
    pub(crate) client: Mutex<Option<Arc<LightClient>>>,
    pub(crate) connection_state: watch::Sender<ConnectionState>,
    lights: Mutex<Arc<Vec<Light>>>,
    selection: Mutex<BTreeSet<String>>,
    last_error: Mutex<Option<String>>,
    last_contact: Mutex<Option<Instant>>,
    /// Whether a green has been applied this session -- drives the
    /// two-stage initial green exactly once per connection.
    green_applied: AtomicBool,
    cancel: CancellationToken,
    /// Child token for the current connection -- cancelled on disconnect,
    /// replaced on reconnect (avoids permanent cancellation).
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
    /// Single-flight guard: at most one `apply_flag` sequence in flight;
    /// later invocations queue in arrival order.
    apply_guard: Mutex<()>,
}

impl Session {
    /// Create a new Session. Does NOT connect -- call
    /// [`connect()`](Self::connect) to authenticate and start the monitor.
    ///
    /// The persisted device selection is loaded eagerly so `apply_flag`
    /// works as soon as the connection is up.
    pub fn new(
        config: SessionConfig,
        credentials: Arc<dyn CredentialStore>,
        selections: Arc<dyn SelectionStore>,
    ) -> Result<Self, CoreError> {
        let stored = selections
            .get()
            .map_err(|e| CoreError::Selection(e.to_string()))?;
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Ok(Self {
            inner: Arc::new(SessionInner {
                config,
                credentials,
                selections,
                client: Mutex::new(None),
                connection_state,
                lights: Mutex::new(Arc::new(Vec::new())),
                selection: Mutex::new(stored),
                last_error: Mutex::new(None),
                last_contact: Mutex::new(None),
                green_applied: AtomicBool::new(false),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
                apply_guard: Mutex::new(()),
            }),
        })
    }

    /// Access the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect with the given token.
    ///
    /// Performs the initial directory fetch as the auth check; on success
    /// the token is persisted and the connection monitor is spawned. A
    /// rejected token clears any stored credential and lands in
    /// [`AuthRevoked`](ConnectionState::AuthRevoked).
    pub async fn connect(&self, token: SecretString) -> Result<(), CoreError> {
        // Stop any previous connection's monitor before starting over.
        self.inner.cancel_child.lock().await.cancel();
        {
            let mut handles = self.inner.task_handles.lock().await;
            for handle in handles.drain(..) {
                let _ = handle.await;
            }
        }

        self.set_state(ConnectionState::Connecting);

        // Fresh child token for this connection (supports reconnect).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        let client = match LightClient::new(&config.api_url, &token, &config.transport) {
            Ok(client) => Arc::new(client.with_retry_policy(config.retry.clone())),
            Err(e) => {
                self.set_state(ConnectionState::Disconnected);
                return Err(e.into());
            }
        };

        match client.list_lights().await {
            Ok(lights) => {
                if let Err(e) = self.inner.credentials.set(&token) {
                    self.set_state(ConnectionState::Disconnected);
                    return Err(CoreError::Credential(e.to_string()));
                }
                let count = lights.len();
                *self.inner.client.lock().await = Some(Arc::clone(&client));
                self.store_lights(lights).await;
                self.inner.green_applied.store(false, Ordering::SeqCst);

                if !config.monitor_interval.is_zero() {
                    let handle = tokio::spawn(monitor::monitor_task(self.clone(), child));
                    self.inner.task_handles.lock().await.push(handle);
                }

                self.set_state(ConnectionState::Connected);
                info!(lights = count, "connected to lighting API");
                Ok(())
            }
            Err(e) if e.is_invalid_token() => {
                self.clear_stored_credential();
                self.record_error(&e).await;
                self.set_state(ConnectionState::AuthRevoked);
                Err(e.into())
            }
            Err(e) => {
                self.record_error(&e).await;
                self.set_state(ConnectionState::Disconnected);
                Err(e.into())
            }
        }
    }

    /// Connect using the credential from the store.
    pub async fn connect_stored(&self) -> Result<(), CoreError> {
        let token = self
            .inner
            .credentials
            .get()
            .map_err(|e| CoreError::Credential(e.to_string()))?
            .ok_or_else(|| CoreError::Credential("no stored API token".into()))?;
        self.connect(token).await
    }

    /// Disconnect explicitly.
    ///
    /// Stops the monitor, clears the stored credential and cached lights,
    /// and resets the selection. Re-connecting afterwards requires a
    /// fresh token.
    pub async fn disconnect(&self) {
        self.shutdown().await;

        self.clear_stored_credential();
        {
            let mut selection = self.inner.selection.lock().await;
            selection.clear();
            if let Err(e) = self.inner.selections.set(&selection) {
                warn!(error = %e, "failed to persist cleared selection");
            }
        }
        debug!("disconnected");
    }

    /// Tear down the connection without touching persisted state.
    ///
    /// Used by [`oneshot`](Self::oneshot) so a single CLI invocation
    /// doesn't wipe the stored token.
    pub async fn shutdown(&self) {
        // Cancel the child token (not the parent -- allows reconnect).
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        *self.inner.client.lock().await = None;
        *self.inner.lights.lock().await = Arc::new(Vec::new());
        self.inner.green_applied.store(false, Ordering::SeqCst);

        self.set_state(ConnectionState::Disconnected);
    }

    /// One-shot: connect with the stored token, run closure, tear down.
    ///
    /// Disables the connection monitor since a single request-response
    /// cycle has no liveness to track.
    pub async fn oneshot<F, Fut, T>(
        config: SessionConfig,
        credentials: Arc<dyn CredentialStore>,
        selections: Arc<dyn SelectionStore>,
        f: F,
    ) -> Result<T, CoreError>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.monitor_interval = Duration::ZERO;

        let session = Session::new(cfg, credentials, selections)?;
        session.connect_stored().await?;
        let result = f(session.clone()).await;
        session.shutdown().await;
        result
    }

    // ── Device directory & selection ─────────────────────────────

    /// Cached snapshot of the light directory.
    pub async fn lights(&self) -> Arc<Vec<Light>> {
        Arc::clone(&*self.inner.lights.lock().await)
    }

    /// Re-fetch the light directory.
    pub async fn refresh_lights(&self) -> Result<Arc<Vec<Light>>, CoreError> {
        let client = self
            .inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::Disconnected)?;

        match client.list_lights().await {
            Ok(lights) => {
                self.store_lights(lights).await;
                Ok(self.lights().await)
            }
            Err(e) => {
                self.record_error(&e).await;
                if e.is_invalid_token() {
                    self.revoke_credential().await;
                }
                Err(e.into())
            }
        }
    }

    /// Current device selection.
    pub async fn selection(&self) -> BTreeSet<String> {
        self.inner.selection.lock().await.clone()
    }

    /// Add a light id to the selection and persist it.
    ///
    /// Effective for subsequent `apply_flag` calls only.
    pub async fn select_light(&self, id: &str) -> Result<(), CoreError> {
        let mut selection = self.inner.selection.lock().await;
        selection.insert(id.to_owned());
        self.inner
            .selections
            .set(&selection)
            .map_err(|e| CoreError::Selection(e.to_string()))
    }

    /// Remove a light id from the selection and persist it.
    pub async fn deselect_light(&self, id: &str) -> Result<(), CoreError> {
        let mut selection = self.inner.selection.lock().await;
        selection.remove(id);
        self.inner
            .selections
            .set(&selection)
            .map_err(|e| CoreError::Selection(e.to_string()))
    }

    // ── Flag dispatch ────────────────────────────────────────────

    /// Apply a flag effect to the selected lights.
    ///
    /// Guard no-ops: returns [`CoreError::Disconnected`] or
    /// [`CoreError::NoSelection`] without any network activity. Otherwise
    /// runs the flag's step sequence strictly in order; concurrent
    /// invocations queue behind the single-flight guard rather than
    /// interleaving steps.
    pub async fn apply_flag(&self, flag: FlagEffect, initial: bool) -> Result<(), CoreError> {
        // Consistent snapshot of (state, selection) at invocation time.
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::Disconnected);
        }
        let selector = {
            let selection = self.inner.selection.lock().await;
            if selection.is_empty() {
                return Err(CoreError::NoSelection);
            }
            selection.iter().cloned().collect::<Vec<_>>().join(",")
        };
        let client = self
            .inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::Disconnected)?;

        let _guard = self.inner.apply_guard.lock().await;
        debug!(%flag, initial, %selector, "applying flag");

        match sequencer::run_sequence(&client, &selector, &sequence::steps(flag, initial)).await {
            Ok(()) => {
                self.mark_contact().await;
                if flag == FlagEffect::Green {
                    self.inner.green_applied.store(true, Ordering::SeqCst);
                }
                Ok(())
            }
            Err(e) => {
                self.record_core_error(&e).await;
                if e.is_invalid_token() {
                    self.revoke_credential().await;
                }
                Err(e)
            }
        }
    }

    /// Auto-mode entry point: apply a flag from the external feed
    /// vocabulary. The first green (or `CLEAR`) of a session gets the
    /// two-stage initial sequence.
    pub async fn apply_feed_flag(&self, feed: FeedFlag) -> Result<(), CoreError> {
        let flag = FlagEffect::from(feed);
        let initial =
            flag == FlagEffect::Green && !self.inner.green_applied.load(Ordering::SeqCst);
        self.apply_flag(flag, initial).await
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.inner.connection_state.borrow().clone()
    }

    /// Last error message, retained until the next successful operation.
    pub async fn last_error(&self) -> Option<String> {
        self.inner.last_error.lock().await.clone()
    }

    /// Instant of the last successful API contact.
    pub async fn last_contact(&self) -> Option<Instant> {
        *self.inner.last_contact.lock().await
    }

    // ── Internal state management ────────────────────────────────

    /// Update the cached directory and liveness bookkeeping.
    pub(crate) async fn store_lights(&self, lights: Vec<Light>) {
        *self.inner.lights.lock().await = Arc::new(lights);
        self.mark_contact().await;
    }

    /// Record a successful contact: bump liveness, clear the last error.
    pub(crate) async fn mark_contact(&self) {
        *self.inner.last_contact.lock().await = Some(Instant::now());
        *self.inner.last_error.lock().await = None;
    }

    pub(crate) async fn record_error(&self, error: &pitlight_api::Error) {
        *self.inner.last_error.lock().await = Some(error.to_string());
    }

    async fn record_core_error(&self, error: &CoreError) {
        *self.inner.last_error.lock().await = Some(error.to_string());
    }

    /// The token was rejected: stop the monitor, drop the client, clear
    /// the stored credential, and land in the terminal `AuthRevoked`
    /// state. Never silently retried.
    pub(crate) async fn revoke_credential(&self) {
        warn!("API token rejected -- revoking session");
        self.inner.cancel_child.lock().await.cancel();
        *self.inner.client.lock().await = None;
        self.clear_stored_credential();
        self.set_state(ConnectionState::AuthRevoked);
    }

    /// Reconnect budget exhausted: give up the session but keep the
    /// selection so an explicit user reconnect picks it back up.
    pub(crate) async fn force_disconnected(&self) {
        *self.inner.client.lock().await = None;
        self.clear_stored_credential();
        self.set_state(ConnectionState::Disconnected);
    }

    /// Publish a state transition. `send_replace` keeps the value current
    /// even when no receiver is subscribed (one-shot sessions never call
    /// [`connection_state`](Self::connection_state)).
    pub(crate) fn set_state(&self, state: ConnectionState) {
        self.inner.connection_state.send_replace(state);
    }

    fn clear_stored_credential(&self) {
        if let Err(e) = self.inner.credentials.clear() {
            warn!(error = %e, "failed to clear stored credential");
        }
    }
}
