// Background connection monitor.
//
// Probes the API on a fixed interval by re-fetching the light directory.
// On a failed probe it runs the bounded reconnect procedure; on an auth
// rejection or an exhausted reconnect budget the task exits, leaving the
// session in a terminal state.

use std::sync::Arc;

use pitlight_api::LightClient;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::session::{ConnectionState, Session};

enum ReconnectOutcome {
    Restored,
    AuthRevoked,
    GaveUp,
    Cancelled,
}

pub(crate) async fn monitor_task(session: Session, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(session.inner.config.monitor_interval);
    // The first tick fires immediately; consume it so the first probe
    // lands one full interval after connect.
    interval.tick().await;
    debug!("connection monitor started");

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let Some(client) = session.inner.client.lock().await.clone() else {
                    break;
                };
                match client.list_lights().await {
                    Ok(lights) => {
                        session.store_lights(lights).await;
                    }
                    Err(e) if e.is_invalid_token() => {
                        session.revoke_credential().await;
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "liveness probe failed -- attempting to reconnect");
                        session.record_error(&e).await;
                        match reconnect(&session, &client, &cancel).await {
                            ReconnectOutcome::Restored => interval.reset(),
                            ReconnectOutcome::AuthRevoked
                            | ReconnectOutcome::GaveUp
                            | ReconnectOutcome::Cancelled => break,
                        }
                    }
                }
            }
        }
    }
    debug!("connection monitor stopped");
}

/// Bounded reconnect: probe, then back off, up to the configured attempt
/// budget. The first attempt fires immediately.
async fn reconnect(
    session: &Session,
    client: &Arc<LightClient>,
    cancel: &CancellationToken,
) -> ReconnectOutcome {
    let cfg = &session.inner.config.reconnect;

    for attempt in 1..=cfg.max_attempts {
        session.set_state(ConnectionState::Reconnecting { attempt });

        match client.list_lights().await {
            Ok(lights) => {
                info!(attempt, "connection restored");
                session.store_lights(lights).await;
                session.set_state(ConnectionState::Connected);
                return ReconnectOutcome::Restored;
            }
            Err(e) if e.is_invalid_token() => {
                session.revoke_credential().await;
                return ReconnectOutcome::AuthRevoked;
            }
            Err(e) => {
                debug!(attempt, error = %e, "reconnect attempt failed");
                session.record_error(&e).await;
                if attempt == cfg.max_attempts {
                    break;
                }
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return ReconnectOutcome::Cancelled,
                    () = tokio::time::sleep(cfg.delay(attempt)) => {}
                }
            }
        }
    }

    warn!(
        attempts = cfg.max_attempts,
        "reconnect budget exhausted -- giving up the session"
    );
    session.force_disconnected().await;
    ReconnectOutcome::GaveUp
}
