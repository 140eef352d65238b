//! Flag dispatch handlers: one-shot `flag` and the feed-driven `auto` loop.

use std::str::FromStr;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use pitlight_core::{ConnectionState, FeedFlag, Session};

use crate::cli::{FlagArgs, GlobalOpts};
use crate::error::CliError;

use super::util;

/// Apply a single flag to the selected lights and exit.
pub async fn apply(args: FlagArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let parts = util::session_parts(global);
    let flag = args.flag;
    let initial = args.initial;

    Session::oneshot(
        parts.config,
        parts.credentials,
        parts.selections,
        |session| async move { session.apply_flag(flag, initial).await },
    )
    .await
    .map_err(|e| CliError::from(e).with_profile(&parts.profile_name))?;

    if !global.quiet {
        eprintln!("Applied {flag}");
    }
    Ok(())
}

/// Auto mode: read feed flag words line by line from stdin and forward
/// them to the selected lights while the connection monitor runs.
///
/// Exits on EOF, Ctrl-C, a revoked token, or an exhausted reconnect
/// budget. Unknown words are skipped with a warning so a noisy feed
/// cannot kill the session.
pub async fn auto(global: &GlobalOpts) -> Result<(), CliError> {
    let parts = util::session_parts(global);
    let profile = parts.profile_name.clone();
    let session = util::session_from_parts(parts, true)?;
    session
        .connect_stored()
        .await
        .map_err(|e| CliError::from(e).with_profile(&profile))?;

    if !global.quiet {
        eprintln!("Connected -- reading flag words from stdin (Ctrl-C to stop)");
    }

    let mut state_rx = session.connection_state();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),

            changed = state_rx.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let state = state_rx.borrow_and_update().clone();
                match state {
                    ConnectionState::AuthRevoked => break Err(CliError::AuthFailed),
                    ConnectionState::Disconnected => break Err(CliError::NotConnected),
                    ConnectionState::Reconnecting { attempt } => {
                        if !global.quiet {
                            eprintln!("Connection lost -- reconnect attempt {attempt}");
                        }
                    }
                    ConnectionState::Connected => {
                        if !global.quiet {
                            eprintln!("Connection restored");
                        }
                    }
                    ConnectionState::Connecting => {}
                }
            }

            line = lines.next_line() => {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => break Err(e.into()),
                };
                let Some(line) = line else { break Ok(()) };
                let word = line.trim();
                if word.is_empty() {
                    continue;
                }
                match FeedFlag::from_str(word) {
                    Ok(feed) => {
                        if let Err(e) = dispatch(&session, feed, global.quiet).await {
                            break Err(e);
                        }
                    }
                    Err(_) => warn!(word, "ignoring unknown flag word"),
                }
            }
        }
    };

    session.shutdown().await;
    result
}

/// Forward one feed flag; only auth rejection is fatal to the loop.
async fn dispatch(session: &Session, feed: FeedFlag, quiet: bool) -> Result<(), CliError> {
    match session.apply_feed_flag(feed).await {
        Ok(()) => {
            if !quiet {
                eprintln!("Applied {feed}");
            }
            Ok(())
        }
        Err(e) if e.is_invalid_token() => Err(e.into()),
        Err(e @ pitlight_core::CoreError::NoSelection) => Err(e.into()),
        Err(e) => {
            warn!(error = %e, flag = %feed, "flag not applied");
            Ok(())
        }
    }
}
