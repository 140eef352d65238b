//! Selection command handlers.

use pitlight_core::Session;

use crate::cli::{GlobalOpts, SelectArgs};
use crate::error::CliError;
use crate::output;

use super::util;

enum SelectOutcome {
    Selected(std::collections::BTreeSet<String>),
    UnknownId(String),
}

/// Add lights to the selection. Ids are validated against the account's
/// light directory so typos surface immediately.
pub async fn select(args: SelectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let parts = util::session_parts(global);
    let outcome = Session::oneshot(
        parts.config,
        parts.credentials,
        parts.selections,
        |session| async move {
            let lights = session.lights().await;
            if let Some(id) = args.ids.iter().find(|id| !lights.iter().any(|l| l.id == **id)) {
                return Ok(SelectOutcome::UnknownId(id.clone()));
            }
            for id in &args.ids {
                session.select_light(id).await?;
            }
            Ok(SelectOutcome::Selected(session.selection().await))
        },
    )
    .await
    .map_err(|e| CliError::from(e).with_profile(&parts.profile_name))?;

    match outcome {
        SelectOutcome::UnknownId(id) => Err(CliError::LightNotFound { id }),
        SelectOutcome::Selected(selected) => {
            if !global.quiet {
                eprintln!("Selection: {}", join(&selected));
            }
            Ok(())
        }
    }
}

/// Remove lights from the selection. Unknown ids are ignored so stale
/// entries can always be cleaned up.
pub async fn deselect(args: SelectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = util::build_session(global, false)?;
    for id in &args.ids {
        session.deselect_light(id).await?;
    }

    if !global.quiet {
        eprintln!("Selection: {}", join(&session.selection().await));
    }
    Ok(())
}

/// Print the current selection. Works offline.
pub async fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let session = util::build_session(global, false)?;
    let selection = session.selection().await;

    let ids: Vec<String> = selection.into_iter().collect();
    let out = if matches!(global.output, crate::cli::OutputFormat::Json) {
        output::render_json(&ids)
    } else {
        ids.join("\n")
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

fn join(selection: &std::collections::BTreeSet<String>) -> String {
    if selection.is_empty() {
        "(empty)".into()
    } else {
        selection.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}
