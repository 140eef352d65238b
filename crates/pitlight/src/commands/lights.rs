//! Light directory command handler.

use owo_colors::OwoColorize;
use tabled::Tabled;

use pitlight_core::{Light, Power, Session};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LightRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Power")]
    power: String,
    #[tabled(rename = "Connected")]
    connected: String,
    #[tabled(rename = "Selected")]
    selected: String,
}

fn to_row(light: &Light, selected: bool, color: bool) -> LightRow {
    let power = match (light.power, color) {
        (Power::On, true) => "on".green().to_string(),
        (Power::On, false) => "on".into(),
        (Power::Off, _) => "off".into(),
    };
    let connected = match (light.connected, color) {
        (true, _) => "yes".into(),
        (false, true) => "no".red().to_string(),
        (false, false) => "no".into(),
    };
    LightRow {
        id: light.id.clone(),
        label: light.label.clone(),
        power,
        connected,
        selected: if selected { "*".into() } else { String::new() },
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let parts = util::session_parts(global);
    let (lights, selection) = Session::oneshot(
        parts.config,
        parts.credentials,
        parts.selections,
        |session| async move {
            let lights = session.lights().await;
            let selection = session.selection().await;
            Ok((lights, selection))
        },
    )
    .await
    .map_err(|e| CliError::from(e).with_profile(&parts.profile_name))?;

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &lights[..],
        |l| to_row(l, selection.contains(&l.id), color),
        |l| l.id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
