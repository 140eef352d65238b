//! Clap derive structures for the `pitlight` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

use pitlight_core::FlagEffect;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pitlight -- race-flag control for smart lights
#[derive(Debug, Parser)]
#[command(
    name = "pitlight",
    version,
    about = "Drive smart lights from race-control flags",
    long_about = "Maps race-control flags (green, yellow, red, safety car, checkered)\n\
        to light effects over the LIFX HTTP API. Connect once with an API token,\n\
        select the lights to drive, then apply flags by hand or from a feed.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Venue profile to use
    #[arg(long, short = 'p', env = "PITLIGHT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Lighting API base URL (overrides profile)
    #[arg(long, env = "PITLIGHT_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "PITLIGHT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authenticate against the lighting API and store the token
    Connect(ConnectArgs),

    /// Drop the session, clearing the stored token and selection
    Disconnect,

    /// List the lights on the account
    #[command(alias = "ls")]
    Lights,

    /// Add lights to the controlled selection
    Select(SelectArgs),

    /// Remove lights from the controlled selection
    Deselect(SelectArgs),

    /// Show the controlled selection
    Selection,

    /// Apply a race flag to the selected lights
    Flag(FlagArgs),

    /// Drive flags from a race-control feed on stdin
    Auto,
}

#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// API token (prompted for when omitted)
    #[arg(long, env = "PITLIGHT_API_TOKEN", hide_env = true)]
    pub token: Option<String>,
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Light ids, as shown by `pitlight lights`
    #[arg(required = true, value_name = "ID")]
    pub ids: Vec<String>,
}

#[derive(Debug, Args)]
pub struct FlagArgs {
    /// One of: green, yellow, red, safety-car, checkered
    #[arg(value_name = "FLAG")]
    pub flag: FlagEffect,

    /// Use the session-opening green sequence (green only)
    #[arg(long)]
    pub initial: bool,
}
