//! Command handler modules and dispatch.

pub mod connect;
pub mod flag;
pub mod lights;
pub mod selection;
pub mod util;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Connect(args) => connect::connect(args, &cli.global).await,
        Command::Disconnect => connect::disconnect(&cli.global).await,
        Command::Lights => lights::handle(&cli.global).await,
        Command::Select(args) => selection::select(args, &cli.global).await,
        Command::Deselect(args) => selection::deselect(args, &cli.global).await,
        Command::Selection => selection::show(&cli.global).await,
        Command::Flag(args) => flag::apply(args, &cli.global).await,
        Command::Auto => flag::auto(&cli.global).await,
    }
}
