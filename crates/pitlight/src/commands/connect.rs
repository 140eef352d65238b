//! Connect / disconnect command handlers.

use secrecy::SecretString;

use crate::cli::{ConnectArgs, GlobalOpts};
use crate::error::CliError;

use super::util;

pub async fn connect(args: ConnectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let token: SecretString = match args.token {
        Some(token) => token.into(),
        None => rpassword::prompt_password("API token: ")?.into(),
    };

    let session = util::build_session(global, false)?;
    session.connect(token).await?;

    let count = session.lights().await.len();
    session.shutdown().await;

    if !global.quiet {
        eprintln!("Connected -- {count} light(s) on the account");
    }
    Ok(())
}

pub async fn disconnect(global: &GlobalOpts) -> Result<(), CliError> {
    // No connection needed: clears the stored token and the selection.
    let session = util::build_session(global, false)?;
    session.disconnect().await;

    if !global.quiet {
        eprintln!("Disconnected -- stored token and selection cleared");
    }
    Ok(())
}
