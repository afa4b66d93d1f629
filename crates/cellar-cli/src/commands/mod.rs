//! Command dispatch and handler modules.

mod check_config;
mod serve;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve { listen } => {
            serve::exec(cli.config.as_deref(), listen.as_deref(), cli.verbose).await
        }
        Command::CheckConfig => check_config::exec(cli.config.as_deref(), cli.verbose),
    }
}
