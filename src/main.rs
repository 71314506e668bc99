//! dwr - Direct Web Remoting client CLI
//!
//! Negotiates a DWR session and issues plaincall requests from the command line.

mod cli;
mod cmd_call;
mod logging;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::cmd_call::{handle_call, handle_check_config, handle_session, load_config};
use crate::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = load_config(&cli.config, cli.url.as_deref())?;

    match cli.command {
        Commands::Call {
            page,
            script,
            method,
            params,
            args,
        } => handle_call(&config, &page, &script, &method, params, &args).await,
        Commands::Session => handle_session(&config).await,
        Commands::CheckConfig => handle_check_config(&config),
    }
}
