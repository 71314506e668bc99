//! CLI definitions for the DWR client.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// DWR client CLI.
#[derive(Parser)]
#[command(name = "dwr")]
#[command(about = "Call Direct Web Remoting (DWR) endpoints")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "dwr.toml", global = true)]
    pub config: PathBuf,

    /// Base URL of the DWR application (overrides the config file)
    #[arg(short, long, global = true, env = "DWR_BASE_URL")]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Negotiate a session and make one plaincall
    Call {
        /// Page the call is made from
        #[arg(long, default_value = "")]
        page: String,

        /// Remote script name
        #[arg(short, long)]
        script: String,

        /// Remote method name
        #[arg(short, long)]
        method: String,

        /// Extra call parameter as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Positional argument (accepted, not encoded)
        #[arg(long = "arg")]
        args: Vec<String>,
    },

    /// Negotiate a session and print the script session id
    Session,

    /// Load and validate the configuration file
    CheckConfig,
}

/// Parse a `key=value` pair. The value may itself contain `=`.
pub(crate) fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value: no '=' found in '{}'", s))?;
    if key.is_empty() {
        return Err(format!("invalid key=value: empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
