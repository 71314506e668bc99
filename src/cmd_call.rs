//! Subcommand handlers.

use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use dwr_client::{DwrClient, Params};
use dwr_config::{ClientConfig, Config, ConfigError, ConfigLoader, ConfigValidator};

/// Load the config file, or fall back to defaults when only `--url` is given.
pub(crate) fn load_config(path: &Path, url: Option<&str>) -> Result<Config, ConfigError> {
    let expanded = ConfigLoader::expand_path(&path.to_string_lossy());
    let mut config = match ConfigLoader::load(Path::new(&expanded)) {
        Ok(config) => config,
        Err(ConfigError::NotFound(_)) if url.is_some() => Config::default(),
        Err(e) => return Err(e),
    };
    if let Some(url) = url {
        config.client.base_url = url.to_string();
    }
    Ok(config)
}

async fn connect(config: &ClientConfig) -> Result<DwrClient, Box<dyn std::error::Error>> {
    info!("Negotiating DWR session with {}", config.base_url);
    let client = DwrClient::from_config(config).await?;
    info!("Session established: {}", client.session_id());
    Ok(client)
}

/// Handle `dwr call`: print the status line to stderr and the raw body to stdout.
pub(crate) async fn handle_call(
    config: &Config,
    page: &str,
    script: &str,
    method: &str,
    params: Vec<(String, String)>,
    args: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect(&config.client).await?;

    let extra: Params = params.into_iter().collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    if !args.is_empty() {
        warn!("Positional arguments are not encoded; pass them as -p c0-paramN=...");
    }

    let response = client
        .request(page, script, method, &args, Some(&extra))
        .await?;
    eprintln!("{:?} {}", response.version(), response.status());
    let body = response.bytes().await?;
    write_body(&mut std::io::stdout().lock(), &body)?;
    Ok(())
}

/// Write the reply body exactly as received.
fn write_body(out: &mut impl Write, body: &[u8]) -> std::io::Result<()> {
    out.write_all(body)?;
    out.flush()
}

/// Handle `dwr session`.
pub(crate) async fn handle_session(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = connect(&config.client).await?;
    println!("{}", client.session_id());
    Ok(())
}

/// Handle `dwr check-config`.
pub(crate) fn handle_check_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config);
    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }
    if !result.is_valid() {
        return Err(format!("{} configuration error(s)", result.errors.len()).into());
    }
    println!("Configuration OK");
    Ok(())
}
