//! Walletweb main entry point

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use walletweb_api::start_server;
use walletweb_client::ApiClient;
use walletweb_config::{Config, ConfigError, ConfigErrorSeverity};
use walletweb_core::ApiRef;

#[derive(Parser, Debug)]
#[command(name = "walletweb")]
#[command(author = "Walletweb Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight web front end for sending money through a wallet REST API", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

/// Load the configuration; a missing file falls back to the defaults
fn load_config(path: PathBuf) -> Result<(Config, Option<String>), ConfigError> {
    match Config::load(path) {
        Ok(config) => Ok((config, None)),
        Err(e) if e.severity() == ConfigErrorSeverity::Warning => {
            Ok((Config::default(), Some(format!("{}, using defaults", e))))
        }
        Err(e) => Err(e),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, warning) = match load_config(args.config.clone()) {
        Ok(loaded) => loaded,
        Err(e) => {
            for suggestion in e.suggestions() {
                eprintln!("  hint: {}", suggestion);
            }
            return Err(e).with_context(|| {
                format!("Failed to load configuration from {}", args.config.display())
            });
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();

    if let Some(warning) = warning {
        log::warn!("{}", warning);
    }

    let config = config.with_env_overrides();
    if let Err(e) = config.validate() {
        for suggestion in e.suggestions() {
            log::error!("{}", suggestion);
        }
        return Err(e).context("Invalid configuration");
    }
    log::info!(
        "Config loaded: wallet API at {}, timeout {}s",
        config.api_base_url(),
        config.api.timeout_secs
    );

    let client = ApiClient::new(&config).context("Failed to create wallet API client")?;
    let api: ApiRef = Arc::new(client);

    let rt = Runtime::new()?;
    rt.block_on(start_server(config, api))?;

    Ok(())
}
