//! pkglink - Incremental package linker
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use pkglink::cli::{Cli, Commands};
use pkglink::config::ConfigManager;
use pkglink::error::{LinkError, LinkResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> LinkResult<()> {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("pkglink=warn"),
        1 => EnvFilter::new("pkglink=info"),
        _ => EnvFilter::new("pkglink=debug"),
    };

    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| LinkError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);
    if config.general.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    if let Some(path) = &local_config_path {
        debug!("Using local config: {}", path.display());
    }

    match cli.command {
        Commands::Link(args) => pkglink::cli::commands::link(args, &config).await,
        Commands::Show(args) => pkglink::cli::commands::show(args, &config).await,
        Commands::Scan(args) => pkglink::cli::commands::scan(args, &config).await,
        Commands::Config(args) => {
            pkglink::cli::commands::config(args, &config, cli.config).await
        }
    }
}
