use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::style::Stylize;
use shopper_cli::api::credentials;
use shopper_cli::api::models::{Marketplace, SearchMode};
use shopper_cli::api::SearchClient;
use shopper_cli::config::Config;
use shopper_cli::logging::{init_stderr_tracing, init_tracing};
use shopper_cli::services::SearchOrchestrator;
use shopper_cli::state::events::StateEvent;
use shopper_cli::state::pacing::Pacing;
use shopper_cli::state::SearchController;
use shopper_cli::table_display::{display_failure, display_results, export_to_csv};
use shopper_cli::ui::format::product_cards;
use shopper_cli::ui::run_tui;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Terminal client for the shopping search assistant
#[derive(Debug, Parser)]
#[command(name = "shopper-cli", version, about)]
struct Cli {
    /// Base URL of the search backend
    #[arg(long, env = "SHOPPER_BACKEND_URL")]
    backend_url: Option<String>,

    /// Marketplace to search (defaults to the config file's choice)
    #[arg(long, value_enum)]
    marketplace: Option<Marketplace>,

    /// Retrieval mode (defaults to the config file's choice)
    #[arg(long, value_enum)]
    mode: Option<SearchMode>,

    /// Run a single search without the TUI and print the results
    #[arg(long)]
    query: Option<String>,

    /// Write the returned products to a CSV file (with --query)
    #[arg(long, value_name = "FILE.csv", requires = "query")]
    export: Option<PathBuf>,

    /// Skip the simulated progress delays
    #[arg(long)]
    no_pacing: bool,

    /// Bearer token sent with every search
    #[arg(long, env = "SHOPPER_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write a commented default config file and exit
    #[arg(long)]
    generate_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        return generate_config(cli.config.clone());
    }

    // The TUI owns the terminal, so its logs go to the ring buffer
    let log_buffer = if cli.query.is_some() {
        init_stderr_tracing();
        None
    } else {
        Some(init_tracing())
    };

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };

    let backend_url = config
        .resolve_backend_url(cli.backend_url.as_deref())
        .context("Cannot start without a backend")?;

    let credentials = credentials::provider_for(
        cli.token.clone().or_else(|| config.auth.token.clone()),
        config.auth.token_endpoint.clone(),
    );
    let client = SearchClient::with_credentials(&backend_url, credentials);
    info!(
        target: "system",
        "Backend {} ({})",
        client.base_url(),
        client.credentials_name()
    );

    let pacing = if cli.no_pacing {
        Pacing::immediate()
    } else {
        config.pacing.to_pacing()
    };
    let marketplace = cli.marketplace.unwrap_or(config.search.marketplace);
    let mode = cli.mode.unwrap_or(config.search.mode);
    let controller = SearchController::new(pacing, config.logs.to_log_polling())
        .with_marketplace(Some(marketplace))
        .with_mode(Some(mode));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    let mut orchestrator = SearchOrchestrator::new(controller, client, runtime.handle().clone());

    match cli.query {
        Some(query) => {
            if query.trim().is_empty() {
                bail!("--query must not be empty");
            }

            orchestrator.dispatch(StateEvent::Submit(query.clone()));
            runtime.block_on(orchestrator.run_until_settled());

            let controller = orchestrator.controller();
            if let Some(error) = controller.error() {
                display_failure(&query, controller.steps(), error);
                bail!("Search failed: {}", error);
            }

            let Some(response) = controller.response() else {
                bail!("Search finished without a response");
            };
            display_results(&query, response, controller.marketplace());

            if let Some(path) = &cli.export {
                export_to_csv(&product_cards(response, controller.marketplace()), path)
                    .with_context(|| format!("Failed to export to {}", path.display()))?;
            }
            Ok(())
        }
        None => run_tui(orchestrator, config.display.clone(), log_buffer),
    }
}

fn generate_config(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::get_config_path().context("Failed to determine config path")?,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{}",
        format!("Configuration file created at: {}", path.display()).green()
    );
    println!("Edit [backend] url to point at your search backend.");
    Ok(())
}
