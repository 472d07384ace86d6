use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{arg, command, Parser, Subcommand};
use listing_agent::cache::token_manager::TokenManager;
use listing_agent::helpers::time::{get_token_safety_margin_seconds, now};
use listing_agent::observability::exposition::render_metrics;
use listing_agent::resilience::retry::RetryingHttpClient;
use listing_agent::sinks::env_file::EnvFileCredentialStore;
use listing_agent::sources::listing::ListingClient;
use listing_agent::sources::oauth2::OAuth2RefreshSource;
use listing_agent::utils::config_loader;
use listing_agent::utils::logging;
use listing_agent::utils::logging::LogLevel;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "listing-agent.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// dump Prometheus metrics to stderr before exiting
    #[arg(long)]
    print_metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a listing and print it as JSON
    Fetch { url: String },
    /// Refresh the access token now, whatever its expiry
    Refresh,
    /// Print the stored token expiry
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Create request client and token manager
    // -------------------------------

    let settings = &service_config.settings;
    let http = RetryingHttpClient::new(settings.retry_settings(), settings.request_timeout())
        .context("building http client")?;
    let store = EnvFileCredentialStore::new(&service_config.credentials.path);
    let refresher = OAuth2RefreshSource::new(&service_config.ebay, service_config.ebay.app_credentials(), http.clone());
    let safety_margin_seconds = get_token_safety_margin_seconds(settings.safety_margin_seconds);
    let tokens = Arc::new(TokenManager::new(store, refresher, safety_margin_seconds));

    if !tokens.load().await? {
        info!("no stored token in '{}'", service_config.credentials.path);
    }

    // -------------------------------
    // 3. Run command
    // -------------------------------

    match args.command {
        Command::Fetch { url } => {
            let client = ListingClient::new(tokens, http, &service_config.ebay, service_config.pricing.to_owned());
            let listing = client.fetch_listing_data(&url).await?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Command::Refresh => {
            tokens.force_refresh().await?;
            let token = tokens.current_token().await?;
            println!("refreshed; expires at {}", token.expires_at.to_rfc3339());
        }
        Command::Status => {
            let token = tokens.current_token().await?;
            let remaining = (token.expires_at - now()).num_seconds();
            println!("expires_at: {}", token.expires_at.to_rfc3339());
            println!("seconds_remaining: {}", remaining);
            println!("refresh_due: {}", token.is_expiring(tokens.safety_margin_seconds()));
        }
    }

    if args.print_metrics {
        eprintln!("{}", render_metrics().await?);
    }
    Ok(())
}
