use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use storefront_push::config::{self, AppConfig};
use storefront_push::relay::{OneSignalClient, PushProvider, RelayService, ONESIGNAL_API_BASE};
use storefront_push::server::{metrics, run_server, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the push provider REST API.
    #[clap(long, default_value = ONESIGNAL_API_BASE)]
    pub provider_base_url: String,

    /// Timeout in seconds for push provider requests.
    #[clap(long, default_value_t = 30)]
    pub provider_timeout_sec: u64,

    /// Storefront URL opened by the "view site" notification button.
    #[clap(long)]
    pub site_url: Option<String>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            provider_base_url: args.provider_base_url.clone(),
            provider_timeout_sec: args.provider_timeout_sec,
            site_url: args.site_url.clone(),
            relay_token: std::env::var("RELAY_TOKEN").ok(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    // Surface a misconfigured deployment at boot; requests still re-check.
    if let Err(e) = app_config.provider.credentials.resolve() {
        warn!("Push provider credentials are not available yet: {}", e);
    }
    if app_config.relay_token.is_none() {
        info!("No relay token configured, /send-push trusts the calling platform");
    }

    info!("Initializing metrics...");
    metrics::init_metrics();

    let provider: Arc<dyn PushProvider> = Arc::new(OneSignalClient::new(
        app_config.provider.base_url.clone(),
        app_config.provider.site_url.clone(),
        app_config.provider.timeout_sec,
    )?);
    info!(
        "Push provider {} configured at {}",
        provider.name(),
        app_config.provider.base_url
    );

    let relay = Arc::new(RelayService::new(
        provider,
        app_config.provider.credentials.clone(),
    ));

    info!("Ready to serve at port {}!", app_config.port);
    info!("Metrics available at port {}!", app_config.metrics_port);
    run_server(app_config.server_config(), relay).await
}
