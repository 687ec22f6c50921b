mod file_config;

pub use file_config::{FileConfig, ProviderConfig};

use crate::relay::{CredentialsSource, API_KEY_ENV_VAR, APP_ID_ENV_VAR};
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub provider_base_url: String,
    pub provider_timeout_sec: u64,
    pub site_url: Option<String>,
    pub relay_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub relay_token: Option<String>,

    pub provider: ProviderSettings,
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout_sec: u64,
    /// Target of the "view site" button on every notification.
    pub site_url: String,
    pub credentials: CredentialsSource,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port {
            bail!("port and metrics_port must differ (both are {})", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let relay_token = file
            .relay_token
            .or_else(|| cli.relay_token.clone())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let provider_file = file.provider.unwrap_or_default();

        let base_url = provider_file
            .base_url
            .unwrap_or_else(|| cli.provider_base_url.clone());
        if base_url.trim().is_empty() {
            bail!("provider base_url must not be empty");
        }

        let timeout_sec = provider_file
            .timeout_sec
            .unwrap_or(cli.provider_timeout_sec);
        if timeout_sec == 0 {
            bail!("provider timeout_sec must be greater than zero");
        }

        let site_url = provider_file
            .site_url
            .or_else(|| cli.site_url.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("site_url must be specified via --site-url or in config file")
            })?;
        if !(site_url.starts_with("http://") || site_url.starts_with("https://")) {
            bail!("site_url must be an http(s) URL: {}", site_url);
        }

        let credentials = CredentialsSource::from_env_vars(
            provider_file
                .app_id_env
                .unwrap_or_else(|| APP_ID_ENV_VAR.to_string()),
            provider_file
                .api_key_env
                .unwrap_or_else(|| API_KEY_ENV_VAR.to_string()),
        );

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            relay_token,
            provider: ProviderSettings {
                base_url,
                timeout_sec,
                site_url,
                credentials,
            },
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            relay_token: self.relay_token.clone(),
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
