use anyhow::{bail, Context, Result};
use parley_config::ParleyConfig;
use parley_provider::OpenAIAssistantsClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the provider client from config and run the web server.
///
/// The key is resolved from `provider.api_key_env` on each provider call, the
/// same way `/readiness_check` reads it.
pub async fn serve(config: ParleyConfig) -> Result<()> {
    let client = provider_client(&config);
    if !client.has_api_key() {
        warn!(
            "{} is not set; /readiness_check will fail and chat requests will be refused",
            config.provider.api_key_env
        );
    }

    info!(provider_url = %client.base_url(), "Using assistants provider");

    parley_web::start_server(&config, Arc::new(client))
        .await
        .context("Web server failed")
}

fn provider_client(config: &ParleyConfig) -> OpenAIAssistantsClient {
    OpenAIAssistantsClient::new(
        None,
        Some(config.provider.base_url.clone()),
        config.provider.request_timeout_secs,
    )
    .with_api_key_env(config.provider.api_key_env.as_str())
}

/// Write the example config, refusing to clobber an existing file unless forced
pub fn init_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path,
        None => ParleyConfig::default_config_path()?,
    };

    if path.exists() && !force {
        bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    ParleyConfig::create_example(&path)?;
    Ok(path)
}

pub fn show_config(config: &ParleyConfig) -> Result<String> {
    config.display_as_toml()
}
