use anyhow::{Context, Result};
use clap::Args;
use colored::*;

use personas_core::ApiClient;

use crate::config::CliConfig;
use crate::utils::{failure, print_success, Spinner};

#[derive(Args)]
pub struct PingArgs {}

pub async fn execute(_args: PingArgs, config: &CliConfig) -> Result<()> {
    let api = config.api_config()?;
    let base_url = api.base_url().to_string();
    let client = ApiClient::new(api).context("Failed to create API client")?;

    let status = {
        let _spinner = Spinner::start(format!("Conectando con {}...", base_url));
        client.test_connection().await
    }
    .map_err(|e| failure("Sin conexión con la API", e.into()))?;

    print_success(&format!("API disponible en {}", base_url));
    if !status.is_null() {
        println!("  {}", status.to_string().dimmed());
    }
    Ok(())
}
