use anyhow::Result;
use chronoperates_core::config::{API_URL_ENV, ClientSettings};
use owo_colors::OwoColorize;

use super::{load_settings, resolve_api};
use crate::handoff::download_dir;

pub async fn run() -> Result<()> {
    let config_path = ClientSettings::config_path().map_err(|e| anyhow::anyhow!(e))?;
    let settings = load_settings()?;
    let api = resolve_api(&settings).await;

    println!("{}", "Paths".bold());
    println!("  Settings:   {}", config_path.display());
    println!("  Downloads:  {}", download_dir(&settings).display());

    println!("\n{}", "API".bold());
    println!("  URL:        {}", api.api_url());
    println!(
        "  Origin:     {}",
        settings.origin.as_deref().unwrap_or("(not set)").dimmed()
    );
    println!(
        "  {}: {}",
        API_URL_ENV,
        std::env::var(API_URL_ENV)
            .unwrap_or_else(|_| "(not set)".to_string())
            .dimmed()
    );

    Ok(())
}
