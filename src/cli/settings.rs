//! Webhook settings, persisted in the config file

use anyhow::{bail, Result};
use std::path::Path;

use crate::config::Config;

pub fn show(config: &Config, path: &Path) -> Result<()> {
    println!("Config file: {}", path.display());
    println!("Database:    {}", config.database_path().display());
    match config.webhook_url() {
        Some(url) => println!("Webhook:     {}", url),
        None => println!("Webhook:     (not set, tasks are saved locally only)"),
    }
    if let Some(timeout) = config.webhook.timeout_secs {
        println!("Timeout:     {}s", timeout);
    }
    Ok(())
}

pub fn set_webhook(config: &mut Config, path: &Path, url: String) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        bail!("Webhook URL must not be empty");
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("Webhook URL must start with http:// or https://");
    }

    config.set_webhook_url(Some(url.to_string()));
    config.save(path)?;
    println!("Webhook set to {}", url);
    Ok(())
}

pub fn clear_webhook(config: &mut Config, path: &Path) -> Result<()> {
    config.set_webhook_url(None);
    config.save(path)?;
    println!("Webhook cleared; tasks will be saved locally only.");
    Ok(())
}
