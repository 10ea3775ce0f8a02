//! Configuration management with YAML support

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "intellitask.yaml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub webhook: WebhookConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// Webhook configuration. No URL means local-only mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Request timeout; unset leaves it to the transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Diagnostic logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_database_path() -> String {
    dirs::data_local_dir()
        .map(|d| {
            d.join("intellitask")
                .join("intellitask.db")
                .to_string_lossy()
                .to_string()
        })
        .unwrap_or_else(|| "~/.local/share/intellitask/intellitask.db".to_string())
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Candidate config locations, in search order:
    /// 1. Provided path
    /// 2. ./intellitask.yaml (current directory)
    /// 3. <config dir>/intellitask/intellitask.yaml
    fn search_paths(path: &str) -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(shellexpand::tilde(path).to_string()),
            PathBuf::from(CONFIG_FILE_NAME),
        ];
        paths.extend(Self::user_config_path());
        paths
    }

    /// <config dir>/intellitask/intellitask.yaml
    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("intellitask").join(CONFIG_FILE_NAME))
    }

    /// The file `load` reads from. When none exists yet, an explicit path is
    /// used as given and the default name goes to the user config dir.
    pub fn resolve_path(path: &str) -> PathBuf {
        if let Some(found) = Self::search_paths(path).into_iter().find(|p| p.exists()) {
            return found;
        }
        if path == CONFIG_FILE_NAME {
            if let Some(user) = Self::user_config_path() {
                return user;
            }
        }
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Load configuration from the first existing search path
    pub fn load(path: &str) -> Result<Self> {
        for search_path in Self::search_paths(path) {
            if search_path.exists() {
                return Self::load_file(&search_path);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Write configuration as YAML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Get the database path, expanding ~ to home directory
    pub fn database_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.database.path).to_string();
        PathBuf::from(expanded)
    }

    /// Configured webhook URL, ignoring blank values
    pub fn webhook_url(&self) -> Option<String> {
        self.webhook
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
    }

    pub fn set_webhook_url(&mut self, url: Option<String>) {
        self.webhook.url = url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
    }

    pub fn webhook_timeout(&self) -> Option<Duration> {
        self.webhook.timeout_secs.map(Duration::from_secs)
    }
}
