use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "quotebook";
const CONFIG_FILE: &str = "config.json";

/// Overrides the database location from the config file.
pub const DB_ENV_VAR: &str = "QUOTEBOOK_DB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding items and history. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Prefix for formatted amounts.
    pub currency_symbol: String,
    pub decimal_separator: char,
    pub thousands_separator: char,
    /// Ask before removing items, clearing the budget or touching history.
    pub confirm_destructive: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            currency_symbol: "R$".to_string(),
            decimal_separator: ',',
            thousands_separator: '.',
            confirm_destructive: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the user's config directory.
    /// Returns default config if file doesn't exist or fails to parse.
    pub fn load() -> Self {
        match get_config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save the current configuration to the user's config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// The database file to open: environment override, then config, then `None`
    /// for the platform default.
    pub fn resolved_database_path(&self) -> Option<PathBuf> {
        std::env::var_os(DB_ENV_VAR)
            .map(PathBuf::from)
            .or_else(|| self.database_path.clone())
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
