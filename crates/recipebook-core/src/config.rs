//! Application configuration management.
//!
//! Configuration is stored at `~/.config/recipebook/config.json`. Any field
//! missing from the file takes its default, and a handful of environment
//! variables override the file after it is read.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_API_URL;
use crate::auth::{LOGIN_PATH, SESSION_COOKIE};
use crate::cms::{DEFAULT_DATASET, DEFAULT_PROJECT_ID};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "recipebook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "RECIPEBOOK_API_URL";
pub const ENV_CMS_PROJECT: &str = "RECIPEBOOK_CMS_PROJECT";
pub const ENV_CMS_DATASET: &str = "RECIPEBOOK_CMS_DATASET";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub cms_project_id: String,
    pub cms_dataset: String,
    /// Route prefixes that require a valid session
    pub protected_paths: Vec<String>,
    pub login_path: String,
    pub cookie_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cms_project_id: DEFAULT_PROJECT_ID.to_string(),
            cms_dataset: DEFAULT_DATASET.to_string(),
            protected_paths: vec!["/recipes".to_string()],
            login_path: LOGIN_PATH.to_string(),
            cookie_name: SESSION_COOKIE.to_string(),
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from a variable lookup (the process environment in practice)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(project) = non_empty(ENV_CMS_PROJECT) {
            self.cms_project_id = project;
        }
        if let Some(dataset) = non_empty(ENV_CMS_DATASET) {
            self.cms_dataset = dataset;
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
