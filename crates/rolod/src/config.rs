//! Daemon configuration.
//!
//! A TOML file, loaded from an explicit `--config` path or the default user
//! location, falling back to defaults when absent. The model API key can
//! always be supplied through the `GROQ_API_KEY` environment variable.

use anyhow::{Context, Result};
use rolo_common::llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "GROQ_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            db_path: PathBuf::from("contacts.db"),
            static_dir: PathBuf::from("static"),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration. An explicit path must exist and parse; the
    /// default location is best-effort.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?
            }
            None => Self::load_default_location(),
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                config.llm.api_key = Some(key);
            }
        }

        Ok(config)
    }

    fn load_default_location() -> Self {
        if let Some(path) = Self::user_config_path() {
            if let Ok(content) = std::fs::read_to_string(&path) {
                if let Ok(config) = toml::from_str(&content) {
                    return config;
                }
            }
        }

        Self::default()
    }

    fn user_config_path() -> Option<PathBuf> {
        let config_dir = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg)
        } else {
            let home = std::env::var("HOME").ok()?;
            PathBuf::from(home).join(".config")
        };

        Some(config_dir.join("rolo").join("config.toml"))
    }
}
