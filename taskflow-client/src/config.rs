use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load `client.toml` from the platform config dir, writing the default
    /// file on first run
    pub fn load() -> Result<(Self, PathBuf)> {
        let config_path = get_config_path();
        let config = Self::load_from(&config_path)?;
        Ok((config, config_path))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if !config_path.exists() {
            let contents = toml::to_string_pretty(&Self::default())?;
            std::fs::write(config_path, contents)?;
        }

        let config = Config::builder()
            .add_source(File::from(config_path.to_path_buf()))
            .add_source(Environment::with_prefix("TASKFLOW").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("taskflow").join("client.toml")
    } else {
        PathBuf::from("client.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_default_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taskflow").join("client.toml");

        let config = ClientConfig::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, "api_base_url = \"https://tasks.example.com\"\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();

        assert_eq!(config.api_base_url, "https://tasks.example.com");
    }
}
