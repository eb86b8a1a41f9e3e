use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::models::ModelDirectory;
use crate::ollama::DEFAULT_BASE_URL;

/// Where the model list comes from
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelSource {
    /// The `models` list below
    Static,
    /// Ask the server at start-up
    #[default]
    Detect,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub model_source: ModelSource,
    pub models: Vec<String>,
    pub default_model: Option<String>,
    pub deploy_url: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_BASE_URL.to_string(),
            model_source: ModelSource::Detect,
            models: vec![
                "qwen2.5-coder:14b-instruct-q4_K_M".to_string(),
                "qwen2.5-coder:7b".to_string(),
                "qwen2.5-coder:1.5b".to_string(),
            ],
            default_model: None,
            deploy_url: "https://app.netlify.com/drop".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from the user config directory, falling back to defaults when
    /// no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&config_content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("nebula-forge").join("config.json"))
    }

    /// Initial model directory for this configuration.
    pub fn model_directory(&self) -> ModelDirectory {
        match self.model_source {
            ModelSource::Static => {
                ModelDirectory::fixed(self.models.clone(), self.default_model.as_deref())
            }
            ModelSource::Detect => ModelDirectory::detecting(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceStatus;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server_url, "http://localhost:11434");
        assert_eq!(config.model_source, ModelSource::Detect);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"model_source":"static","models":["x","y"],"default_model":"y"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.model_source, ModelSource::Static);
        assert_eq!(config.log_level, "info");

        let directory = config.model_directory();
        assert_eq!(directory.current(), Some("y"));
        assert_eq!(directory.status(), ServiceStatus::Online);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_detect_source_starts_probing() {
        let directory = Config::default().model_directory();
        assert_eq!(directory.status(), ServiceStatus::Probing);
        assert_eq!(directory.current(), None);
    }
}
