use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow};

use crate::strategy::Strategy;

/// Environment variable holding the completions API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub strategy: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub preferences: Preferences,
    pub mock_delay_ms: Option<DelayRange>,
    pub log_level: Option<String>,
}

/// Optional reply preferences forwarded to the completions API as a system
/// instruction. Missing fields are sent as "N/A".
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Preferences {
    pub tone: Option<String>,
    pub length: Option<String>,
    pub examples: Option<String>,
    pub language: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl Default for DelayRange {
    fn default() -> Self {
        Self { min: 1000, max: 3000 }
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            strategy: Some(Strategy::Mock.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {:?}", path))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("Invalid config file at {:?}", path))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Configured strategy, falling back to the mock generator for unknown names
    pub fn strategy(&self) -> Strategy {
        self.strategy
            .as_deref()
            .and_then(Strategy::from_str)
            .unwrap_or(Strategy::Mock)
    }

    pub fn mock_delay(&self) -> DelayRange {
        let range = self.mock_delay_ms.unwrap_or_default();
        if range.min > range.max {
            DelayRange { min: range.max, max: range.min }
        } else {
            range
        }
    }

    /// Read the API key from the environment. Empty values count as missing.
    pub fn api_key_from_env() -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("chatterm").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.strategy(), Strategy::Mock);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            strategy: Some("openai".to_string()),
            model: Some("gpt-4o-mini".to_string()),
            preferences: Preferences {
                tone: Some("friendly".to_string()),
                ..Preferences::default()
            },
            ..Config::new()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.strategy(), Strategy::OpenAI);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"preferences": {"language": "French"}}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.preferences.language.as_deref(), Some("French"));
        assert_eq!(config.preferences.tone, None);
        assert_eq!(config.strategy(), Strategy::Mock);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_mock_delay_is_normalized() {
        let config = Config {
            mock_delay_ms: Some(DelayRange { min: 500, max: 10 }),
            ..Config::new()
        };
        assert_eq!(config.mock_delay(), DelayRange { min: 10, max: 500 });
        assert_eq!(Config::new().mock_delay(), DelayRange { min: 1000, max: 3000 });
    }
}
