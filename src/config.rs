use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{ForgeError, Result};
use crate::scoring::ScoringRules;
use crate::session::QuotaConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub api_base: String,
    pub model: String,
    pub temperature: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4.1-mini".to_string(),
            temperature: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub scoring: ScoringRules,
    pub quota: QuotaConfig,
    pub generator: GeneratorConfig,
}

impl AppConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>)> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path).map_err(|err| ForgeError::Config {
                    message: format!("failed to read config: {}", err),
                })?;
                toml::from_str(&contents).map_err(|err| ForgeError::Config {
                    message: format!("failed to parse config: {}", err),
                })?
            } else {
                AppConfig::default()
            }
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| ForgeError::Config {
                message: format!("failed to create config dir: {}", err),
            })?;
        }
        let payload = toml::to_string_pretty(self).map_err(|err| ForgeError::Config {
            message: format!("failed to serialize config: {}", err),
        })?;
        std::fs::write(path, payload).map_err(|err| ForgeError::Config {
            message: format!("failed to write config: {}", err),
        })?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("STARTER_DAILY_QUOTA") {
            if let Ok(parsed) = value.parse::<u32>() {
                self.quota.starter_daily = parsed;
            }
        }
        if let Ok(value) = env::var("GENERATION_TEMPERATURE") {
            if let Ok(parsed) = value.parse::<f64>() {
                self.generator.temperature = parsed;
            }
        }
        if let Ok(value) = env::var("OPENAI_API_BASE") {
            if !value.trim().is_empty() {
                self.generator.api_base = value;
            }
        }
        if let Ok(value) = env::var("OPENAI_MODEL") {
            if !value.trim().is_empty() {
                self.generator.model = value;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("CAPTION_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/caption.toml")))
}
