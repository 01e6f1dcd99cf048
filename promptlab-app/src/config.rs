//! Configuration for PromptLab
//!
//! JSON file under the user config dir, then environment overrides.

use crate::ai_client::{OpenAIClient, OPENAI_BASE_URL};
use crate::autogen::AutogenConfig;
use crate::errors::{PromptLabError, PromptLabResult};
use promptlab_core::{DEFAULT_MODEL, MAX_EXAMPLE_SCENARIOS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
    /// Lowers the example count; never above `MAX_EXAMPLE_SCENARIOS`
    pub max_example_scenarios: usize,
    pub request_timeout_secs: u64,
    pub data_path: Option<PathBuf>,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: OPENAI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_example_scenarios: MAX_EXAMPLE_SCENARIOS,
            request_timeout_secs: 60,
            data_path: None,
            log_json: false,
        }
    }
}

/// Get the config file path
pub fn default_config_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("PromptLab").join(CONFIG_FILE)
}

fn env_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    /// Default file plus process environment
    pub fn load() -> PromptLabResult<Self> {
        let mut config = Self::load_from(&default_config_path())?;
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> PromptLabResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = fs::read_to_string(path).map_err(|e| PromptLabError::FileOperation {
            path: path.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&data).map_err(|e| PromptLabError::Config {
            message: format!("{}: {}", path.display(), e),
        })
    }

    pub fn save_to(&self, path: &Path) -> PromptLabResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PromptLabError::FileOperation {
                path: parent.to_string_lossy().to_string(),
                reason: e.to_string(),
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| PromptLabError::Config {
            message: e.to_string(),
        })?;
        fs::write(path, json).map_err(|e| PromptLabError::FileOperation {
            path: path.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Apply overrides from `lookup` (normally the process environment)
    pub fn apply_env<F>(&mut self, lookup: F) -> PromptLabResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.openai_api_key = Some(key);
        }
        if let Some(url) = lookup("PROMPTLAB_BASE_URL") {
            self.openai_base_url = url;
        }
        if let Some(model) = lookup("PROMPTLAB_MODEL") {
            self.model = model;
        }
        if let Some(raw) = lookup("PROMPTLAB_MAX_EXAMPLES") {
            self.max_example_scenarios = raw.parse().map_err(|_| PromptLabError::Config {
                message: format!("PROMPTLAB_MAX_EXAMPLES is not a count: {}", raw),
            })?;
        }
        if let Some(path) = lookup("PROMPTLAB_DATA") {
            self.data_path = Some(PathBuf::from(path));
        }
        if let Some(flag) = lookup("PROMPTLAB_LOG_JSON").as_deref().and_then(env_bool) {
            self.log_json = flag;
        }
        Ok(())
    }

    pub fn validate(&self) -> PromptLabResult<()> {
        if !(1..=MAX_EXAMPLE_SCENARIOS).contains(&self.max_example_scenarios) {
            return Err(PromptLabError::Config {
                message: format!(
                    "max_example_scenarios must be within 1..={}, got {}",
                    MAX_EXAMPLE_SCENARIOS, self.max_example_scenarios
                ),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(PromptLabError::Config {
                message: "request_timeout_secs must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn autogen(&self) -> AutogenConfig {
        AutogenConfig {
            model: self.model.clone(),
            max_example_scenarios: self.max_example_scenarios,
        }
    }

    pub fn completion_client(&self) -> PromptLabResult<OpenAIClient> {
        let api_key = self
            .openai_api_key
            .clone()
            .ok_or(PromptLabError::AiNotConfigured)?;

        OpenAIClient::new(api_key)
            .with_base_url(&self.openai_base_url)
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
            .map_err(|e| PromptLabError::AiRequest { message: e.message })
    }
}
