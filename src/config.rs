/// Configuration module for NutriLog.
///
/// Handles loading, validating, and providing default configuration values
/// for the food database client and the generation backend.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Config file used when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "nutrilog.json";

// ── Default value functions ──────────────────────────────────────────

fn default_food_db_url() -> String {
    "https://world.openfoodfacts.org".to_string()
}

fn default_user_agent() -> String {
    format!("NutriLog/{} (nutrition-log pipeline)", env!("CARGO_PKG_VERSION"))
}

fn default_page_size() -> u32 {
    5
}

fn default_food_db_timeout() -> u64 {
    15
}

fn default_generation_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_model_id() -> String {
    "llama3.2:1b".to_string()
}

fn default_generation_timeout() -> u64 {
    300
}

fn default_retry_delay_ms() -> u64 {
    500
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub food_db: FoodDbConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FoodDbConfig {
    #[serde(default = "default_food_db_url")]
    pub base_url: String,

    /// OpenFoodFacts asks clients to identify themselves.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    #[serde(default = "default_food_db_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GenerationConfig {
    /// OpenAI-compatible base URL (Ollama's `/v1` by default).
    #[serde(default = "default_generation_url")]
    pub base_url: String,

    #[serde(default = "default_model_id")]
    pub model_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,

    /// Extra attempts after a transient failure; `0` disables retrying.
    #[serde(default)]
    pub max_retries: usize,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for FoodDbConfig {
    fn default() -> Self {
        Self {
            base_url: default_food_db_url(),
            user_agent: default_user_agent(),
            default_page_size: default_page_size(),
            timeout_secs: default_food_db_timeout(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_url(),
            model_id: default_model_id(),
            api_key: None,
            timeout_secs: default_generation_timeout(),
            max_retries: 0,
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to [`DEFAULT_CONFIG_PATH`].
    /// If the file does not exist, returns a default config and, for the
    /// default path only, writes a template next to the binary's cwd.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            DEFAULT_CONFIG_PATH
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            if path == DEFAULT_CONFIG_PATH {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            is_http_url(&self.food_db.base_url),
            "food_db.base_url must be an http(s) URL"
        );
        anyhow::ensure!(
            !self.food_db.user_agent.trim().is_empty(),
            "food_db.user_agent must not be empty"
        );
        anyhow::ensure!(
            (1..=100).contains(&self.food_db.default_page_size),
            "food_db.default_page_size must be between 1 and 100"
        );
        anyhow::ensure!(
            self.food_db.timeout_secs > 0,
            "food_db.timeout_secs must be positive"
        );
        anyhow::ensure!(
            is_http_url(&self.generation.base_url),
            "generation.base_url must be an http(s) URL"
        );
        anyhow::ensure!(
            !self.generation.model_id.trim().is_empty(),
            "generation.model_id must not be empty"
        );
        anyhow::ensure!(
            self.generation.timeout_secs > 0,
            "generation.timeout_secs must be positive"
        );
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// ── Tests ────────────────────────────────────────────────────────────
