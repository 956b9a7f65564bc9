//! TOML-based configuration for Scout
//!
//! Every section has defaults, so a missing `scout.toml` is valid. Secrets
//! are never written in the file: it names the environment variable that
//! holds each credential (`api_key_env`), resolved at startup after `.env`
//! is loaded.

use crate::search::{BingSearch, SearchBackend};
use crate::session::{DriverConfig, ModelParams};
use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Root configuration structure loaded from scout.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutConfig {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub driver: DriverSettings,

    #[serde(default)]
    pub output: OutputConfig,
}

// ============= Model Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_one")]
    pub temperature: f32,

    #[serde(default = "default_one")]
    pub top_p: f32,

    #[serde(default = "default_token_budget")]
    pub max_prompt_tokens: u32,

    #[serde(default = "default_token_budget")]
    pub max_completion_tokens: u32,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_openai_base")]
    pub api_base: String,

    /// Environment variable containing the API key
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_one() -> f32 {
    1.0
}

fn default_token_budget() -> u32 {
    32768
}

fn default_system_prompt() -> String {
    crate::llm::DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_openai_base() -> String {
    crate::llm::openai::DEFAULT_API_BASE.to_string()
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_one(),
            top_p: default_one(),
            max_prompt_tokens: default_token_budget(),
            max_completion_tokens: default_token_budget(),
            system_prompt: default_system_prompt(),
            api_base: default_openai_base(),
            api_key_env: default_openai_key_env(),
        }
    }
}

impl ModelConfig {
    pub fn api_key(&self) -> Result<String> {
        resolve_env(&self.api_key_env)
    }
}

// ============= Search Configuration =============

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackendKind {
    Bing,
    #[value(name = "duckduckgo")]
    DuckDuckGo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_backend")]
    pub backend: SearchBackendKind,

    #[serde(default = "default_bing_endpoint")]
    pub endpoint: String,

    /// Environment variable containing the Bing subscription key
    #[serde(default = "default_bing_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_custom_config")]
    pub custom_config: String,

    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Model for query generation and synthesis; the main model when unset.
    #[serde(default)]
    pub model: Option<String>,
}

fn default_backend() -> SearchBackendKind {
    SearchBackendKind::DuckDuckGo
}

fn default_bing_endpoint() -> String {
    crate::search::bing::DEFAULT_ENDPOINT.to_string()
}

fn default_bing_key_env() -> String {
    "BING_SUBSCRIPTION_KEY".to_string()
}

fn default_custom_config() -> String {
    "0".to_string()
}

fn default_query_timeout() -> u64 {
    10
}

fn default_max_results() -> u32 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            endpoint: default_bing_endpoint(),
            api_key_env: default_bing_key_env(),
            custom_config: default_custom_config(),
            query_timeout_secs: default_query_timeout(),
            max_results: default_max_results(),
            model: None,
        }
    }
}

impl SearchConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    /// Instantiate the configured backend.
    pub fn build_backend(&self) -> Result<Arc<dyn SearchBackend>> {
        match self.backend {
            SearchBackendKind::Bing => {
                let key = resolve_env(&self.api_key_env)?;
                let bing = BingSearch::new(
                    self.endpoint.clone(),
                    key,
                    self.custom_config.clone(),
                    self.query_timeout(),
                )?
                .with_max_results(self.max_results);
                Ok(Arc::new(bing))
            }
            #[cfg(feature = "duckduckgo")]
            SearchBackendKind::DuckDuckGo => Ok(Arc::new(
                crate::search::DuckDuckGoSearch::new(self.max_results as usize),
            )),
            #[cfg(not(feature = "duckduckgo"))]
            SearchBackendKind::DuckDuckGo => Err(AppError::Configuration(
                "DuckDuckGo backend requires the 'duckduckgo' feature".to_string(),
            )),
        }
    }
}

// ============= Driver Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverSettings {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_max_polls")]
    pub max_polls: u32,

    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub parallel_tools: bool,
}

fn default_poll_interval() -> u64 {
    100
}

fn default_max_polls() -> u32 {
    3000
}

fn default_tool_timeout() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            max_polls: default_max_polls(),
            tool_timeout_secs: default_tool_timeout(),
            parallel_tools: default_true(),
        }
    }
}

// ============= Output Configuration =============

/// How the assistant is driven.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One request, one answer.
    #[default]
    #[serde(alias = "ponctual")]
    #[value(alias = "ponctual")]
    Punctual,
    /// Interactive loop until `exit`.
    Continuous,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 0 = silent, 1 = log tool calls, 2 = log full payloads
    #[serde(default)]
    pub verbosity: u8,

    #[serde(default)]
    pub mode: Mode,
}

// ============= Loading & Validation =============

impl ScoutConfig {
    /// Load from `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Configuration(format!("Invalid configuration: {}", e)))
    }

    /// Reject knobs the backend would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        let m = &self.model;
        if !(0.0..=2.0).contains(&m.temperature) {
            return Err(AppError::Configuration(format!(
                "temperature must be within [0, 2], got {}",
                m.temperature
            )));
        }
        if !(0.0..=1.0).contains(&m.top_p) {
            return Err(AppError::Configuration(format!(
                "top_p must be within [0, 1], got {}",
                m.top_p
            )));
        }
        if m.max_prompt_tokens == 0 || m.max_completion_tokens == 0 {
            return Err(AppError::Configuration(
                "token budgets must be positive".to_string(),
            ));
        }
        if m.model.trim().is_empty() {
            return Err(AppError::Configuration("model must not be empty".to_string()));
        }
        if self.driver.poll_interval_ms == 0 || self.driver.max_polls == 0 {
            return Err(AppError::Configuration(
                "poll_interval_ms and max_polls must be positive".to_string(),
            ));
        }
        if self.output.verbosity > 2 {
            return Err(AppError::Configuration(format!(
                "verbosity must be 0, 1 or 2, got {}",
                self.output.verbosity
            )));
        }
        Ok(())
    }

    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            model: self.model.model.clone(),
            temperature: self.model.temperature,
            top_p: self.model.top_p,
            max_prompt_tokens: self.model.max_prompt_tokens,
            max_completion_tokens: self.model.max_completion_tokens,
        }
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            poll_interval: Duration::from_millis(self.driver.poll_interval_ms),
            max_polls: self.driver.max_polls,
            tool_timeout: Duration::from_secs(self.driver.tool_timeout_secs),
            parallel_tools: self.driver.parallel_tools,
        }
    }

    /// Model used inside the search tool.
    pub fn search_model(&self) -> &str {
        self.search.model.as_deref().unwrap_or(&self.model.model)
    }
}

fn resolve_env(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Configuration(format!(
            "Environment variable {} is not set",
            var
        ))),
    }
}
