//! promptauthor configuration types and loading
//!
//! A run is described by one YAML file. The typed keys (`template`, `persona`,
//! `model-config`, `llm`, `prompts`, `log-level`) configure the run itself;
//! every other top-level key is collected into [`Config::extra`] and becomes
//! an initial template variable.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::persona::{self, Persona};

/// Key accepted as a spelling of `model`
const MODEL_CONFIG_KEY: &str = "model-config";

const MODEL_KEY: &str = "model";

/// Upper bound for `llm.max-retries`
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Main run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name of the template to run
    pub template: String,

    /// Persona the model should adopt
    #[serde(default)]
    pub persona: PersonaRef,

    /// Sampling configuration (also accepted as `model-config`)
    #[serde(default)]
    pub model: ModelConfig,

    /// LLM provider configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Prompt override directories
    #[serde(default)]
    pub prompts: PromptsConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(default, rename = "log-level")]
    pub log_level: Option<String>,

    /// Any other keys; these seed template memory
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(?path, "Config::load: called");
        let config = Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read only the log level from a config file
    ///
    /// Used before logging is initialised, so failures are swallowed and the
    /// full load reports them later.
    pub fn load_log_level(path: impl AsRef<Path>) -> Option<String> {
        #[derive(Deserialize)]
        struct LogLevelOnly {
            #[serde(rename = "log-level")]
            log_level: Option<String>,
        }

        let content = fs::read_to_string(path).ok()?;
        serde_yaml::from_str::<LogLevelOnly>(&content).ok()?.log_level
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = Self::parse(&content)?;
        info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Parse configuration from YAML text without validating it
    pub fn parse(yaml: &str) -> Result<Self> {
        debug!(yaml_len = yaml.len(), "Config::parse: called");
        let raw: serde_yaml::Value = serde_yaml::from_str(yaml).context("Failed to parse config file")?;
        if raw.get(MODEL_KEY).is_some() && raw.get(MODEL_CONFIG_KEY).is_some() {
            return Err(eyre!(
                "Config sets both '{}' and '{}'; keep only one",
                MODEL_KEY,
                MODEL_CONFIG_KEY
            ));
        }

        let mut config: Self = serde_yaml::from_value(raw).context("Failed to parse config file")?;

        // `model-config` is the documented spelling; serde's flatten swallows
        // it into `extra`, so lift it out here.
        if let Some(raw) = config.extra.remove(MODEL_CONFIG_KEY) {
            debug!("Config::parse: found model-config section");
            config.model = serde_json::from_value(raw).context("Invalid model-config section")?;
        }

        Ok(config)
    }

    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        debug!(template = %self.template, "Config::validate: called");
        if self.template.trim().is_empty() {
            return Err(eyre!("Config field 'template' must name a template"));
        }

        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(eyre!(
                "model-config.temperature must be between 0.0 and 2.0, got {}",
                self.model.temperature
            ));
        }

        self.persona.resolve()?;

        self.llm.validate()
    }

    /// Initial template variables: every key that is not part of the run configuration
    pub fn memory_seed(&self) -> BTreeMap<String, serde_json::Value> {
        self.extra.clone()
    }
}

/// Persona given either as a built-in name or inline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersonaRef {
    Named(String),
    Inline(Persona),
}

impl Default for PersonaRef {
    fn default() -> Self {
        PersonaRef::Named(persona::DEFAULT_PERSONA.to_string())
    }
}

impl PersonaRef {
    /// Resolve to a concrete persona
    pub fn resolve(&self) -> Result<Persona> {
        debug!(?self, "PersonaRef::resolve: called");
        match self {
            PersonaRef::Inline(persona) => Ok(persona.clone()),
            PersonaRef::Named(name) => persona::builtin(name).ok_or_else(|| {
                eyre!(
                    "Unknown persona '{}'. Available: {}",
                    name,
                    persona::builtin_names().join(", ")
                )
            }),
        }
    }
}

/// Model sampling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self { temperature: 0.7 }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai", "azure", or "anthropic"
    pub provider: String,

    /// Model identifier (the deployment name for Azure); provider default when unset
    pub model: Option<String>,

    /// Environment variable containing the API key; provider default when unset
    #[serde(rename = "api-key-env")]
    pub api_key_env: Option<String>,

    /// API base URL; provider default when unset
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Azure OpenAI API version
    #[serde(rename = "api-version")]
    pub api_version: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Automatic retries on transient transport failures
    #[serde(rename = "max-retries")]
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            api_key_env: None,
            base_url: None,
            api_version: "2024-02-01".to_string(),
            max_tokens: 4096,
            timeout_ms: 600_000,
            max_retries: 3,
        }
    }
}

/// Settings a provider supplies when the config leaves them out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDefaults {
    pub model: Option<&'static str>,
    pub api_key_env: &'static str,
    pub base_url: Option<&'static str>,
}

/// Defaults for a known provider
///
/// Azure has no default model or endpoint: both name a specific deployment.
pub fn provider_defaults(provider: &str) -> Option<ProviderDefaults> {
    match provider {
        "openai" => Some(ProviderDefaults {
            model: Some("gpt-4o"),
            api_key_env: "OPENAI_API_KEY",
            base_url: Some("https://api.openai.com"),
        }),
        "azure" => Some(ProviderDefaults {
            model: None,
            api_key_env: "AZURE_OPENAI_API_KEY",
            base_url: None,
        }),
        "anthropic" => Some(ProviderDefaults {
            model: Some("claude-sonnet-4-20250514"),
            api_key_env: "ANTHROPIC_API_KEY",
            base_url: Some("https://api.anthropic.com"),
        }),
        _ => None,
    }
}

impl LlmConfig {
    fn defaults(&self) -> Option<ProviderDefaults> {
        provider_defaults(&self.provider)
    }

    /// Model to request, falling back to the provider default
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref().or_else(|| self.defaults().and_then(|d| d.model))
    }

    /// Environment variable holding the API key, falling back to the provider default
    pub fn api_key_env(&self) -> Option<&str> {
        self.api_key_env
            .as_deref()
            .or_else(|| self.defaults().map(|d| d.api_key_env))
    }

    /// API base URL, falling back to the provider default
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref().or_else(|| self.defaults().and_then(|d| d.base_url))
    }

    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        let var = self
            .api_key_env()
            .ok_or_else(|| eyre!("No api-key-env configured for provider '{}'", self.provider))?;
        debug!(api_key_env = %var, "LlmConfig::get_api_key: called");
        std::env::var(var).map_err(|_| eyre!("Environment variable {} is not set", var))
    }

    /// Check that every provider-dependent setting resolves
    pub fn validate(&self) -> Result<()> {
        debug!(provider = %self.provider, "LlmConfig::validate: called");
        if self.defaults().is_none() {
            return Err(eyre!(
                "Unknown LLM provider '{}'. Supported: openai, azure, anthropic",
                self.provider
            ));
        }

        if self.model().is_none() {
            return Err(eyre!("llm.model must be set for provider '{}'", self.provider));
        }

        if self.base_url().is_none() {
            return Err(eyre!("llm.base-url must be set for provider '{}'", self.provider));
        }

        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(eyre!(
                "llm.max-retries must be at most {}, got {}",
                MAX_RETRIES_LIMIT,
                self.max_retries
            ));
        }

        self.get_api_key()
            .map(|_| ())
            .map_err(|e| eyre!("LLM API key not found: {}", e))
    }
}

/// Prompt override directories
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directories searched for `<template>/<prompt>.md` before the built-in prompts
    pub paths: Vec<String>,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            paths: vec![
                ".promptauthor/prompts".to_string(),
                "~/.config/promptauthor/prompts".to_string(),
            ],
        }
    }
}

impl PromptsConfig {
    /// Expand paths (resolve ~/ and relative paths)
    pub fn expanded_paths(&self) -> Vec<PathBuf> {
        self.paths
            .iter()
            .filter_map(|p| {
                if let Some(rest) = p.strip_prefix("~/") {
                    dirs::home_dir().map(|home| home.join(rest))
                } else {
                    Some(PathBuf::from(p))
                }
            })
            .collect()
    }
}
