//! LLM Client module
//!
//! Provides the narrow "send text, get text" capability template steps use,
//! plus the provider clients behind it.

use std::sync::Arc;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod openai;
mod retry;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use openai::{ApiFlavor, OpenAIClient};
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, TokenUsage};

use crate::config::LlmConfig;

/// Create an LLM client based on the provider specified in config
///
/// Supports "openai", "azure" and "anthropic" providers. `temperature` comes
/// from the run's model config rather than the provider section.
pub fn create_client(config: &LlmConfig, temperature: f32) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = ?config.model(), "create_client: called");
    match config.provider.as_str() {
        "openai" => {
            debug!("create_client: creating OpenAI client");
            Ok(Arc::new(OpenAIClient::from_config(config, ApiFlavor::OpenAI, temperature)?))
        }
        "azure" => {
            debug!("create_client: creating Azure OpenAI client");
            let flavor = ApiFlavor::Azure {
                api_version: config.api_version.clone(),
            };
            Ok(Arc::new(OpenAIClient::from_config(config, flavor, temperature)?))
        }
        "anthropic" => {
            debug!("create_client: creating Anthropic client");
            Ok(Arc::new(AnthropicClient::from_config(config, temperature)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::Config(format!(
                "Unknown LLM provider: '{}'. Supported: openai, azure, anthropic",
                other
            )))
        }
    }
}
