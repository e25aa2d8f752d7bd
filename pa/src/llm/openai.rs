//! OpenAI API client implementation
//!
//! Implements the LlmClient trait for the Chat Completions API, either against
//! api.openai.com or against an Azure OpenAI deployment.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::retry;
use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, Role, StopReason, TokenUsage};
use crate::config::LlmConfig;

/// Which flavour of the chat completions endpoint to talk to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFlavor {
    /// api.openai.com style: `/v1/chat/completions`, bearer auth
    OpenAI,
    /// Azure deployment: `/openai/deployments/{model}/chat/completions`, `api-key` header
    Azure { api_version: String },
}

/// OpenAI API client
pub struct OpenAIClient {
    model: String,
    api_key: String,
    base_url: String,
    flavor: ApiFlavor,
    http: Client,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
    max_retries: u32,
}

impl OpenAIClient {
    /// Create a new client from configuration
    pub fn from_config(config: &LlmConfig, flavor: ApiFlavor, temperature: f32) -> Result<Self, LlmError> {
        debug!(?config, ?flavor, %temperature, "from_config: called");
        let api_key = config.get_api_key().map_err(|e| LlmError::Config(e.to_string()))?;
        let model = config
            .model()
            .ok_or_else(|| LlmError::Config(format!("no model set for provider '{}'", config.provider)))?
            .to_string();
        let base_url = config
            .base_url()
            .ok_or_else(|| LlmError::Config(format!("no base URL set for provider '{}'", config.provider)))?
            .trim_end_matches('/')
            .to_string();

        let timeout = Duration::from_millis(config.timeout_ms);

        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model,
            api_key,
            base_url,
            flavor,
            http,
            max_tokens: config.max_tokens,
            temperature,
            timeout,
            max_retries: config.max_retries,
        })
    }

    /// Endpoint URL for the configured flavour
    fn endpoint(&self) -> String {
        match &self.flavor {
            ApiFlavor::OpenAI => format!("{}/v1/chat/completions", self.base_url),
            ApiFlavor::Azure { api_version } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.base_url, self.model, api_version
            ),
        }
    }

    /// Attach authentication headers for the configured flavour
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.flavor {
            ApiFlavor::OpenAI => builder.header("Authorization", format!("Bearer {}", self.api_key)),
            ApiFlavor::Azure { .. } => builder.header("api-key", &self.api_key),
        }
    }

    /// Build the request body for the OpenAI API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let max_tokens = request.max_tokens.map_or(self.max_tokens, |m| m.min(self.max_tokens));
        let temperature = request.temperature.unwrap_or(self.temperature);
        debug!(%self.model, %max_tokens, %temperature, "build_request_body: called");

        // GPT-5.x and o1/o3 models use max_completion_tokens instead of max_tokens
        let uses_completion_tokens =
            self.model.starts_with("gpt-5") || self.model.starts_with("o1") || self.model.starts_with("o3");

        let mut body = serde_json::json!({
            "messages": convert_messages(&request.messages),
            "temperature": temperature,
        });

        // Azure routes by deployment in the URL
        if self.flavor == ApiFlavor::OpenAI {
            body["model"] = serde_json::json!(self.model);
        }

        if uses_completion_tokens {
            body["max_completion_tokens"] = serde_json::json!(max_tokens);
        } else {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    /// Parse the OpenAI API response
    fn parse_response(&self, api_response: OpenAIResponse) -> CompletionResponse {
        debug!(choices = api_response.choices.len(), "parse_response: called");
        let (content, stop_reason) = match api_response.choices.into_iter().next() {
            Some(c) => (c.message.content, StopReason::from_openai(c.finish_reason.as_deref())),
            None => (None, StopReason::EndTurn),
        };

        let usage = api_response
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        CompletionResponse {
            content,
            stop_reason,
            usage,
        }
    }
}

/// Convert internal Message types to OpenAI API format
fn convert_messages(messages: &[Message]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            serde_json::json!({
                "role": role,
                "content": msg.content,
            })
        })
        .collect()
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, "complete: called");
        let url = self.endpoint();
        let body = self.build_request_body(&request);

        let response = retry::send_with_retry(self.max_retries, self.timeout, || {
            self.authorize(self.http.post(url.as_str()))
                .header("content-type", "application/json")
                .json(&body)
        })
        .await?;

        debug!("complete: success");
        let api_response: OpenAIResponse = response.json().await?;
        Ok(self.parse_response(api_response))
    }
}

// OpenAI API response types

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
