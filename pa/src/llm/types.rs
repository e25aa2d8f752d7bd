//! LLM request/response types
//!
//! Provider-agnostic shapes for a single chat completion. Template steps only
//! ever send one user message, but the request keeps a message list so the
//! providers can map it one-to-one onto their wire formats.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Conversation messages (a template step sends exactly one)
    pub messages: Vec<Message>,

    /// Max tokens override; the client's configured limit applies when `None`
    pub max_tokens: Option<u32>,

    /// Sampling temperature override; the client's configured value applies when `None`
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// A request carrying a single user prompt
    pub fn prompt(text: impl Into<String>) -> Self {
        debug!("CompletionRequest::prompt: called");
        Self {
            messages: vec![Message::user(text)],
            max_tokens: None,
            temperature: None,
        }
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Response from a completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Text content of the reply
    pub content: Option<String>,

    /// Why the model stopped generating
    pub stop_reason: StopReason,

    /// Token accounting reported by the provider
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// A finished text reply with no usage data
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }
}

/// Reason the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    ContentFilter,
}

impl StopReason {
    /// Map an Anthropic `stop_reason`
    pub fn from_anthropic(reason: &str) -> Self {
        debug!(%reason, "StopReason::from_anthropic: called");
        match reason {
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        }
    }

    /// Map an OpenAI `finish_reason`
    pub fn from_openai(reason: Option<&str>) -> Self {
        debug!(?reason, "StopReason::from_openai: called");
        match reason {
            Some("length") => StopReason::MaxTokens,
            Some("content_filter") => StopReason::ContentFilter,
            _ => StopReason::EndTurn,
        }
    }
}

/// Token usage for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Input plus output tokens
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}
