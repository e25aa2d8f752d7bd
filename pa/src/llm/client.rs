//! LlmClient trait definition

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{CompletionRequest, CompletionResponse, LlmError, StopReason};

/// Stateless LLM client - each call is independent (fresh context)
///
/// Template steps talk to the model through [`LlmClient::predict`]: filled
/// prompt text in, completion text out. Retries for transient transport
/// failures live inside the implementations, never in the caller.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Send one prompt and return the reply text
    async fn predict(&self, prompt: &str) -> Result<String, LlmError> {
        debug!(prompt_len = prompt.len(), "LlmClient::predict: called");
        let response = self.complete(CompletionRequest::prompt(prompt)).await?;

        if response.stop_reason == StopReason::MaxTokens {
            warn!(
                output_tokens = response.usage.output_tokens,
                "predict: response truncated at max tokens"
            );
        }

        response
            .content
            .ok_or_else(|| LlmError::InvalidResponse("completion contained no text".to_string()))
    }
}
