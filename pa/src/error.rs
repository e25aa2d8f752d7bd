//! Error types for template runs.
//!
//! Every failure aborts the current run and is surfaced verbatim to the
//! caller. The only built-in recovery is the single repair pass the
//! structured-response parser makes before giving up with
//! [`TemplateError::UnparsableResponse`].

use thiserror::Error;

use crate::llm::LlmError;

/// Main error type for template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A prompt source does not exist or could not be read.
    #[error("Prompt '{source_id}' not found: {reason}")]
    ResourceNotFound { source_id: String, reason: String },

    /// A placeholder has no binding in memory, step parameters, or reserved keys.
    #[error("Prompt '{prompt}' references '{{{name}}}' but no value is bound to it")]
    MissingVariable { name: String, prompt: String },

    /// Structured decode failed even after the repair attempt.
    #[error("Response could not be parsed as {schema} after one repair attempt: {error}\n--- last response ---\n{raw}")]
    UnparsableResponse { schema: String, raw: String, error: String },

    /// No template is registered under the requested name.
    #[error("Template '{name}' not found. Available templates: {}", available.join(", "))]
    TemplateNotFound { name: String, available: Vec<String> },

    /// The model-calling capability failed.
    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),
}

impl TemplateError {
    /// Stable name of the failure kind, for operator-facing output
    pub fn kind(&self) -> &'static str {
        match self {
            TemplateError::ResourceNotFound { .. } => "ResourceNotFound",
            TemplateError::MissingVariable { .. } => "MissingVariable",
            TemplateError::UnparsableResponse { .. } => "UnparsableResponse",
            TemplateError::TemplateNotFound { .. } => "TemplateNotFound",
            TemplateError::Llm(_) => "LlmError",
        }
    }
}

/// Result type alias for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;
