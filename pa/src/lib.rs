//! promptauthor - multi-step LLM prompt templates
//!
//! A template is a fixed sequence of prompt steps. Each step fills a prompt
//! file from the run's memory, sends it to a chat model, and optionally
//! decodes the reply into a typed record; the template folds results back
//! into memory so later steps can build on them.
//!
//! # Modules
//!
//! - [`template`] - Execution engine, run memory and template catalog
//! - [`templates`] - Built-in templates (`medium_blog_post`, `prompt_file`)
//! - [`parser`] - Structured-response validation with one repair attempt
//! - [`prompts`] - Prompt loading and placeholder filling
//! - [`llm`] - LLM client trait with OpenAI, Azure and Anthropic implementations
//! - [`persona`] - Personas injected into every prompt
//! - [`config`] - Configuration types and loading
//! - [`runner`] - Assembles a configured run
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod parser;
pub mod persona;
pub mod prompts;
pub mod runner;
pub mod template;
pub mod templates;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use error::{Result, TemplateError};
pub use llm::{
    AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient, create_client,
};
pub use parser::{FieldKind, Schema, StructuredParser, StructuredResponse};
pub use persona::Persona;
pub use prompts::{PromptLoader, PromptSource};
pub use template::{Memory, Template, TemplateDefinition, TemplateEngine, TemplateRegistry, Variables};
