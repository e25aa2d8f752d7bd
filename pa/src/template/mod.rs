//! Template execution
//!
//! A template is a fixed sequence of prompt steps producing one artifact.
//! Concrete templates drive a [`TemplateEngine`], fold each step's result back
//! into its [`Memory`] and return the final step's rendered output.

use async_trait::async_trait;

use crate::error::Result;

mod engine;
mod memory;
mod registry;

pub use engine::TemplateEngine;
pub use memory::{FORMAT_INSTRUCTIONS_KEY, Memory, PERSONA_KEY, Variables};
pub use registry::{TemplateFactory, TemplateRegistry};

/// A runnable template
#[async_trait]
pub trait Template: Send {
    /// Name the template is registered under
    fn name(&self) -> &str;

    /// Execute every step and return the final artifact
    async fn run(&mut self) -> Result<String>;

    /// Engine driving this template
    fn engine(&self) -> &TemplateEngine;
}

/// A template type that can be registered by name
pub trait TemplateDefinition: Template + Sized + 'static {
    const NAME: &'static str;

    /// Wrap a prepared engine
    fn create(engine: TemplateEngine) -> Self;
}
