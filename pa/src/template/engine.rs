//! Template execution engine
//!
//! Owns one run's [`Memory`] and exposes the step primitive concrete templates
//! are built from: fill a prompt, call the model, optionally parse the reply.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use super::memory::{FORMAT_INSTRUCTIONS_KEY, Memory, PERSONA_KEY, Variables};
use crate::error::Result;
use crate::llm::LlmClient;
use crate::parser::{StructuredParser, StructuredResponse};
use crate::persona::Persona;
use crate::prompts::{self, PromptLoader, PromptSource};

/// Executes the steps of one template run
pub struct TemplateEngine {
    llm: Arc<dyn LlmClient>,
    persona: Persona,
    prompts: PromptLoader,
    memory: Memory,
    verbose: bool,
}

impl TemplateEngine {
    /// Create an engine whose memory starts with `seed` plus the rendered persona
    ///
    /// A seed value under the reserved `persona` key is replaced.
    pub fn new(llm: Arc<dyn LlmClient>, persona: Persona, prompts: PromptLoader, seed: Variables) -> Self {
        debug!(persona = %persona.name, seed_keys = seed.len(), "TemplateEngine::new: called");
        let mut memory = Memory::from(seed);
        memory.insert(PERSONA_KEY, persona.render());

        Self {
            llm,
            persona,
            prompts,
            memory,
            verbose: false,
        }
    }

    /// Log every filled prompt and raw response
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn prompts(&self) -> &PromptLoader {
        &self.prompts
    }

    /// Store a step result for later steps
    pub fn remember(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.memory.insert(key, value);
    }

    /// Run an unstructured step and return the raw response
    pub async fn step(&self, prompt: impl Into<PromptSource>) -> Result<String> {
        self.step_with(prompt, &Variables::new()).await
    }

    /// Run an unstructured step with step-local parameters
    ///
    /// Parameters shadow memory values of the same name for this step only.
    pub async fn step_with(&self, prompt: impl Into<PromptSource>, params: &Variables) -> Result<String> {
        self.call(&prompt.into(), None, params).await
    }

    /// Run a step whose response is decoded into `T`
    pub async fn step_as<T: StructuredResponse>(&self, prompt: impl Into<PromptSource>) -> Result<T> {
        self.step_as_with(prompt, &Variables::new()).await
    }

    /// Run a structured step with step-local parameters
    pub async fn step_as_with<T: StructuredResponse>(
        &self,
        prompt: impl Into<PromptSource>,
        params: &Variables,
    ) -> Result<T> {
        let parser = StructuredParser::<T>::new();
        let raw = self
            .call(&prompt.into(), Some(parser.format_instructions()), params)
            .await?;
        parser.parse_or_repair(self.llm.as_ref(), &self.prompts, &raw).await
    }

    /// Fill the prompt, send it, and return the raw response
    async fn call(&self, source: &PromptSource, instructions: Option<&str>, params: &Variables) -> Result<String> {
        debug!(%source, structured = instructions.is_some(), "TemplateEngine::call: called");
        let mut text = self.prompts.load(source)?;
        if instructions.is_some() {
            text.push_str("\n\n{");
            text.push_str(FORMAT_INSTRUCTIONS_KEY);
            text.push('}');
        }

        let format_instructions = Value::String(instructions.unwrap_or_default().to_string());
        let filled = prompts::fill(&source.to_string(), &text, |name| {
            if name == FORMAT_INSTRUCTIONS_KEY {
                Some(&format_instructions)
            } else {
                params.get(name).or_else(|| self.memory.get(name))
            }
        })?;

        if self.verbose {
            info!("Prompt ({}):\n{}", source, filled);
        }

        let response = self.llm.predict(&filled).await?;

        if self.verbose {
            info!("Response ({}):\n{}", source, response);
        }
        Ok(response)
    }
}
