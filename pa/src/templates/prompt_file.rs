//! Single-prompt template
//!
//! Runs the prompt file named by the `prompt_file` variable once and returns
//! the raw response. Every other variable is available to the prompt.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::error::{Result, TemplateError};
use crate::template::{Template, TemplateDefinition, TemplateEngine};

/// Variable holding the prompt's path
pub const PROMPT_FILE_KEY: &str = "prompt_file";

pub struct PromptFile {
    engine: TemplateEngine,
}

impl TemplateDefinition for PromptFile {
    const NAME: &'static str = "prompt_file";

    fn create(engine: TemplateEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Template for PromptFile {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&mut self) -> Result<String> {
        let path = self
            .engine
            .memory()
            .get_str(PROMPT_FILE_KEY)
            .map(PathBuf::from)
            .ok_or_else(|| TemplateError::MissingVariable {
                name: PROMPT_FILE_KEY.to_string(),
                prompt: Self::NAME.to_string(),
            })?;

        info!("Running prompt file {}", path.display());
        self.engine.step(path).await
    }

    fn engine(&self) -> &TemplateEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;
    use crate::persona::Persona;
    use crate::prompts::PromptLoader;
    use crate::template::Variables;
    use serde_json::json;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn template(llm: Arc<MockLlmClient>, seed: Variables) -> PromptFile {
        PromptFile::create(TemplateEngine::new(
            llm,
            Persona::new("X", "Y"),
            PromptLoader::embedded_only(),
            seed,
        ))
    }

    #[tokio::test]
    async fn test_runs_prompt_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ask.md");
        fs::write(&path, "{persona}\n\nTell me about {topic}.\n").unwrap();

        let llm = Arc::new(MockLlmClient::replying(&["Bees are insects."]));
        let seed = Variables::from([
            (PROMPT_FILE_KEY.to_string(), json!(path.display().to_string())),
            ("topic".to_string(), json!("bees")),
        ]);
        let mut template = template(llm.clone(), seed);

        assert_eq!(template.run().await.unwrap(), "Bees are insects.");
        let sent = &llm.prompts()[0];
        assert!(sent.ends_with("\n\nTell me about bees."));
        assert!(sent.contains("<persona>You are X. Y</persona>"));
    }

    #[tokio::test]
    async fn test_requires_prompt_file_variable() {
        let llm = Arc::new(MockLlmClient::replying(&[]));
        let mut template = template(llm, Variables::new());

        let err = template.run().await.unwrap_err();
        assert!(matches!(err, TemplateError::MissingVariable { ref name, .. } if name == PROMPT_FILE_KEY));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let llm = Arc::new(MockLlmClient::replying(&[]));
        let seed = Variables::from([(PROMPT_FILE_KEY.to_string(), json!("/no/such/prompt.md"))]);
        let mut template = template(llm.clone(), seed);

        let err = template.run().await.unwrap_err();
        assert_eq!(err.kind(), "ResourceNotFound");
        assert_eq!(llm.call_count(), 0);
    }
}
