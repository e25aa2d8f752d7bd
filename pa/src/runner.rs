//! Run assembly
//!
//! Wires a loaded [`Config`] into a ready-to-run template: resolve the
//! persona, build the prompt loader, seed the engine, look up the template.

use std::sync::Arc;

use eyre::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::llm::{LlmClient, create_client};
use crate::prompts::PromptLoader;
use crate::template::{Template, TemplateEngine, TemplateRegistry};

/// Build the template a config describes around `llm`
pub fn prepare(
    config: &Config,
    registry: &TemplateRegistry,
    llm: Arc<dyn LlmClient>,
    verbose: bool,
) -> Result<Box<dyn Template>> {
    debug!(template = %config.template, verbose, "prepare: called");
    let persona = config.persona.resolve()?;
    let prompts = PromptLoader::new(config.prompts.expanded_paths());
    let engine = TemplateEngine::new(llm, persona, prompts, config.memory_seed()).verbose(verbose);
    Ok(registry.instantiate(&config.template, engine)?)
}

/// Run the configured template against the configured provider
pub async fn run(config: &Config, registry: &TemplateRegistry, verbose: bool) -> Result<String> {
    debug!(template = %config.template, "run: called");
    // Unknown templates fail before any client is built
    registry.resolve(&config.template)?;

    let llm = create_client(&config.llm, config.model.temperature).context("Failed to create LLM client")?;
    execute(config, registry, llm, verbose).await
}

/// Run the configured template against an existing client
pub async fn execute(
    config: &Config,
    registry: &TemplateRegistry,
    llm: Arc<dyn LlmClient>,
    verbose: bool,
) -> Result<String> {
    let mut template = prepare(config, registry, llm, verbose)?;
    info!(template = %template.name(), "Running template");
    let output = template.run().await?;
    info!(template = %template.name(), output_len = output.len(), "Template finished");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result as TemplateResult, TemplateError};
    use crate::llm::client::mock::MockLlmClient;
    use crate::persona::Persona;
    use crate::template::{PERSONA_KEY, TemplateDefinition};
    use async_trait::async_trait;
    use std::fs;
    use tempfile::TempDir;

    /// One step over `{dir}/t/ask.md`
    struct Ask {
        engine: TemplateEngine,
    }

    impl TemplateDefinition for Ask {
        const NAME: &'static str = "t";

        fn create(engine: TemplateEngine) -> Self {
            Self { engine }
        }
    }

    #[async_trait]
    impl Template for Ask {
        fn name(&self) -> &str {
            Self::NAME
        }

        async fn run(&mut self) -> TemplateResult<String> {
            self.engine.step("t/ask").await
        }

        fn engine(&self) -> &TemplateEngine {
            &self.engine
        }
    }

    fn setup() -> (TempDir, Config, TemplateRegistry) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("t")).unwrap();
        fs::write(dir.path().join("t/ask.md"), "Tell me about {topic}.").unwrap();

        let yaml = format!(
            "template: t\npersona:\n  name: X\n  description: Y\nprompts:\n  paths: [\"{}\"]\ntopic: bees\n",
            dir.path().display()
        );
        let config = Config::parse(&yaml).unwrap();

        let mut registry = TemplateRegistry::new();
        registry.register_type::<Ask>();
        (dir, config, registry)
    }

    #[tokio::test]
    async fn test_end_to_end_single_step() {
        let (_dir, config, registry) = setup();
        let llm = Arc::new(MockLlmClient::replying(&["Bees make honey."]));

        let mut template = prepare(&config, &registry, llm.clone(), false).unwrap();
        let output = template.run().await.unwrap();

        assert_eq!(output, "Bees make honey.");
        assert_eq!(llm.prompts(), vec!["Tell me about bees.".to_string()]);

        let memory = template.engine().memory();
        assert_eq!(memory.get_str("topic"), Some("bees"));
        assert_eq!(memory.get_str(PERSONA_KEY), Some(Persona::new("X", "Y").render().as_str()));
    }

    #[tokio::test]
    async fn test_execute_returns_output() {
        let (_dir, config, registry) = setup();
        let llm = Arc::new(MockLlmClient::replying(&["Bees make honey."]));

        let output = execute(&config, &registry, llm, true).await.unwrap();
        assert_eq!(output, "Bees make honey.");
    }

    #[tokio::test]
    async fn test_unknown_template_fails_before_client() {
        let (_dir, mut config, registry) = setup();
        config.template = "haiku".to_string();
        // Provider is never consulted
        config.llm.provider = "nonexistent".to_string();

        let err = run(&config, &registry, false).await.unwrap_err();
        let template_err = err.downcast_ref::<TemplateError>().unwrap();
        assert_eq!(template_err.kind(), "TemplateNotFound");
        assert!(err.to_string().contains("Available templates: t"));
    }

    #[tokio::test]
    async fn test_template_errors_stay_downcastable() {
        let (_dir, mut config, registry) = setup();
        config.extra.clear();
        let llm = Arc::new(MockLlmClient::replying(&[]));

        let err = execute(&config, &registry, llm, false).await.unwrap_err();
        let template_err = err.downcast_ref::<TemplateError>().unwrap();
        assert_eq!(template_err.kind(), "MissingVariable");
    }
}
