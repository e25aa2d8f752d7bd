//! Integration tests for promptauthor
//!
//! These drive whole template runs through the public API with a scripted
//! model client.

use std::fs;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use promptauthor::config::Config;
use promptauthor::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use promptauthor::runner;
use promptauthor::template::TemplateRegistry;
use promptauthor::{Persona, TemplateError};
use tempfile::TempDir;

/// Replays canned replies and records the prompts it receives
struct ScriptedClient {
    replies: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(replies: &[&str]) -> Arc<Self> {
        let mut replies: Vec<String> = replies.iter().map(|r| r.to_string()).collect();
        replies.reverse();
        Arc::new(Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut prompts = self.prompts.lock().unwrap();
        prompts.extend(request.messages.into_iter().map(|m| m.content));
        self.replies
            .lock()
            .unwrap()
            .pop()
            .map(|reply| CompletionResponse::text(reply))
            .ok_or_else(|| LlmError::InvalidResponse("script exhausted".to_string()))
    }
}

fn config(yaml: &str) -> Config {
    Config::parse(yaml).expect("Failed to parse config")
}

// =============================================================================
// medium_blog_post
// =============================================================================

const BLOG_REPLIES: [&str; 6] = [
    r#"{"titles": ["Rust Errors Without Tears", "Result All The Way Down"]}"#,
    "Rust Errors Without Tears",
    r#"{"sections": [{"title": "Why", "content": "Panics hurt."}, {"title": "How", "content": "Use Result."}]}"#,
    r#"{"content": "Learn to love the question mark."}"#,
    r#"{"examples": [{"title": "Parsing", "content": "let n: u32 = s.parse()?;"}]}"#,
    r#"{"title": "Rust Errors Without Tears", "abstract": "Learn to love the question mark.", "sections": [{"title": "Why", "content": "Panics hurt."}]}"#,
];

#[tokio::test]
async fn test_medium_blog_post_end_to_end() {
    let llm = ScriptedClient::new(&BLOG_REPLIES);
    let config = config(
        "template: medium_blog_post\npersona: software-engineer\nprompts:\n  paths: []\ntopic: Rust error handling\n",
    );

    let output = runner::execute(&config, &TemplateRegistry::builtin(), llm.clone(), false)
        .await
        .expect("run should succeed");

    assert_eq!(
        output,
        "# Rust Errors Without Tears\n\n> Learn to love the question mark.\n\n## Why\n\nPanics hurt."
    );

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 6);
    assert!(prompts[0].contains("Rust error handling"));
    assert!(prompts[0].contains("You are a senior software engineer."));
    assert!(prompts[4].contains("Learn to love the question mark."));
    assert!(prompts[5].contains("let n: u32 = s.parse()?;"));
}

#[tokio::test]
async fn test_prompt_override_directory() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("medium_blog_post")).unwrap();
    fs::write(
        dir.path().join("medium_blog_post/select_title.md"),
        "Choose one of {title_suggestions} for {topic}.",
    )
    .unwrap();

    let llm = ScriptedClient::new(&BLOG_REPLIES);
    let yaml = format!(
        "template: medium_blog_post\nprompts:\n  paths: [\"{}\"]\ntopic: errors\n",
        dir.path().display()
    );

    runner::execute(&config(&yaml), &TemplateRegistry::builtin(), llm.clone(), false)
        .await
        .expect("run should succeed");

    assert_eq!(
        llm.prompts()[1],
        r#"Choose one of ["Rust Errors Without Tears","Result All The Way Down"] for errors."#
    );
}

#[tokio::test]
async fn test_repair_then_unparsable() {
    let llm = ScriptedClient::new(&["Here are some titles: A, B", "Still no JSON"]);
    let config = config("template: medium_blog_post\ntopic: bees\n");

    let err = runner::execute(&config, &TemplateRegistry::builtin(), llm.clone(), false)
        .await
        .unwrap_err();

    match err.downcast_ref::<TemplateError>() {
        Some(TemplateError::UnparsableResponse { schema, raw, .. }) => {
            assert_eq!(schema, "TitleSuggestions");
            assert_eq!(raw, "Still no JSON");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("Here are some titles: A, B"));
    assert!(prompts[1].contains("no JSON object found in the response"));
}

// =============================================================================
// prompt_file
// =============================================================================

#[tokio::test]
async fn test_prompt_file_with_inline_persona() {
    let dir = TempDir::new().unwrap();
    let prompt = dir.path().join("haiku.md");
    fs::write(&prompt, "{persona}\n\nWrite a haiku about {topic}. Use {\"json\": \"braces\"} freely.").unwrap();

    let llm = ScriptedClient::new(&["Buzzing in the sun"]);
    let yaml = format!(
        "template: prompt_file\npersona:\n  name: X\n  description: Y\nprompt_file: \"{}\"\ntopic: bees\n",
        prompt.display()
    );

    let output = runner::execute(&config(&yaml), &TemplateRegistry::builtin(), llm.clone(), false)
        .await
        .expect("run should succeed");

    assert_eq!(output, "Buzzing in the sun");
    let expected = format!(
        "{}\n\nWrite a haiku about bees. Use {{\"json\": \"braces\"}} freely.",
        Persona::new("X", "Y").render()
    );
    assert_eq!(llm.prompts(), vec![expected]);
}

#[tokio::test]
async fn test_unknown_template_lists_builtin_names() {
    let llm = ScriptedClient::new(&[]);
    let config = config("template: sonnet\n");

    let err = runner::execute(&config, &TemplateRegistry::builtin(), llm, false)
        .await
        .unwrap_err();

    assert_eq!(err.downcast_ref::<TemplateError>().map(TemplateError::kind), Some("TemplateNotFound"));
    assert!(err.to_string().contains("medium_blog_post, prompt_file"));
}
