//! Structured-response parsing
//!
//! Turns free-text model output into typed records. A record type implements
//! [`StructuredResponse`] to describe its [`Schema`]; the [`StructuredParser`]
//! renders format instructions from that schema, validates replies against it,
//! and makes exactly one repair call to the model when the first reply does
//! not fit.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Result, TemplateError};
use crate::llm::LlmClient;
use crate::prompts::{self, PromptLoader, PromptSource};

mod extract;
mod schema;

pub use extract::extract_json;
pub use schema::{Field, FieldKind, Schema, ValidationError};

/// Name of the repair prompt
pub const FIX_PROMPT: &str = "fix";

/// A record type a step's response can be decoded into
pub trait StructuredResponse: DeserializeOwned + Send {
    /// Description of the fields the model must produce
    fn schema() -> Schema;
}

/// Validates and decodes responses for one record type
pub struct StructuredParser<T> {
    schema: Schema,
    instructions: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: StructuredResponse> Default for StructuredParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StructuredResponse> StructuredParser<T> {
    pub fn new() -> Self {
        let schema = T::schema();
        let instructions = format_instructions(&schema);
        Self {
            schema,
            instructions,
            _marker: PhantomData,
        }
    }

    /// Instruction fragment asking the model for this record's shape
    pub fn format_instructions(&self) -> &str {
        &self.instructions
    }

    /// Decode a response without any repair
    pub fn parse(&self, text: &str) -> std::result::Result<T, ValidationError> {
        debug!(schema = %self.schema.title, text_len = text.len(), "StructuredParser::parse: called");
        let value = extract_json(text)?;
        self.schema.validate(&value)?;
        serde_json::from_value(value).map_err(|e| ValidationError::Decode {
            schema: self.schema.title.clone(),
            message: e.to_string(),
        })
    }

    /// Decode a response, asking the model to fix it once if it does not fit
    ///
    /// Issues at most one extra model call. Fails with
    /// [`TemplateError::UnparsableResponse`] when the repaired reply is still
    /// invalid.
    pub async fn parse_or_repair(&self, llm: &dyn LlmClient, prompts: &PromptLoader, text: &str) -> Result<T> {
        let first_error = match self.parse(text) {
            Ok(record) => return Ok(record),
            Err(e) => e,
        };

        warn!(schema = %self.schema.title, error = %first_error, "Response did not match schema, requesting repair");
        let repair_prompt = self.repair_prompt(prompts, text, &first_error)?;
        let repaired = llm.predict(&repair_prompt).await?;

        match self.parse(&repaired) {
            Ok(record) => {
                info!(schema = %self.schema.title, "Repaired response parsed");
                Ok(record)
            }
            Err(e) => Err(TemplateError::UnparsableResponse {
                schema: self.schema.title.clone(),
                raw: repaired,
                error: e.to_string(),
            }),
        }
    }

    fn repair_prompt(&self, prompts: &PromptLoader, completion: &str, error: &ValidationError) -> Result<String> {
        let text = prompts.load(&PromptSource::from(FIX_PROMPT))?;
        let vars: BTreeMap<&str, Value> = BTreeMap::from([
            ("instructions", Value::String(self.instructions.clone())),
            ("completion", Value::String(completion.to_string())),
            ("error", Value::String(error.to_string())),
        ]);
        prompts::fill(FIX_PROMPT, &text, |name| vars.get(name))
    }
}

/// Render the instruction fragment for a schema
fn format_instructions(schema: &Schema) -> String {
    let rendered = serde_json::to_string(&schema.to_json_schema()).unwrap_or_default();
    format!(
        "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\n\
         As an example, for the schema {{\"properties\": {{\"foo\": {{\"description\": \"a list of strings\", \
         \"type\": \"array\", \"items\": {{\"type\": \"string\"}}}}}}, \"required\": [\"foo\"]}}\n\
         the object {{\"foo\": [\"bar\", \"baz\"]}} is a well-formatted instance of the schema. \
         The object {{\"properties\": {{\"foo\": [\"bar\", \"baz\"]}}}} is not well-formatted.\n\n\
         Here is the output schema:\n```\n{}\n```",
        rendered
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i64,
    }

    impl StructuredResponse for Point {
        fn schema() -> Schema {
            Schema::new("Point").required("x", FieldKind::Integer, "Horizontal position")
        }
    }

    #[test]
    fn test_round_trip() {
        let parser = StructuredParser::<Point>::new();
        let encoded = serde_json::to_string(&Point { x: 42 }).unwrap();
        assert_eq!(parser.parse(&encoded).unwrap(), Point { x: 42 });
    }

    #[test]
    fn test_format_instructions_embed_schema() {
        let parser = StructuredParser::<Point>::new();
        let instructions = parser.format_instructions();
        assert!(instructions.starts_with("The output should be formatted as a JSON instance"));
        assert!(instructions.contains(r#""title":"Point""#));
        assert!(instructions.contains(r#""required":["x"]"#));
        // Braces in the fragment must never read as placeholders
        assert!(prompts::extract_placeholders(instructions).is_empty());
    }

    #[test]
    fn test_parse_reports_validation_error() {
        let parser = StructuredParser::<Point>::new();
        let err = parser.parse(r#"{"x": "seven"}"#).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { .. }));
    }

    #[tokio::test]
    async fn test_valid_response_needs_no_model_call() {
        let llm = MockLlmClient::replying(&[]);
        let parser = StructuredParser::<Point>::new();

        let point = parser
            .parse_or_repair(&llm, &PromptLoader::embedded_only(), "```json\n{\"x\": 1}\n```")
            .await
            .unwrap();

        assert_eq!(point, Point { x: 1 });
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_repair_succeeds_on_second_attempt() {
        let llm = MockLlmClient::replying(&[r#"{"x": 5}"#]);
        let parser = StructuredParser::<Point>::new();

        let point = parser
            .parse_or_repair(&llm, &PromptLoader::embedded_only(), "x is five")
            .await
            .unwrap();

        assert_eq!(point, Point { x: 5 });
        assert_eq!(llm.call_count(), 1);

        let repair = &llm.prompts()[0];
        assert!(repair.contains("x is five"));
        assert!(repair.contains(&ValidationError::NoJson.to_string()));
        assert!(repair.contains(parser.format_instructions()));
    }

    #[tokio::test]
    async fn test_repair_failure_is_unparsable() {
        let llm = MockLlmClient::replying(&[r#"{"y": 5}"#]);
        let parser = StructuredParser::<Point>::new();

        let err = parser
            .parse_or_repair(&llm, &PromptLoader::embedded_only(), "nope")
            .await
            .unwrap_err();

        match err {
            TemplateError::UnparsableResponse { schema, raw, error } => {
                assert_eq!(schema, "Point");
                assert_eq!(raw, r#"{"y": 5}"#);
                assert_eq!(error, "missing required field 'x'");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(llm.call_count(), 1);
    }
}
