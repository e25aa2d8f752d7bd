//! Placeholder extraction and prompt filling
//!
//! Placeholders are bare identifiers in single braces: `{topic}`, `{ title }`.
//! Anything else in braces (`{}`, `{"json": 1}`, `{a.b}`) is literal text and
//! passes through untouched. Filling is single-pass, so braces inside a
//! substituted value are never treated as placeholders.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, TemplateError};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*(\w+)\s*\}").expect("placeholder pattern is valid"));

/// Distinct placeholder names in order of first appearance
pub fn extract_placeholders(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let names: Vec<String> = PLACEHOLDER
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect();
    debug!(?names, "extract_placeholders: found");
    names
}

/// Render a bound value as prompt text
///
/// Strings are inserted verbatim, `null` as nothing, anything else as compact JSON.
pub fn render_value(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Substitute every placeholder in `text` using `lookup`
///
/// Fails with [`TemplateError::MissingVariable`] on the first placeholder
/// (in order of appearance) that `lookup` cannot bind. `prompt_id` only
/// labels the error.
pub fn fill<'a, F>(prompt_id: &str, text: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<&'a Value>,
{
    debug!(%prompt_id, text_len = text.len(), "fill: called");
    let names = extract_placeholders(text);

    if let Some(missing) = names.iter().find(|name| lookup(name).is_none()) {
        debug!(%prompt_id, %missing, "fill: unbound placeholder");
        return Err(TemplateError::MissingVariable {
            name: missing.clone(),
            prompt: prompt_id.to_string(),
        });
    }

    let filled = PLACEHOLDER.replace_all(text, |caps: &Captures| {
        lookup(&caps[1]).map(|v| render_value(v).into_owned()).unwrap_or_default()
    });
    Ok(filled.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn pool(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_extract_simple() {
        assert_eq!(extract_placeholders("Tell me about {topic}."), vec!["topic"]);
    }

    #[test]
    fn test_extract_whitespace_inside_braces() {
        assert_eq!(extract_placeholders("{ a }{\tb\n}"), vec!["a", "b"]);
    }

    #[test]
    fn test_extract_is_distinct_and_ordered() {
        assert_eq!(extract_placeholders("{b} {a} {b} {a} {c}"), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_extract_ignores_malformed() {
        let text = r#"{} { } {"key": 1} {a.b} {a b} {ok}"#;
        assert_eq!(extract_placeholders(text), vec!["ok"]);
    }

    #[test]
    fn test_fill_substitutes_values() {
        let vars = pool(&[("name", json!("Alice")), ("greeting", json!("Hello"))]);
        let filled = fill("greet", "{greeting}, { name }!", |k| vars.get(k)).unwrap();
        assert_eq!(filled, "Hello, Alice!");
    }

    #[test]
    fn test_fill_leaves_malformed_braces() {
        let vars = pool(&[("x", json!("X"))]);
        let filled = fill("p", "{} {x} {\"k\": 2}", |k| vars.get(k)).unwrap();
        assert_eq!(filled, "{} X {\"k\": 2}");
    }

    #[test]
    fn test_fill_ignores_extra_pool_keys() {
        let vars = pool(&[("x", json!("X")), ("unused", json!("U"))]);
        assert_eq!(fill("p", "{x}", |k| vars.get(k)).unwrap(), "X");
    }

    #[test]
    fn test_fill_missing_variable() {
        let vars = pool(&[("a", json!("A"))]);
        let err = fill("outline", "{a} {b} {c}", |k| vars.get(k)).unwrap_err();
        match err {
            TemplateError::MissingVariable { name, prompt } => {
                assert_eq!(name, "b");
                assert_eq!(prompt, "outline");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_fill_does_not_reinterpret_values() {
        let vars = pool(&[("code", json!("fn main() { {other} }")), ("other", json!("nope"))]);
        let filled = fill("p", "Code: {code}", |k| vars.get(k)).unwrap();
        assert_eq!(filled, "Code: fn main() { {other} }");
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("text")), "text");
        assert_eq!(render_value(&json!(null)), "");
        assert_eq!(render_value(&json!(3)), "3");
        assert_eq!(render_value(&json!(["a", "b"])), r#"["a","b"]"#);
        assert_eq!(render_value(&json!({"k": true})), r#"{"k":true}"#);
    }

    proptest! {
        #[test]
        fn prop_extract_finds_exactly_the_placeholders(
            prefix in "[^{}]*",
            middle in "[^{}]*",
            suffix in "[^{}]*",
            pad_a in "[ \t]{0,3}",
            pad_b in "[ \t]{0,3}",
        ) {
            let text = format!("{prefix}{{{pad_a}a{pad_a}}}{middle}{{{pad_b}b{pad_b}}}{suffix}");
            prop_assert_eq!(extract_placeholders(&text), vec!["a".to_string(), "b".to_string()]);
        }

        #[test]
        fn prop_text_without_braces_fills_to_itself(text in "[^{}]*") {
            let vars: BTreeMap<String, Value> = BTreeMap::new();
            prop_assert_eq!(fill("p", &text, |k| vars.get(k)).unwrap(), text);
        }
    }
}
