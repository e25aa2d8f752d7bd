//! JSON extraction from free-form model output
//!
//! Models often wrap JSON in prose or markdown fences. Candidates are tried in
//! order of likelihood and the first one that parses wins.

use serde_json::Value;
use tracing::debug;

use super::ValidationError;

/// Extract the JSON value a response most likely contains
pub fn extract_json(text: &str) -> Result<Value, ValidationError> {
    debug!(text_len = text.len(), "extract_json: called");
    let mut first_error = None;

    for candidate in gather_json_candidates(text) {
        match serde_json::from_str::<Value>(&candidate) {
            Ok(value) => return Ok(value),
            Err(e) => {
                if first_error.is_none() && (candidate.starts_with('{') || candidate.starts_with('[')) {
                    first_error = Some(e.to_string());
                }
            }
        }
    }

    match first_error {
        Some(message) => Err(ValidationError::InvalidJson(message)),
        None => Err(ValidationError::NoJson),
    }
}

/// Gather candidate JSON strings from model output, ordered by likelihood.
fn gather_json_candidates(text: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    let trimmed = text.trim();

    // 1. Direct: entire response is JSON
    candidates.push(trimmed.to_string());

    // 2. Inside ``` fences, with or without a language tag
    let mut search = text;
    while let Some(start) = search.find("```") {
        let after = &search[start + 3..];
        let body_start = after.find('\n').map_or(0, |i| i + 1);
        let body = &after[body_start..];
        let Some(end) = body.find("```") else { break };
        candidates.push(body[..end].trim().to_string());
        search = &body[end + 3..];
    }

    // 3. Balanced brace extraction starting from first `{`
    if let Some(balanced) = extract_balanced_braces(text) {
        candidates.push(balanced);
    }

    // 4. First `{` to last `}`
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}'))
        && start < end
    {
        candidates.push(text[start..=end].to_string());
    }

    candidates
}

/// Extract the first balanced `{...}` block from text.
fn extract_balanced_braces(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        if ch == '\\' && in_string {
            escape_next = true;
            continue;
        }
        if ch == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..=start + i].to_string());
                }
            }
            _ => {}
        }
    }
    None
}
