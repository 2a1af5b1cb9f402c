//! Extraction of JSON embedded in free-form model output.
//!
//! Models wrap JSON in prose or code fences even when asked not to. The
//! extractor prefers the body of the first fenced code block, then scans for
//! the first `{` or `[` that starts a complete JSON value. Values are parsed
//! with `serde_json`'s streaming deserializer, which stops at the end of the
//! value and ignores trailing text.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::GeminiError;

/// Maximum number of opening brackets tried before giving up.
const MAX_START_ATTEMPTS: usize = 32;

const PREVIEW_CHARS: usize = 120;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n(.*?)```").expect("valid regex")
});

/// Body of the first fenced code block in `text`, if any.
#[must_use]
pub fn fenced_block(text: &str) -> Option<&str> {
    CODE_FENCE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

/// Parses the first JSON object or array found in `text`.
///
/// # Errors
///
/// Returns [`GeminiError::MalformedResponse`] when the text is empty or no
/// opening bracket starts a valid JSON object or array.
pub fn extract_json(text: &str) -> Result<Value, GeminiError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GeminiError::MalformedResponse("empty response".to_string()));
    }

    if let Some(value) = fenced_block(trimmed).and_then(first_value) {
        return Ok(value);
    }
    if let Some(value) = first_value(trimmed) {
        return Ok(value);
    }

    tracing::debug!("no parseable JSON value in model output");
    Err(GeminiError::MalformedResponse(format!(
        "no JSON object or array in: {}",
        preview(trimmed)
    )))
}

fn first_value(text: &str) -> Option<Value> {
    text.char_indices()
        .filter(|(_, c)| *c == '{' || *c == '[')
        .map(|(i, _)| i)
        .take(MAX_START_ATTEMPTS)
        .find_map(|start| {
            let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
            match stream.next() {
                Some(Ok(value)) if value.is_object() || value.is_array() => Some(value),
                _ => None,
            }
        })
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}
