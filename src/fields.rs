//! Cleanup and parsing of the model's raw answer.
//!
//! Vision models asked for a JSON object still sometimes wrap it in a
//! Markdown code fence. The fence and an optional `json` language tag are
//! removed before parsing.

use crate::{Error, Result};
use serde_json::Value;

const FENCE: &str = "```";
const LANGUAGE_TAG: &str = "json";

/// Return the JSON candidate inside `raw`.
///
/// When a fence is present the segment between the first two fences wins;
/// an empty segment falls back to the whole text.
pub fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();
    if !text.contains(FENCE) {
        return text;
    }

    let inner = text
        .split(FENCE)
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .unwrap_or(text);
    let inner = inner.strip_prefix(LANGUAGE_TAG).unwrap_or(inner);
    inner.trim()
}

/// Parse the model's answer into the extracted document fields.
pub fn parse_fields(raw: &str) -> Result<Value> {
    let candidate = strip_code_fences(raw);
    serde_json::from_str(candidate).map_err(|e| {
        tracing::error!(
            "Model returned invalid JSON ({} chars): {}",
            candidate.len(),
            e
        );
        Error::InvalidModelOutput(e)
    })
}
