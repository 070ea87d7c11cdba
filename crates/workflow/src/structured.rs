//! Structured model output
//!
//! Text stages that ask for JSON get it back fenced, unfenced, or wrapped
//! in prose. Everything here reduces a reply to one JSON object or fails.

use contracts::{ContractError, Stage};
use serde_json::{Map, Value};

const FENCE: &str = "```";
const EXCERPT_CHARS: usize = 80;

/// Remove a surrounding markdown code fence (with optional language tag)
///
/// Text without a leading fence is returned trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };

    // Language tag runs to the end of the opening line
    let body = match rest.split_once('\n') {
        Some((tag, body)) if is_language_tag(tag) => body,
        _ => rest,
    };
    body.trim_end()
        .strip_suffix(FENCE)
        .unwrap_or(body)
        .trim()
}

fn is_language_tag(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Parse a reply into a JSON object
///
/// Tries the fence-stripped text first, then the outermost `{...}` span.
pub fn parse_object(stage: Stage, text: &str) -> Result<Map<String, Value>, ContractError> {
    let inner = strip_code_fence(text);
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(inner) {
        return Ok(map);
    }

    if let Some(span) = outermost_braces(inner) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(span) {
            return Ok(map);
        }
    }

    Err(ContractError::malformed(
        stage.as_str(),
        format!("expected a JSON object, got: {}", excerpt(inner)),
    ))
}

fn outermost_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn excerpt(text: &str) -> String {
    if text.is_empty() {
        return "<empty>".to_string();
    }
    let mut out: String = text.chars().take(EXCERPT_CHARS).collect();
    if text.chars().count() > EXCERPT_CHARS {
        out.push_str("...");
    }
    out
}
