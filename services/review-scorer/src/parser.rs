//! Turns the model's free-text answer into the id → prediction map.
//!
//! Values are returned exactly as parsed; interpretation happens in scoring.

use serde_json::{Map, Value};
use thiserror::Error;

pub type Predictions = Map<String, Value>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("answer is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("answer is JSON but not an object")]
    NotAnObject,
}

/// Parse an answer that must be a JSON object keyed by review id.
///
/// With `relaxed`, an answer wrapped in Markdown code fences or surrounded by
/// prose is accepted as long as it contains a balanced `{...}` block.
pub fn parse_predictions(text: &str, relaxed: bool) -> Result<Predictions, ParseError> {
    let err = match serde_json::from_str::<Value>(text) {
        Ok(value) => return into_object(value),
        Err(e) => e,
    };
    if !relaxed {
        return Err(err.into());
    }

    let unfenced = strip_code_fences(text.trim());
    if let Ok(value) = serde_json::from_str::<Value>(unfenced) {
        return into_object(value);
    }
    match first_balanced_object(unfenced) {
        Some(block) => into_object(serde_json::from_str(block)?),
        None => Err(err.into()),
    }
}

fn into_object(value: Value) -> Result<Predictions, ParseError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::NotAnObject),
    }
}

fn strip_code_fences(s: &str) -> &str {
    let s = s
        .strip_prefix("```json")
        .or_else(|| s.strip_prefix("```"))
        .unwrap_or(s);
    s.strip_suffix("```").unwrap_or(s).trim()
}

/// First `{...}` block whose braces balance, ignoring braces inside strings.
fn first_balanced_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_str = false;
    let mut esc = false;

    for (i, ch) in s[start..].char_indices() {
        if in_str {
            if esc {
                esc = false;
            } else if ch == '\\' {
                esc = true;
            } else if ch == '"' {
                in_str = false;
            }
            continue;
        }
        match ch {
            '"' => in_str = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}
