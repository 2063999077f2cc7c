//! Pulls the JSON object out of a model reply, tolerating ```json fences.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::TraceError;

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)```").expect("fence pattern compiles"));

/// Parse the model reply: raw JSON first, then the first fenced block.
pub fn extract_json(text: &str) -> Result<Value, TraceError> {
    let text = text.trim();
    if let Ok(v) = serde_json::from_str::<Value>(text) {
        return Ok(v);
    }

    let inner = FENCED_BLOCK
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .ok_or(TraceError::UnparseableOutput)?;

    serde_json::from_str(inner).map_err(|e| {
        tracing::debug!("fenced block is not JSON: {}", e);
        TraceError::UnparseableOutput
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_json_with_whitespace() {
        let v = extract_json("  \n{\"stimulus\": \"x\"}\n ").unwrap();
        assert_eq!(v["stimulus"], "x");
    }

    #[test]
    fn json_fence() {
        let reply = "Here you go:\n```json\n{\"steps\": []}\n```\nEnjoy.";
        let v = extract_json(reply).unwrap();
        assert!(v["steps"].as_array().unwrap().is_empty());
    }

    #[test]
    fn bare_fence() {
        let v = extract_json("```\n{\"a\": 1}\n```").unwrap();
        assert_eq!(v["a"], 1);
    }

    #[test]
    fn prose_is_rejected() {
        assert!(matches!(
            extract_json("The signal travels from the toe to the brain."),
            Err(TraceError::UnparseableOutput)
        ));
    }

    #[test]
    fn broken_fence_contents_are_rejected() {
        assert!(matches!(
            extract_json("```json\n{not json}\n```"),
            Err(TraceError::UnparseableOutput)
        ));
    }
}
