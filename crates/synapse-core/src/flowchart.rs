//! Mermaid flowchart extraction.

use serde_json::Value;

/// Every flowchart must open with a top-down graph declaration.
pub const FLOWCHART_HEADER: &str = "graph TD";

/// Shown when the reply carries no usable flowchart.
pub const FALLBACK_FLOWCHART: &str = "graph TD\n  A[No data] --> B[Error]";

/// The reply's flowchart, with literal `\n` escapes turned into newlines.
pub fn extract_mermaid_chart(result: &Value) -> String {
    match result.get("mermaid_flowchart").and_then(Value::as_str) {
        Some(chart) => chart.replace("\\n", "\n"),
        None => FALLBACK_FLOWCHART.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escaped_newlines_are_expanded() {
        let v = json!({"mermaid_flowchart": "graph TD\\n  A[Toe] --> B[Spinal cord]"});
        assert_eq!(extract_mermaid_chart(&v), "graph TD\n  A[Toe] --> B[Spinal cord]");
    }

    #[test]
    fn real_newlines_untouched() {
        let v = json!({"mermaid_flowchart": "graph TD\n  A --> B"});
        assert_eq!(extract_mermaid_chart(&v), "graph TD\n  A --> B");
    }

    #[test]
    fn fallback_when_missing_or_not_text() {
        assert_eq!(extract_mermaid_chart(&json!({})), FALLBACK_FLOWCHART);
        assert_eq!(
            extract_mermaid_chart(&json!({"mermaid_flowchart": 42})),
            FALLBACK_FLOWCHART
        );
        assert!(FALLBACK_FLOWCHART.starts_with(FLOWCHART_HEADER));
    }
}
