//! Shape checks on the raw model reply.
//!
//! Errors make a reply unusable (missing top-level keys, wrong step count, a flowchart
//! that is not a top-down Mermaid graph). Warnings flag incomplete steps but still render.

use serde::Serialize;
use serde_json::Value;

use crate::flowchart::FLOWCHART_HEADER;
use crate::trace::REQUIRED_STEPS;

/// Top-level keys every reply must carry.
pub const REQUIRED_KEYS: &[&str] = &["stimulus", "steps", "mermaid_flowchart", "ncert_accuracy_notes"];

/// Keys each step should carry.
pub const STEP_KEYS: &[&str] = &["step_number", "title", "description", "structure", "ncert_reference"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl ValidationReport {
    fn error(&mut self, msg: String) {
        self.valid = false;
        self.errors.push(msg);
    }

    /// Errors joined for a single inline message.
    pub fn error_summary(&self) -> String {
        self.errors.join("; ")
    }

    pub fn warning_summary(&self) -> String {
        self.warnings.join("; ")
    }
}

/// Validate a raw reply and return the report.
pub fn validate(result: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    for key in REQUIRED_KEYS {
        if result.get(key).is_none() {
            report.error(format!("Missing required key: '{}'", key));
        }
    }

    let steps: &[Value] = result
        .get("steps")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    if steps.len() != REQUIRED_STEPS {
        report.error(format!("Expected {} steps, got {}", REQUIRED_STEPS, steps.len()));
    }

    for (i, step) in steps.iter().enumerate() {
        for key in STEP_KEYS {
            if step.get(key).is_none() {
                report
                    .warnings
                    .push(format!("Step {} missing key: '{}'", i + 1, key));
            }
        }
    }

    if let Some(chart) = result.get("mermaid_flowchart") {
        let starts_right = chart
            .as_str()
            .map(|s| s.trim().starts_with(FLOWCHART_HEADER))
            .unwrap_or(false);
        if !starts_right {
            report.error(format!(
                "Mermaid flowchart must begin with '{}'",
                FLOWCHART_HEADER
            ));
        }
    }

    report
}
