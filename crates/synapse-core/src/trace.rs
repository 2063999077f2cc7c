//! Response record for one neural pathway trace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::ValidationReport;

/// Steps every trace must contain, receptor to cortex.
pub const REQUIRED_STEPS: usize = 5;

/// One step of the receptor-to-cortex pathway. Fields are optional on the wire;
/// the accessors supply the display fallbacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceStep {
    #[serde(default)]
    pub step_number: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub structure: Option<String>,
    #[serde(default)]
    pub ncert_reference: Option<String>,
}

impl TraceStep {
    /// Step number as shown on the card badge; models send it as a number or a string.
    pub fn number_label(&self) -> String {
        match &self.step_number {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => "?".to_string(),
        }
    }

    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn structure_or_default(&self) -> &str {
        self.structure.as_deref().unwrap_or("N/A")
    }

    pub fn ncert_reference_or_default(&self) -> &str {
        self.ncert_reference.as_deref().unwrap_or("N/A")
    }
}

/// The typed view of a validated model reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NeuralTrace {
    #[serde(default)]
    pub stimulus: String,
    #[serde(default)]
    pub steps: Vec<TraceStep>,
    #[serde(default)]
    pub mermaid_flowchart: String,
    #[serde(default)]
    pub ncert_accuracy_notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflex_arc_note: Option<String>,
}

impl NeuralTrace {
    /// Typed view of a raw reply. Lenient: shape problems belong to the validation report.
    /// Non-string scalars (e.g. a numeric title) are dropped rather than failing the page.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        let steps = value
            .get("steps")
            .and_then(Value::as_array)
            .map(|steps| steps.iter().map(step_from_value).collect())
            .unwrap_or_default();

        Self {
            stimulus: text("stimulus").unwrap_or_default(),
            steps,
            mermaid_flowchart: text("mermaid_flowchart").unwrap_or_default(),
            ncert_accuracy_notes: text("ncert_accuracy_notes").unwrap_or_default(),
            reflex_arc_note: text("reflex_arc_note").filter(|s| !s.trim().is_empty()),
        }
    }
}

fn step_from_value(step: &Value) -> TraceStep {
    let text = |key: &str| step.get(key).and_then(Value::as_str).map(str::to_string);
    TraceStep {
        step_number: step.get("step_number").cloned(),
        title: text("title"),
        description: text("description"),
        structure: text("structure"),
        ncert_reference: text("ncert_reference"),
    }
}

/// One trace request: the raw model JSON, its validation report and when it ran.
#[derive(Debug, Clone, Serialize)]
pub struct TraceOutcome {
    pub stimulus: String,
    pub trace: Value,
    pub validation: ValidationReport,
    pub backend: String,
    pub traced_at: DateTime<Utc>,
}

impl TraceOutcome {
    pub fn is_valid(&self) -> bool {
        self.validation.valid
    }

    pub fn typed(&self) -> NeuralTrace {
        NeuralTrace::from_value(&self.trace)
    }
}
