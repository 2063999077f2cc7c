//! Synapse-Architect — Core library.
//! NCERT reference, prompt assembly, chat-completion bridge, JSON extraction and trace validation.

pub mod config;
pub mod error;
pub mod extract;
pub mod flowchart;
pub mod ncert_reference;
pub mod neural_bridge;
pub mod prompts;
pub mod trace;
pub mod validation;

pub use crate::config::{LlmMode, SynapseConfig};
pub use error::TraceError;
pub use extract::extract_json;
pub use flowchart::{extract_mermaid_chart, FALLBACK_FLOWCHART, FLOWCHART_HEADER};
pub use ncert_reference::{reference, Facts, NcertReference};
pub use neural_bridge::{
    build_backend, run_trace, trace_neural_pathway, ChatCompletionsBridge, MockBackend, TraceBackend,
};
pub use trace::{NeuralTrace, TraceOutcome, TraceStep, REQUIRED_STEPS};
pub use validation::{validate, ValidationReport, REQUIRED_KEYS, STEP_KEYS};

/// Pre-set stimuli offered in the Neuro-Lab sidebar.
pub const QUICK_STIMULI: &[&str] = &[
    "Stubbing a toe",
    "Touching a hot pan",
    "Seeing a bright flash",
    "Hearing a loud bang",
    "Smelling fresh coffee",
    "Tasting something sour",
    "Stepping on a sharp object",
    "Feeling a cold breeze",
];

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
