//! Neural Bridge — connects the Neuro-Lab UI to a hosted chat-completion model.
//!
//! One call per trace: system prompt (persona + NCERT context + JSON contract), user prompt
//! (the stimulus), JSON mode on. No retries; failures go back to the caller as `TraceError`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{LlmMode, SynapseConfig};
use crate::error::TraceError;
use crate::extract::extract_json;
use crate::prompts::{stimulus_in_user_prompt, system_prompt, user_prompt};
use crate::trace::TraceOutcome;
use crate::validation::validate;

/// A model that answers one system + user exchange with raw text.
#[async_trait]
pub trait TraceBackend: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, TraceError>;

    /// Short name for logs and the JSON API (e.g. `gpt-4o`, `mock`).
    fn label(&self) -> &str;
}

// OpenAI-compatible request/response
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// Live backend: GitHub Models / OpenAI-compatible chat completions with bearer auth.
pub struct ChatCompletionsBridge {
    api_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    json_mode: bool,
    client: reqwest::Client,
}

impl ChatCompletionsBridge {
    pub fn from_config(cfg: &SynapseConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key().map(str::to_string),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            json_mode: cfg.json_mode,
            client,
        }
    }

    fn request_body<'a>(&'a self, system: &'a str, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: self.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }
}

#[async_trait]
impl TraceBackend for ChatCompletionsBridge {
    async fn complete(&self, system: &str, user: &str) -> Result<String, TraceError> {
        let api_key = self.api_key.as_deref().ok_or(TraceError::MissingApiKey)?;

        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&self.request_body(system, user))
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            return Err(TraceError::Upstream(status.as_u16(), text));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| TraceError::Envelope(e.to_string()))?;

        parsed
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(TraceError::EmptyCompletion)
    }

    fn label(&self) -> &str {
        &self.model
    }
}

/// Deterministic backend: a well-formed 5-step somatosensory trace for any stimulus.
#[derive(Debug, Default, Clone)]
pub struct MockBackend;

impl MockBackend {
    /// The canned reply for a stimulus, before serialization.
    pub fn canned_trace(stimulus: &str) -> Value {
        serde_json::json!({
            "stimulus": stimulus,
            "steps": [
                {
                    "step_number": 1,
                    "title": "Stimulus Detection",
                    "description": "Receptors in the skin detect the stimulus and convert it into an electrical signal.",
                    "structure": "Nociceptors / mechanoreceptors",
                    "ncert_reference": "Class 11 Ch.21: Sensory reception"
                },
                {
                    "step_number": 2,
                    "title": "Afferent Conduction",
                    "description": "An action potential travels along the sensory (afferent) neuron towards the CNS.",
                    "structure": "Sensory neuron",
                    "ncert_reference": "Class 11 Ch.21: Transmission of impulses"
                },
                {
                    "step_number": 3,
                    "title": "Spinal Relay",
                    "description": "The impulse enters the dorsal horn of the spinal cord, where a reflex arc may trigger withdrawal.",
                    "structure": "Spinal cord",
                    "ncert_reference": "Class 10 Ch.7: Reflex action"
                },
                {
                    "step_number": 4,
                    "title": "Synaptic Transmission",
                    "description": "Neurotransmitters carry the signal across synapses to interneurons that ascend to the brain.",
                    "structure": "Interneuron / synapse",
                    "ncert_reference": "Class 11 Ch.21: Synapse"
                },
                {
                    "step_number": 5,
                    "title": "Cortical Processing",
                    "description": "The somatosensory cortex in the parietal lobe interprets the signal as a conscious sensation.",
                    "structure": "Somatosensory cortex",
                    "ncert_reference": "Class 11 Ch.21: Forebrain"
                }
            ],
            "mermaid_flowchart": "graph TD\\n  A[\"Receptor\"] --> B[\"Sensory Neuron\"]\\n  B --> C[\"Spinal Cord\"]\\n  C --> D[\"Interneuron\"]\\n  D --> E[\"Somatosensory Cortex\"]",
            "ncert_accuracy_notes": "Each step follows the NCERT receptor, afferent neuron, CNS relay, interneuron and brain region model.",
            "reflex_arc_note": "The spinal cord can trigger a withdrawal reflex before the signal reaches the cortex."
        })
    }
}

#[async_trait]
impl TraceBackend for MockBackend {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, TraceError> {
        let stimulus = stimulus_in_user_prompt(user).unwrap_or(user);
        Ok(Self::canned_trace(stimulus).to_string())
    }

    fn label(&self) -> &str {
        "mock"
    }
}

/// Backend for the configured mode.
pub fn build_backend(cfg: &SynapseConfig) -> Arc<dyn TraceBackend> {
    match cfg.llm_mode {
        LlmMode::Mock => Arc::new(MockBackend),
        LlmMode::Live => Arc::new(ChatCompletionsBridge::from_config(cfg)),
    }
}

/// One model call for the stimulus; returns the parsed JSON reply.
pub async fn trace_neural_pathway(
    backend: &dyn TraceBackend,
    stimulus: &str,
) -> Result<Value, TraceError> {
    tracing::info!(backend = backend.label(), "[SYNAPSE] tracing stimulus: {}", stimulus);
    let raw = backend.complete(system_prompt(), &user_prompt(stimulus)).await?;
    extract_json(&raw)
}

/// Check the stimulus, trace it and validate the reply.
pub async fn run_trace(
    backend: &dyn TraceBackend,
    stimulus: &str,
    max_stimulus_chars: usize,
) -> Result<TraceOutcome, TraceError> {
    let stimulus = stimulus.trim();
    if stimulus.is_empty() {
        return Err(TraceError::EmptyStimulus);
    }
    let len = stimulus.chars().count();
    if len > max_stimulus_chars {
        return Err(TraceError::StimulusTooLong {
            len,
            max: max_stimulus_chars,
        });
    }

    let trace = trace_neural_pathway(backend, stimulus).await?;
    let validation = validate(&trace);
    if validation.valid {
        tracing::info!("[SYNAPSE] trace validated ({} warnings)", validation.warnings.len());
    } else {
        tracing::warn!("[SYNAPSE] trace rejected: {}", validation.error_summary());
    }

    Ok(TraceOutcome {
        stimulus: stimulus.to_string(),
        trace,
        validation,
        backend: backend.label().to_string(),
        traced_at: chrono::Utc::now(),
    })
}
