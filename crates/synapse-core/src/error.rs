use thiserror::Error;

/// Everything that can stop a trace before a validation report exists.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("stimulus is empty")]
    EmptyStimulus,

    #[error("stimulus is {len} characters; the limit is {max}")]
    StimulusTooLong { len: usize, max: usize },

    #[error("no API key configured (set SYNAPSE_API_KEY, GITHUB_TOKEN or OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("chat-completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat-completion API returned {0}: {1}")]
    Upstream(u16, String),

    #[error("chat-completion envelope could not be parsed: {0}")]
    Envelope(String),

    #[error("model returned no content")]
    EmptyCompletion,

    #[error("could not parse JSON from model response")]
    UnparseableOutput,
}

impl TraceError {
    /// True when the caller sent bad input rather than the backend failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TraceError::EmptyStimulus | TraceError::StimulusTooLong { .. })
    }
}
