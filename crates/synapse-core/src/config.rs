//! Synapse configuration: defaults, optional TOML file, then `SYNAPSE__*` environment.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | bind_addr | 127.0.0.1:8000 | Gateway listen address. |
//! | llm_mode | live | "live" calls the chat-completion API; "mock" returns a canned trace. |
//! | api_url | GitHub Models chat completions | OpenAI-compatible endpoint. |
//! | model | gpt-4o | Model identifier. |
//! | temperature | 0.3 | Sampling temperature. |
//! | max_tokens | 2000 | Completion budget. |
//! | json_mode | true | Send `response_format: json_object`. |
//! | request_timeout_secs | 60 | Per-request timeout for the outbound call. |
//! | max_stimulus_chars | 200 | Longer stimuli are rejected before any call. |
//!
//! The API key is never read from the file: `SYNAPSE_API_KEY`, then `GITHUB_TOKEN`, then `OPENAI_API_KEY`.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_API_URL: &str = "https://models.inference.ai.azure.com/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_CONFIG_PATH: &str = "config/synapse.toml";
const API_KEY_VARS: &[&str] = &["SYNAPSE_API_KEY", "GITHUB_TOKEN", "OPENAI_API_KEY"];

/// Backend selection for trace requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmMode {
    #[default]
    Live,
    Mock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynapseConfig {
    pub bind_addr: String,
    pub llm_mode: LlmMode,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub json_mode: bool,
    pub request_timeout_secs: u64,
    pub max_stimulus_chars: usize,
    /// Resolved from the environment after loading; never serialized.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for SynapseConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            llm_mode: LlmMode::Live,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 2000,
            json_mode: true,
            request_timeout_secs: 60,
            max_stimulus_chars: 200,
            api_key: None,
        }
    }
}

impl SynapseConfig {
    /// Load config. Precedence: env `SYNAPSE__*` > file (`SYNAPSE_CONFIG` or `config/synapse.toml`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("SYNAPSE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::load_from(Path::new(&config_path))?;
        cfg.api_key = resolve_api_key();
        Ok(cfg)
    }

    /// Load from an explicit file path (skipped when absent) plus environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let d = Self::default();
        let builder = config::Config::builder()
            .set_default("bind_addr", d.bind_addr)?
            .set_default("llm_mode", "live")?
            .set_default("api_url", d.api_url)?
            .set_default("model", d.model)?
            .set_default("temperature", d.temperature as f64)?
            .set_default("max_tokens", d.max_tokens as i64)?
            .set_default("json_mode", d.json_mode)?
            .set_default("request_timeout_secs", d.request_timeout_secs as i64)?
            .set_default("max_stimulus_chars", d.max_stimulus_chars as i64)?;

        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("SYNAPSE").separator("__"))
            .build()?;

        built.try_deserialize()
    }

    /// API key with surrounding whitespace removed; `None` when unset or blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

fn resolve_api_key() -> Option<String> {
    resolve_api_key_with(|name| std::env::var(name).ok())
}

/// First non-blank value among `API_KEY_VARS`, in order.
fn resolve_api_key_with(get: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|name| get(name))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_file_absent() {
        let cfg = SynapseConfig::load_from(Path::new("/nonexistent/synapse.toml")).unwrap();
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.max_tokens, 2000);
        assert!(cfg.json_mode);
        assert!((cfg.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "llm_mode = \"mock\"\nmodel = \"gpt-4o-mini\"\nmax_stimulus_chars = 80").unwrap();
        let cfg = SynapseConfig::load_from(file.path()).unwrap();
        assert_eq!(cfg.llm_mode, LlmMode::Mock);
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(cfg.max_stimulus_chars, 80);
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let cfg = SynapseConfig {
            api_key: Some("   ".to_string()),
            ..SynapseConfig::default()
        };
        assert!(cfg.api_key().is_none());
        let cfg = SynapseConfig {
            api_key: Some(" ghp_abc ".to_string()),
            ..SynapseConfig::default()
        };
        assert_eq!(cfg.api_key(), Some("ghp_abc"));
    }

    fn env(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name: &str| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn api_key_order_skips_blank_values() {

        let key = resolve_api_key_with(env(&[
            ("SYNAPSE_API_KEY", "  "),
            ("GITHUB_TOKEN", " ghp_fallback "),
            ("OPENAI_API_KEY", "sk-last"),
        ]));
        assert_eq!(key.as_deref(), Some("ghp_fallback"));

        let key = resolve_api_key_with(env(&[
            ("OPENAI_API_KEY", "sk-last"),
            ("SYNAPSE_API_KEY", "syn-first"),
        ]));
        assert_eq!(key.as_deref(), Some("syn-first"));

        assert!(resolve_api_key_with(env(&[("GITHUB_TOKEN", "")])).is_none());
    }

    #[test]
    fn environment_overrides_file() {
        // Only this test touches request_timeout_secs, so the variable cannot leak into others.
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "request_timeout_secs = 30").unwrap();

        std::env::set_var("SYNAPSE__REQUEST_TIMEOUT_SECS", "5");
        let cfg = SynapseConfig::load_from(file.path());
        std::env::remove_var("SYNAPSE__REQUEST_TIMEOUT_SECS");

        assert_eq!(cfg.unwrap().request_timeout_secs, 5);
    }
}
