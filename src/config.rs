use std::time::Duration;

/// Runtime configuration shared by all pipeline stages.
///
/// Directory layout and model identifiers come from the CLI; this struct
/// only carries the API endpoint and the knobs of the retry loop.
#[derive(Clone, Debug)]
pub struct Config {
    /// API key for the OpenAI-compatible endpoint.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible endpoint.
    pub api_base_url: String,
    /// Attempts per model call, including the first.
    pub max_attempts: u32,
    /// Pause between attempts, in seconds.
    pub backoff_secs: u64,
    /// Completion-token cap for extraction and response calls.
    pub max_response_tokens: u32,
    /// Completion-token cap for judgement calls (reasoning verdicts run long).
    pub max_judgement_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            max_attempts: 3,
            backoff_secs: 5,
            max_response_tokens: 8192,
            max_judgement_tokens: 25_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or(default.api_key),
            api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.api_base_url),
            max_attempts: std::env::var("LLM_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_attempts),
            backoff_secs: std::env::var("LLM_BACKOFF_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.backoff_secs),
            max_response_tokens: std::env::var("LLM_MAX_RESPONSE_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_response_tokens),
            max_judgement_tokens: std::env::var("LLM_MAX_JUDGEMENT_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_judgement_tokens),
        }
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}

/// Student models that cannot take image input. Judging a response for a
/// row that carries images is short-circuited for these instead of making
/// a call that is guaranteed to fail.
pub const TEXT_ONLY_STUDENT_MODELS: &[&str] = &["DeepSeek-R1-Distill-Llama-70B"];

pub fn is_text_only_student(model: &str) -> bool {
    TEXT_ONLY_STUDENT_MODELS.contains(&model)
}
