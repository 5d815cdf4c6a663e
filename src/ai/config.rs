use std::env;
use std::str::FromStr;

pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-sonnet-20240620";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_CLAUDE_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_GEMINI_MAX_TOKENS: u32 = 500;
pub const DEFAULT_CLAUDE_TEMPERATURE: f32 = 0.7;
pub const CLAUDE_API_URL: &str = "https://api.anthropic.com";
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone)]
pub struct AiConfig {
    pub claude_api_key: String,
    pub gemini_api_key: String,
    pub claude_model: String,
    pub gemini_model: String,
    pub claude_max_tokens: u32,
    pub gemini_max_tokens: u32,
    pub claude_temperature: f32,
    pub claude_api_url: String,
    pub gemini_api_url: String,
}

impl AiConfig {
    /// Read provider settings from the environment.
    ///
    /// Returns `None` unless both API keys are present and non-empty.
    pub fn from_env() -> Option<Self> {
        let claude_api_key =
            non_empty_var("CLAUDE_API_KEY").or_else(|| non_empty_var("ANTHROPIC_API_KEY"))?;
        let gemini_api_key = non_empty_var("GEMINI_API_KEY")?;
        Some(Self {
            claude_api_key,
            gemini_api_key,
            claude_model: env::var("CLAUDE_MODEL")
                .unwrap_or_else(|_| DEFAULT_CLAUDE_MODEL.to_string()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            claude_max_tokens: parsed_var("CLAUDE_MAX_TOKENS", DEFAULT_CLAUDE_MAX_TOKENS),
            gemini_max_tokens: parsed_var("GEMINI_MAX_TOKENS", DEFAULT_GEMINI_MAX_TOKENS),
            claude_temperature: parsed_var("CLAUDE_TEMPERATURE", DEFAULT_CLAUDE_TEMPERATURE),
            claude_api_url: env::var("CLAUDE_API_URL")
                .unwrap_or_else(|_| CLAUDE_API_URL.to_string()),
            gemini_api_url: env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| GEMINI_API_URL.to_string()),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(
                    variable = name,
                    value = %raw,
                    %default,
                    "Ignoring unparseable override"
                );
                default
            }
        },
        Err(_) => default,
    }
}
