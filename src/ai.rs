//! Clients for the text-generation providers and the prompts sent to them.

pub mod claude;
pub mod common;
pub mod config;
pub mod error;
pub mod gemini;
pub mod prompts;

pub use claude::ClaudeClient;
pub use common::{GenerationRequest, TextGenerator};
pub use config::AiConfig;
pub use error::ProviderError;
pub use gemini::GeminiClient;
