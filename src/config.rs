use std::env;

use crate::ai::config::AiConfig;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";

#[derive(Clone)]
pub struct Config {
    pub bind_addr: String,
    pub ai: Option<AiConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let ai = AiConfig::from_env();
        Self { bind_addr, ai }
    }
}
