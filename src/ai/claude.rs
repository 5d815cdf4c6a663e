use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::ai::common::{collect_text, send_json, GenerationRequest, TextGenerator};
use crate::ai::config::CLAUDE_API_URL;
use crate::ai::error::ProviderError;

const PROVIDER: &str = "claude";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Client for the Anthropic Messages API.
#[derive(Clone)]
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ClaudeClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: CLAUDE_API_URL.to_string(),
        }
    }

    /// Point the client at a different host, e.g. a proxy or a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl TextGenerator for ClaudeClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    #[instrument(level = "trace", skip(self, request), fields(model = %self.model))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system.as_deref(),
            messages: [UserMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        debug!(url = %url, max_tokens = request.max_tokens, "sending messages request");

        let builder = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);
        let resp: MessagesResponse = send_json(PROVIDER, builder).await?;

        collect_text(
            PROVIDER,
            resp.content
                .iter()
                .filter(|block| block.kind == "text")
                .map(|block| block.text.as_str()),
        )
    }
}
