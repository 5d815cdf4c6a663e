use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::ai::error::ProviderError;

/// One text-generation call, independent of the provider's wire format.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens,
            temperature: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A remote model that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short provider label used in logs and errors.
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}

/// Send a prepared request, check the status and decode the JSON body.
pub async fn send_json<T: DeserializeOwned>(
    provider: &'static str,
    builder: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let resp = builder
        .send()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        warn!(provider, %status, "Provider API error");
        return Err(ProviderError::Status {
            provider,
            status,
            body,
        });
    }

    let raw = resp
        .text()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;
    let snippet: String = raw.chars().take(200).collect();
    debug!(provider, snippet = %snippet, "provider response body");
    trace!(provider, raw = %raw, "provider response");
    serde_json::from_str(&raw).map_err(|source| ProviderError::Decode { provider, source })
}

/// Join text fragments and reject responses that carry nothing but whitespace.
pub fn collect_text<'a>(
    provider: &'static str,
    parts: impl IntoIterator<Item = &'a str>,
) -> Result<String, ProviderError> {
    let text: String = parts.into_iter().collect();
    if text.trim().is_empty() {
        return Err(ProviderError::EmptyResponse { provider });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_text_joins_fragments() {
        let text = collect_text("test", ["Hello", ", ", "world"]).unwrap();
        assert_eq!(text, "Hello, world");
    }

    #[test]
    fn collect_text_rejects_blank() {
        let err = collect_text("test", [" ", "\n"]).unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse { provider: "test" }));
    }

    #[test]
    fn builder_sets_optional_fields() {
        let req = GenerationRequest::new("p", 10)
            .with_system("s")
            .with_temperature(0.5);
        assert_eq!(req.system.as_deref(), Some("s"));
        assert_eq!(req.temperature, Some(0.5));
        assert_eq!(req.max_tokens, 10);
    }
}
