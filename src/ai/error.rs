use thiserror::Error;

/// Failure of a single call to a text-generation provider.
///
/// The planner treats every variant the same way; the distinction only
/// matters for logs.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} API error {status}: {body}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{provider} returned an undecodable response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{provider} returned no text")]
    EmptyResponse { provider: &'static str },
}

impl ProviderError {
    pub fn provider(&self) -> &'static str {
        match self {
            Self::Transport { provider, .. }
            | Self::Status { provider, .. }
            | Self::Decode { provider, .. }
            | Self::EmptyResponse { provider } => provider,
        }
    }
}
