use thiserror::Error;

/// Errors returned by the LLM chat-completions client.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-2xx status with an error message.
    #[error("LLM API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP 429. Never retried, to avoid hammering an exhausted quota.
    #[error("LLM API rate limited: {0}")]
    RateLimited(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A 2xx response carried no choices.
    #[error("LLM response contained no choices")]
    EmptyResponse,

    /// Client construction requires an API key.
    #[error("no LLM API key configured")]
    MissingApiKey,

    /// The configured base URL could not be parsed.
    #[error("invalid LLM base URL '{0}'")]
    InvalidBaseUrl(String),
}
