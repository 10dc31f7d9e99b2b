//! LLM traits - chat completion interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One turn of a completion prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLMMessage {
    /// "system", "user" or "assistant"
    pub role: String,
    pub content: String,
}

impl LLMMessage {
    fn with_role(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role("assistant", content)
    }
}

/// A finished completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    pub content: String,
    /// Model that produced the answer
    pub model: String,
    pub usage: Option<LLMUsage>,
    pub finish_reason: Option<String>,
}

/// Token accounting, when the provider reports it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// LLM errors
#[derive(Error, Debug)]
pub enum LLMError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type for LLM operations
pub type LLMResult<T> = Result<T, LLMError>;

/// LLM Provider trait
#[async_trait]
pub trait LLM: Send + Sync {
    /// Provider name, for logs
    fn name(&self) -> &str;

    /// Chat completion. `None` arguments fall back to the provider defaults.
    async fn chat(
        &self,
        messages: Vec<LLMMessage>,
        model: Option<&str>,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> LLMResult<LLMResponse>;
}
