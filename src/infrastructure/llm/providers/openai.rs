//! OpenAI provider - chat completions over the OpenAI-compatible REST API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::infrastructure::llm::{LLMError, LLMMessage, LLMResponse, LLMResult, LLMUsage, LLM};

/// OpenAI API endpoint
pub const API_BASE: &str = "https://api.openai.com/v1";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenAI-compatible provider
pub struct OpenAiProvider {
    api_key: String,
    client: Client,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, model: Option<&str>) -> LLMResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LLMError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            client,
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
            base_url: API_BASE.to_string(),
        })
    }

    /// Point at another OpenAI-compatible server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<LLMMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[async_trait]
impl LLM for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(
        &self,
        messages: Vec<LLMMessage>,
        model: Option<&str>,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> LLMResult<LLMResponse> {
        let model = model.unwrap_or(&self.model);

        let request = ChatRequest {
            model,
            messages,
            temperature,
            max_tokens,
        };

        let response = self.client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(LLMError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LLMError::ApiError(format!("status: {}, body: {}", status, body)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let choice = chat_response.choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::InvalidRequest("No choices in response".to_string()))?;

        let usage = chat_response.usage.map(|u| LLMUsage {
            prompt_tokens: Some(u.prompt_tokens),
            completion_tokens: Some(u.completion_tokens),
            total_tokens: Some(u.total_tokens),
        });

        Ok(LLMResponse {
            content: choice.message.content.unwrap_or_default(),
            model: chat_response.model.unwrap_or_else(|| model.to_string()),
            usage,
            finish_reason: choice.finish_reason,
        })
    }
}
