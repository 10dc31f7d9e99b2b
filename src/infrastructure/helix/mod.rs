//! Twitch Helix API client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::application::errors::PlatformError;
use crate::domain::entities::{ApiCredentials, ChannelInfo, PlatformUser, StreamInfo};
use crate::domain::traits::PlatformApi;

/// Helix API base URL
pub const API_BASE: &str = "https://api.twitch.tv/helix";

/// Every Helix list endpoint wraps its results in `data`
#[derive(Deserialize)]
struct DataResponse<T> {
    data: Vec<T>,
}

/// Helix client authenticated with the bot's user token
pub struct HelixClient {
    client: Client,
    base_url: String,
    credentials: ApiCredentials,
}

impl HelixClient {
    /// `access_token` may carry the chat-style `oauth:` prefix; it is dropped
    pub fn new(access_token: &str, client_id: impl Into<String>, timeout: Duration) -> Result<Self, PlatformError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlatformError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: API_BASE.to_string(),
            credentials: ApiCredentials {
                access_token: access_token.trim_start_matches("oauth:").to_string(),
                client_id: client_id.into(),
            },
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, PlatformError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.credentials.access_token)
            .header("Client-Id", &self.credentials.client_id)
            .query(query)
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                let body = response.text().await.unwrap_or_default();
                return Err(PlatformError::Unauthorized(body));
            }
            status if !status.is_success() => return Err(PlatformError::Status(status.as_u16())),
            _ => {}
        }

        let data: DataResponse<T> = response
            .json()
            .await
            .map_err(|e| PlatformError::Parse(e.to_string()))?;
        Ok(data.data)
    }
}

#[async_trait]
impl PlatformApi for HelixClient {
    async fn get_users(&self, logins: &[String]) -> Result<Vec<PlatformUser>, PlatformError> {
        if logins.is_empty() {
            return Ok(Vec::new());
        }
        let query: Vec<(&str, &str)> = logins.iter().map(|l| ("login", l.as_str())).collect();
        self.get_data("/users", &query).await
    }

    async fn get_channel_info(&self, user_id: &str) -> Result<Option<ChannelInfo>, PlatformError> {
        let channels: Vec<ChannelInfo> = self.get_data("/channels", &[("broadcaster_id", user_id)]).await?;
        Ok(channels.into_iter().next())
    }

    async fn get_streams(&self, logins: &[String]) -> Result<Vec<StreamInfo>, PlatformError> {
        if logins.is_empty() {
            return Ok(Vec::new());
        }
        let query: Vec<(&str, &str)> = logins.iter().map(|l| ("user_login", l.as_str())).collect();
        self.get_data("/streams", &query).await
    }

    fn credentials(&self) -> Option<ApiCredentials> {
        Some(self.credentials.clone())
    }
}
