//! Records returned by the streaming platform API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A platform account, as returned by a user lookup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlatformUser {
    pub id: String,
    pub login: String,
    #[serde(default)]
    pub display_name: String,
}

/// Current channel metadata
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChannelInfo {
    #[serde(default)]
    pub broadcaster_id: String,
    pub title: String,
    pub game_name: String,
}

/// A live stream. An empty stream list means the channel is offline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StreamInfo {
    #[serde(default)]
    pub user_login: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub viewer_count: u64,
    pub started_at: DateTime<Utc>,
}

/// Credentials the bot authenticates with, shared with plugins that call
/// third-party APIs on the bot's behalf.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub access_token: String,
    pub client_id: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("access_token", &"<redacted>")
            .field("client_id", &self.client_id)
            .finish()
    }
}
