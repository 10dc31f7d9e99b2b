use async_trait::async_trait;

use crate::application::errors::PlatformError;
use crate::domain::entities::{ApiCredentials, ChannelInfo, PlatformUser, StreamInfo};

/// PlatformApi - read-only queries against the streaming platform
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Look up accounts by login name
    async fn get_users(&self, logins: &[String]) -> Result<Vec<PlatformUser>, PlatformError>;

    /// Channel title and game for a broadcaster id
    async fn get_channel_info(&self, user_id: &str) -> Result<Option<ChannelInfo>, PlatformError>;

    /// Live streams for these logins. Offline channels are simply absent.
    async fn get_streams(&self, logins: &[String]) -> Result<Vec<StreamInfo>, PlatformError>;

    /// Credentials the client authenticates with, if it has any
    fn credentials(&self) -> Option<ApiCredentials> {
        None
    }
}
