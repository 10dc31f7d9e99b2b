use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::errors::TransportError;

/// Events a chat transport reports to its subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The server accepted our login.
    Connected,
    /// We are now in this channel.
    Joined { channel: String },
    /// A chatter posted a message.
    MessageReceived {
        channel: String,
        sender: String,
        text: String,
    },
    /// The connection went away. No automatic reconnect follows.
    Disconnected { reason: String },
}

/// ChatTransport - abstraction for the live chat connection
///
/// One handle is shared by the bot and every plugin, so implementations must
/// be safe to call from several tasks at once.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Start connecting. Completion is signalled with `TransportEvent::Connected`.
    async fn connect(&self) -> Result<(), TransportError>;

    /// Request to join a channel.
    async fn join_channel(&self, channel: &str) -> Result<(), TransportError>;

    /// Send a chat message to a channel
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool;

    /// Channels we have confirmed joining
    fn joined_channels(&self) -> Vec<String>;

    /// Register a new event subscriber. Events are never dropped for a live
    /// receiver.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<TransportEvent>;
}
