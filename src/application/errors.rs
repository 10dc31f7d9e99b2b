//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Platform API error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Timed out after {0}s waiting for the chat connection")]
    ConnectTimeout(u64),

    #[error("Timed out after {secs}s waiting to join #{channel}")]
    JoinTimeout { channel: String, secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Chat transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Not connected")]
    NotConnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed: {0}")]
    Closed(String),

    #[error("Invalid channel name: {0}")]
    InvalidChannel(String),
}

/// Platform API errors
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Plugin lifecycle and handler errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Plugin '{0}' used before initialization")]
    NotInitialized(String),

    #[error("Plugin '{0}' already registered")]
    DuplicateName(String),

    #[error("Registration is closed, cannot add '{0}'")]
    RegistrationClosed(String),

    #[error("Plugins already initialized")]
    AlreadyInitialized,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("{0}")]
    Failed(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PluginResult<T> = Result<T, PluginError>;
