//! Domain entities - Core objects shared by the dispatch core and plugins

pub mod message;
pub mod platform;

pub use message::{normalize_channel, InboundMessage};
pub use platform::{ApiCredentials, ChannelInfo, PlatformUser, StreamInfo};
