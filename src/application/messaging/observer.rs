//! Observer - structured reporting for the registry, dispatch core and bot
//!
//! Core components never print directly. They report `CoreEvent`s to an
//! injected `Observer`; production wires in `TracingObserver`, tests use
//! `RecordingObserver` and assert on what was reported.

use std::sync::Mutex;

/// Something the core wants an operator to know about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    PluginRegistered { plugin: String },
    PluginInitialized { plugin: String },
    PluginInitFailed { plugin: String, error: String },
    MessageReceived { channel: String, sender: String },
    PluginFailed { plugin: String, channel: String, error: String },
    PluginPanicked { plugin: String, channel: String },
    FanOutCompleted { channel: String, delivered: usize, failed: usize },
    Connecting,
    Connected,
    ConnectTimedOut { secs: u64 },
    Joined { channels: Vec<String> },
    JoinFailed { channel: String, error: String },
    AnnouncementFailed { error: String },
    ChannelInfo { title: String, game: String },
    ChannelLookupFailed { error: String },
    Disconnected { reason: String },
}

impl CoreEvent {
    /// True for events that mean something went wrong
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            CoreEvent::PluginInitFailed { .. }
                | CoreEvent::PluginFailed { .. }
                | CoreEvent::PluginPanicked { .. }
                | CoreEvent::ConnectTimedOut { .. }
                | CoreEvent::JoinFailed { .. }
                | CoreEvent::AnnouncementFailed { .. }
                | CoreEvent::ChannelLookupFailed { .. }
                | CoreEvent::Disconnected { .. }
        )
    }
}

/// Observer trait - receives core events
pub trait Observer: Send + Sync {
    fn observe(&self, event: CoreEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&self, event: CoreEvent) {
        match event {
            CoreEvent::PluginRegistered { plugin } => tracing::info!("Registered plugin: {}", plugin),
            CoreEvent::PluginInitialized { plugin } => tracing::debug!("Initialized plugin: {}", plugin),
            CoreEvent::PluginInitFailed { plugin, error } => {
                tracing::error!("Plugin '{}' failed to initialize: {}", plugin, error)
            }
            CoreEvent::MessageReceived { channel, sender } => tracing::debug!("[#{}] message from {}", channel, sender),
            CoreEvent::PluginFailed { plugin, channel, error } => {
                tracing::warn!("[#{}] plugin '{}' failed: {}", channel, plugin, error)
            }
            CoreEvent::PluginPanicked { plugin, channel } => {
                tracing::error!("[#{}] plugin '{}' panicked", channel, plugin)
            }
            CoreEvent::FanOutCompleted { channel, delivered, failed } => {
                tracing::debug!("[#{}] delivered to {} plugins ({} failed)", channel, delivered, failed)
            }
            CoreEvent::Connecting => tracing::info!("Connecting to chat..."),
            CoreEvent::Connected => tracing::info!("Connected to chat"),
            CoreEvent::ConnectTimedOut { secs } => tracing::error!("Failed to connect within {}s", secs),
            CoreEvent::Joined { channels } => tracing::info!("Joined channels: {}", channels.join(", ")),
            CoreEvent::JoinFailed { channel, error } => tracing::error!("Failed to join #{}: {}", channel, error),
            CoreEvent::AnnouncementFailed { error } => tracing::warn!("Announcement not sent: {}", error),
            CoreEvent::ChannelInfo { title, game } => tracing::info!("Channel title: {} | Game: {}", title, game),
            CoreEvent::ChannelLookupFailed { error } => tracing::warn!("Channel lookup failed: {}", error),
            CoreEvent::Disconnected { reason } => tracing::warn!("Disconnected: {}", reason),
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CoreEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything observed so far
    pub fn events(&self) -> Vec<CoreEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn failures(&self) -> Vec<CoreEvent> {
        self.events().into_iter().filter(|e| e.is_failure()).collect()
    }
}

impl Observer for RecordingObserver {
    fn observe(&self, event: CoreEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
