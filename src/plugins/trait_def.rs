//! Plugin trait definitions

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::errors::{PluginError, PluginResult};
use crate::domain::entities::InboundMessage;
use crate::domain::traits::{ChatTransport, PlatformApi};

/// Core plugin trait that all chat command plugins implement
///
/// Every plugin sees every inbound message. `commands` is only used for help
/// listings; `handle` decides for itself whether a message is meant for it
/// and must return without side effects when it is not.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique identifier for the plugin
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Trigger words this plugin answers to, e.g. `["!dice", "!roll"]`
    fn commands(&self) -> &[&str];

    /// Store the shared handles. Called once, before any `handle`.
    /// Must not block or touch the network.
    fn initialize(&mut self, ctx: PluginContext) -> PluginResult<()>;

    /// React to a chat message
    async fn handle(&self, message: &InboundMessage) -> PluginResult<()>;
}

/// Source of "now" for plugins that do time arithmetic, replaceable in tests
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Shared handles given to every plugin at initialization
#[derive(Clone)]
pub struct PluginContext {
    pub transport: Arc<dyn ChatTransport>,
    pub platform: Arc<dyn PlatformApi>,
    /// Every registered command, in registration order
    pub commands: Arc<[String]>,
}

impl PluginContext {
    pub fn new(transport: Arc<dyn ChatTransport>, platform: Arc<dyn PlatformApi>) -> Self {
        Self {
            transport,
            platform,
            commands: Arc::from(Vec::new()),
        }
    }

    pub fn with_commands(mut self, commands: Vec<String>) -> Self {
        self.commands = Arc::from(commands);
        self
    }
}

/// Boilerplate most plugins embed: keeps the context and offers shortcuts
pub struct PluginBase {
    name: &'static str,
    ctx: Option<PluginContext>,
}

impl PluginBase {
    pub fn new(name: &'static str) -> Self {
        Self { name, ctx: None }
    }

    /// Store the context. A second call keeps the first context.
    pub fn attach(&mut self, ctx: PluginContext) {
        if self.ctx.is_some() {
            tracing::warn!("Plugin '{}' initialized twice, keeping the first context", self.name);
            return;
        }
        self.ctx = Some(ctx);
    }

    pub fn context(&self) -> PluginResult<&PluginContext> {
        self.ctx
            .as_ref()
            .ok_or_else(|| PluginError::NotInitialized(self.name.to_string()))
    }

    pub fn transport(&self) -> PluginResult<&Arc<dyn ChatTransport>> {
        Ok(&self.context()?.transport)
    }

    pub fn platform(&self) -> PluginResult<&Arc<dyn PlatformApi>> {
        Ok(&self.context()?.platform)
    }

    /// Send `text` back to the channel the message came from
    pub async fn reply(&self, message: &InboundMessage, text: &str) -> PluginResult<()> {
        self.transport()?.send_message(message.channel(), text).await?;
        Ok(())
    }
}
