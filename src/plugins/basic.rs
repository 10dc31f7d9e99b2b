//! Greeting and command listing

use async_trait::async_trait;

use crate::application::errors::PluginResult;
use crate::application::messaging::Trigger;
use crate::domain::entities::InboundMessage;
use crate::plugins::trait_def::{Plugin, PluginBase, PluginContext};

const COMMANDS: &[&str] = &["!hello", "!commands"];

/// Answers `!hello` and `!commands`
pub struct BasicCommandsPlugin {
    base: PluginBase,
}

impl BasicCommandsPlugin {
    pub fn new() -> Self {
        Self {
            base: PluginBase::new("Basic Commands"),
        }
    }

    fn command_listing(&self) -> PluginResult<String> {
        let ctx = self.base.context()?;
        Ok(format!("Available commands: {}", ctx.commands.join(", ")))
    }
}

impl Default for BasicCommandsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for BasicCommandsPlugin {
    fn name(&self) -> &str {
        "Basic Commands"
    }

    fn description(&self) -> &str {
        "Greets chatters and lists the available commands"
    }

    fn commands(&self) -> &[&str] {
        COMMANDS
    }

    fn initialize(&mut self, ctx: PluginContext) -> PluginResult<()> {
        self.base.attach(ctx);
        Ok(())
    }

    async fn handle(&self, message: &InboundMessage) -> PluginResult<()> {
        let Some(trigger) = Trigger::parse(message.raw_text()).filter(Trigger::is_bare) else {
            return Ok(());
        };

        match trigger.name.as_str() {
            "!hello" => {
                let text = format!("Hello {}! 👋", message.sender());
                self.base.reply(message, &text).await
            }
            "!commands" => {
                let text = self.command_listing()?;
                self.base.reply(message, &text).await
            }
            _ => Ok(()),
        }
    }
}
