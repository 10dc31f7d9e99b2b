//! Dice rolling

use async_trait::async_trait;
use rand::Rng;

use crate::application::errors::PluginResult;
use crate::application::messaging::Trigger;
use crate::domain::entities::InboundMessage;
use crate::plugins::trait_def::{Plugin, PluginBase, PluginContext};

const COMMANDS: &[&str] = &["!dice", "!roll"];
const DEFAULT_SIDES: u32 = 6;
const MAX_SIDES: u32 = 1000;

/// Rolls a die for the chatter: `!dice`, `!roll` or `!roll 20`
pub struct DicePlugin {
    base: PluginBase,
}

impl DicePlugin {
    pub fn new() -> Self {
        Self {
            base: PluginBase::new("Dice Roller"),
        }
    }

    /// Number of sides asked for. Anything unusable falls back to six.
    fn sides(trigger: &Trigger) -> u32 {
        trigger
            .arg(0)
            .and_then(|s| s.trim_start_matches('d').parse::<u32>().ok())
            .filter(|n| (2..=MAX_SIDES).contains(n))
            .unwrap_or(DEFAULT_SIDES)
    }
}

impl Default for DicePlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for DicePlugin {
    fn name(&self) -> &str {
        "Dice Roller"
    }

    fn description(&self) -> &str {
        "Adds dice rolling commands to the bot"
    }

    fn commands(&self) -> &[&str] {
        COMMANDS
    }

    fn initialize(&mut self, ctx: PluginContext) -> PluginResult<()> {
        self.base.attach(ctx);
        Ok(())
    }

    async fn handle(&self, message: &InboundMessage) -> PluginResult<()> {
        let Some(trigger) = Trigger::parse(message.raw_text()) else {
            return Ok(());
        };
        // `!dice` takes nothing, `!roll` may take a side count
        if !trigger.is_any(COMMANDS) || (trigger.name == "!dice" && !trigger.is_bare()) {
            return Ok(());
        }

        let sides = if trigger.name == "!roll" {
            Self::sides(&trigger)
        } else {
            DEFAULT_SIDES
        };
        let roll = rand::thread_rng().gen_range(1..=sides);

        let text = format!("{} rolled a {} 🎲", message.sender(), roll);
        self.base.reply(message, &text).await
    }
}
