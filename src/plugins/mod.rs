//! Plugin system for gauntly-bot
//!
//! Every plugin implements [`Plugin`]; the [`PluginRegistry`] keeps them in
//! registration order and the dispatch core offers each chat message to all
//! of them.

pub mod ai;
pub mod basic;
pub mod dice;
pub mod raidpal;
pub mod registry;
pub mod trait_def;
pub mod uptime;

pub use ai::AskPlugin;
pub use basic::BasicCommandsPlugin;
pub use dice::DicePlugin;
pub use raidpal::RaidPalPlugin;
pub use registry::PluginRegistry;
pub use trait_def::{Clock, Plugin, PluginBase, PluginContext};
pub use uptime::UptimePlugin;
