//! Application services - Bot orchestration

pub mod bot;

pub use bot::{Bot, BotSettings};
