//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: YAML and environment configuration
//! - Adapters: chat transports (Twitch IRC, console)
//! - Helix: Twitch platform API client
//! - LLM: chat completion providers

pub mod adapters;
pub mod config;
pub mod helix;
pub mod llm;
