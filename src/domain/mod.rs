//! Domain layer - Core types with no infrastructure dependencies
//!
//! This layer contains:
//! - Entities: Inbound chat messages and platform records
//! - Traits: The chat transport and platform API capabilities the bot consumes

pub mod entities;
pub mod traits;
