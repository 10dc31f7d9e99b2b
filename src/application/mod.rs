//! Application layer - Dispatch and orchestration
//!
//! This layer contains:
//! - Errors: Error enums for every layer
//! - Messaging: The fan-out dispatch core, trigger parsing, observers
//! - Services: The bot orchestrator

pub mod errors;
pub mod messaging;
pub mod services;
