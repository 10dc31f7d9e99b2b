//! gauntly-bot - a Twitch chat bot built around plugins
//!
//! Chat messages arrive through a [`domain::traits::ChatTransport`], are
//! fanned out to every registered [`plugins::Plugin`] by the
//! [`application::messaging::DispatchCore`], and the
//! [`application::services::Bot`] ties the lifecycle together.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod plugins;
