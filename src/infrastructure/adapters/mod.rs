//! Chat transports

pub mod console;
pub mod irc;

pub use console::ConsoleTransport;
pub use irc::{IrcSettings, IrcTransport};
