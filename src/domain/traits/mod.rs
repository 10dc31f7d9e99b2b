//! Domain traits - Abstractions for infrastructure implementations

pub mod platform;
pub mod transport;

pub use platform::PlatformApi;
pub use transport::{ChatTransport, TransportEvent};
