//! Dispatch core - fans every inbound message out to every plugin

use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::application::errors::PluginError;
use crate::domain::entities::InboundMessage;
use crate::plugins::PluginRegistry;
use super::observer::{CoreEvent, Observer};

/// What happened when one plugin handled one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    Failed(String),
    Panicked,
}

/// Per-plugin outcomes of one fan-out, in registration order
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<(String, Outcome)>,
}

impl DispatchReport {
    /// Number of plugins the message was offered to
    pub fn delivered(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o != Outcome::Handled)
            .count()
    }

    pub fn plugins(&self) -> Vec<&str> {
        self.outcomes.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn outcome(&self, plugin: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == plugin)
            .map(|(_, o)| o)
    }
}

/// Delivers each message to every registered plugin
///
/// There is no routing table: every plugin sees every message and filters
/// for itself. Handlers are started in registration order and driven
/// together, so a handler that waits on the network does not hold back the
/// plugins after it. A handler that returns an error or panics is reported
/// and the rest of the fan-out carries on.
///
/// Cloning is cheap; clones share the registry.
#[derive(Clone)]
pub struct DispatchCore {
    registry: Arc<PluginRegistry>,
    observer: Arc<dyn Observer>,
}

impl DispatchCore {
    /// Build a dispatcher over an initialized registry
    pub fn new(registry: PluginRegistry) -> Result<Self, PluginError> {
        if !registry.is_initialized() {
            return Err(PluginError::NotInitialized("plugin registry".to_string()));
        }
        let observer = registry.observer();
        Ok(Self {
            registry: Arc::new(registry),
            observer,
        })
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Offer `message` to every plugin
    pub async fn fan_out(&self, message: &InboundMessage) -> DispatchReport {
        self.observer.observe(CoreEvent::MessageReceived {
            channel: message.channel().to_string(),
            sender: message.sender().to_string(),
        });

        let handlers = self.registry.all().iter().map(|plugin| {
            let observer = &self.observer;
            async move {
                let name = plugin.name().to_string();
                let outcome = match AssertUnwindSafe(plugin.handle(message)).catch_unwind().await {
                    Ok(Ok(())) => Outcome::Handled,
                    Ok(Err(e)) => {
                        observer.observe(CoreEvent::PluginFailed {
                            plugin: name.clone(),
                            channel: message.channel().to_string(),
                            error: e.to_string(),
                        });
                        Outcome::Failed(e.to_string())
                    }
                    Err(_) => {
                        observer.observe(CoreEvent::PluginPanicked {
                            plugin: name.clone(),
                            channel: message.channel().to_string(),
                        });
                        Outcome::Panicked
                    }
                };
                (name, outcome)
            }
        });

        let report = DispatchReport {
            outcomes: join_all(handlers).await,
        };

        self.observer.observe(CoreEvent::FanOutCompleted {
            channel: message.channel().to_string(),
            delivered: report.delivered(),
            failed: report.failed(),
        });
        report
    }
}
