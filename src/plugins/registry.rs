//! Plugin registry - ordered plugin collection and its lifecycle

use std::sync::Arc;

use crate::application::errors::{PluginError, PluginResult};
use crate::application::messaging::observer::{CoreEvent, Observer, TracingObserver};
use crate::plugins::trait_def::{Plugin, PluginContext};

/// Registry of all chat plugins
///
/// Registration order is kept and is the order in which messages are fanned
/// out. Once `initialize_all` has run the registry is closed.
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
    initialized: bool,
    observer: Arc<dyn Observer>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::with_observer(Arc::new(TracingObserver))
    }

    pub fn with_observer(observer: Arc<dyn Observer>) -> Self {
        Self {
            plugins: Vec::new(),
            initialized: false,
            observer,
        }
    }

    /// Register a plugin
    pub fn register<P: Plugin + 'static>(&mut self, plugin: P) -> PluginResult<()> {
        self.register_boxed(Box::new(plugin))
    }

    pub fn register_boxed(&mut self, plugin: Box<dyn Plugin>) -> PluginResult<()> {
        let name = plugin.name().to_string();

        if self.initialized {
            return Err(PluginError::RegistrationClosed(name));
        }
        if self.has_plugin(&name) {
            return Err(PluginError::DuplicateName(name));
        }

        self.plugins.push(plugin);
        self.observer.observe(CoreEvent::PluginRegistered { plugin: name });
        Ok(())
    }

    /// Hand the shared handles to every plugin, in registration order
    ///
    /// The context's command list is filled in from the registry.
    pub fn initialize_all(&mut self, ctx: PluginContext) -> PluginResult<()> {
        if self.initialized {
            return Err(PluginError::AlreadyInitialized);
        }
        self.initialized = true;

        let ctx = ctx.with_commands(self.command_list());
        for plugin in self.plugins.iter_mut() {
            let name = plugin.name().to_string();
            match plugin.initialize(ctx.clone()) {
                Ok(()) => self.observer.observe(CoreEvent::PluginInitialized { plugin: name }),
                Err(e) => {
                    self.observer.observe(CoreEvent::PluginInitFailed {
                        plugin: name,
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// All plugins in registration order
    pub fn all(&self) -> &[Box<dyn Plugin>] {
        &self.plugins
    }

    pub fn names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name().to_string()).collect()
    }

    /// Every command of every plugin, in registration order, without duplicates
    pub fn command_list(&self) -> Vec<String> {
        let mut commands: Vec<String> = Vec::new();
        for command in self.plugins.iter().flat_map(|p| p.commands().iter()) {
            let command = command.to_lowercase();
            if !commands.contains(&command) {
                commands.push(command);
            }
        }
        commands
    }

    /// One line per plugin: `Name: !a, !b | Other: !c`
    pub fn help_listing(&self) -> String {
        self.plugins
            .iter()
            .map(|p| format!("{}: {}", p.name(), p.commands().join(", ")))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name().eq_ignore_ascii_case(name))
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn observer(&self) -> Arc<dyn Observer> {
        Arc::clone(&self.observer)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
