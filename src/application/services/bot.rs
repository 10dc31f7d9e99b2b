//! Bot orchestrator - owns the shared handles and drives the event loop

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::application::errors::{BotError, TransportError};
use crate::application::messaging::{CoreEvent, DispatchCore, DispatchReport, Observer};
use crate::domain::entities::{normalize_channel, InboundMessage};
use crate::domain::traits::{ChatTransport, PlatformApi, TransportEvent};
use crate::plugins::{PluginContext, PluginRegistry};

/// How often `joined_channels` is polled while waiting for a join
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Settings the orchestrator needs, bound once at startup
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub channel: String,
    /// Sent once after joining. Empty means no announcement.
    pub announcement: String,
    pub connect_timeout: Duration,
    pub join_timeout: Duration,
}

impl BotSettings {
    pub fn new(channel: impl AsRef<str>) -> Self {
        Self {
            channel: normalize_channel(channel.as_ref()),
            announcement: String::new(),
            connect_timeout: Duration::from_secs(10),
            join_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_announcement(mut self, text: impl Into<String>) -> Self {
        self.announcement = text.into();
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, join: Duration) -> Self {
        self.connect_timeout = connect;
        self.join_timeout = join;
        self
    }
}

/// Joins the configured channel, announces the bot and reports channel
/// diagnostics. Cheap to clone so a reconnect can run it on its own task.
#[derive(Clone)]
struct ChannelSetup {
    settings: BotSettings,
    transport: Arc<dyn ChatTransport>,
    platform: Arc<dyn PlatformApi>,
    observer: Arc<dyn Observer>,
}

impl ChannelSetup {
    /// Nothing in here is fatal; failures are reported and setup moves on.
    async fn run(&self) {
        let channel = self.settings.channel.as_str();

        match self.join_and_wait(channel).await {
            Ok(()) => self.observer.observe(CoreEvent::Joined {
                channels: self.transport.joined_channels(),
            }),
            Err(e) => self.observer.observe(CoreEvent::JoinFailed {
                channel: channel.to_string(),
                error: e.to_string(),
            }),
        }

        if !self.settings.announcement.is_empty() {
            if let Err(e) = self
                .transport
                .send_message(channel, &self.settings.announcement)
                .await
            {
                self.observer.observe(CoreEvent::AnnouncementFailed { error: e.to_string() });
            }
        }

        self.report_channel_info(channel).await;
        tracing::info!("Client is connected: {}", self.transport.is_connected());
    }

    async fn join_and_wait(&self, channel: &str) -> Result<(), BotError> {
        self.transport.join_channel(channel).await?;

        let joined = tokio::time::timeout(self.settings.join_timeout, async {
            loop {
                if self.transport.joined_channels().iter().any(|c| c == channel) {
                    return;
                }
                tokio::time::sleep(JOIN_POLL_INTERVAL).await;
            }
        })
        .await;

        joined.map_err(|_| BotError::JoinTimeout {
            channel: channel.to_string(),
            secs: self.settings.join_timeout.as_secs(),
        })
    }

    /// Read-only lookup of the channel's title and game, for the operator
    async fn report_channel_info(&self, channel: &str) {
        let users = match self.platform.get_users(&[channel.to_string()]).await {
            Ok(users) => users,
            Err(e) => {
                self.observer.observe(CoreEvent::ChannelLookupFailed { error: e.to_string() });
                return;
            }
        };

        let Some(user) = users.first() else {
            self.observer.observe(CoreEvent::ChannelLookupFailed {
                error: format!("Could not find user {}", channel),
            });
            return;
        };

        match self.platform.get_channel_info(&user.id).await {
            Ok(Some(info)) => self.observer.observe(CoreEvent::ChannelInfo {
                title: info.title,
                game: info.game_name,
            }),
            Ok(None) => self.observer.observe(CoreEvent::ChannelLookupFailed {
                error: format!("No channel information for {}", channel),
            }),
            Err(e) => self.observer.observe(CoreEvent::ChannelLookupFailed { error: e.to_string() }),
        }
    }
}

/// The bot: connects the transport, sets up the channel and feeds every
/// chat message into the dispatch core
pub struct Bot {
    channel_setup: ChannelSetup,
    core: DispatchCore,
    observer: Arc<dyn Observer>,
    events: Option<mpsc::UnboundedReceiver<TransportEvent>>,
    /// Events that arrived while `start` was waiting for the connection
    pending: VecDeque<TransportEvent>,
    tasks: JoinSet<DispatchReport>,
    /// Setup re-runs after a reconnect
    setups: JoinSet<()>,
}

impl Bot {
    /// Initialize every registered plugin with the shared handles and
    /// subscribe to the transport
    pub fn new(
        settings: BotSettings,
        transport: Arc<dyn ChatTransport>,
        platform: Arc<dyn PlatformApi>,
        mut registry: PluginRegistry,
    ) -> Result<Self, BotError> {
        let observer = registry.observer();
        let ctx = PluginContext::new(Arc::clone(&transport), Arc::clone(&platform));
        registry.initialize_all(ctx)?;
        let core = DispatchCore::new(registry)?;
        let events = transport.subscribe();

        Ok(Self {
            channel_setup: ChannelSetup {
                settings,
                transport,
                platform,
                observer: Arc::clone(&observer),
            },
            core,
            observer,
            events: Some(events),
            pending: VecDeque::new(),
            tasks: JoinSet::new(),
            setups: JoinSet::new(),
        })
    }

    /// Connect, wait for the connection to come up, then set up the channel
    ///
    /// Fails without running setup when the transport does not report
    /// `Connected` within the connect timeout.
    pub async fn start(&mut self) -> Result<(), BotError> {
        self.observer.observe(CoreEvent::Connecting);
        self.channel_setup.transport.connect().await?;
        self.wait_for_connected().await?;
        self.observer.observe(CoreEvent::Connected);

        self.setup().await;
        tracing::info!("Bot setup completed");
        Ok(())
    }

    async fn wait_for_connected(&mut self) -> Result<(), BotError> {
        let timeout = self.channel_setup.settings.connect_timeout;
        let secs = timeout.as_secs();
        let pending = &mut self.pending;
        let events = self
            .events
            .as_mut()
            .ok_or_else(|| BotError::Internal("event stream already taken".to_string()))?;

        let waited = tokio::time::timeout(timeout, async {
            while let Some(event) = events.recv().await {
                match event {
                    TransportEvent::Connected => return Ok(()),
                    TransportEvent::Disconnected { reason } => return Err(reason),
                    other => pending.push_back(other),
                }
            }
            Err("event stream closed".to_string())
        })
        .await;

        match waited {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reason)) => {
                self.observer.observe(CoreEvent::Disconnected { reason: reason.clone() });
                Err(TransportError::Closed(reason).into())
            }
            Err(_) => {
                self.observer.observe(CoreEvent::ConnectTimedOut { secs });
                Err(BotError::ConnectTimeout(secs))
            }
        }
    }

    /// Join the channel, announce ourselves and log channel diagnostics
    pub async fn setup(&self) {
        self.channel_setup.run().await;
    }

    /// Process transport events until the transport disconnects
    ///
    /// Each chat message gets its own fan-out task, so a slow plugin never
    /// holds up the next message.
    pub async fn run(&mut self) -> Result<(), BotError> {
        let mut events = self
            .events
            .take()
            .ok_or_else(|| BotError::Internal("event stream already taken".to_string()))?;

        while let Some(event) = self.pending.pop_front() {
            if !self.handle_event(event) {
                return Ok(());
            }
        }

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        self.observer.observe(CoreEvent::Disconnected {
                            reason: "event stream closed".to_string(),
                        });
                        return Ok(());
                    };
                    if !self.handle_event(event) {
                        return Ok(());
                    }
                }
                Some(finished) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    if let Err(e) = finished {
                        tracing::error!("Dispatch task failed: {}", e);
                    }
                }
                Some(finished) = self.setups.join_next(), if !self.setups.is_empty() => {
                    if let Err(e) = finished {
                        tracing::error!("Setup task failed: {}", e);
                    }
                }
            }
        }
    }

    /// Returns false when the loop should stop
    fn handle_event(&mut self, event: TransportEvent) -> bool {
        match event {
            TransportEvent::MessageReceived { channel, sender, text } => {
                self.dispatch(InboundMessage::new(channel, sender, text));
                true
            }
            TransportEvent::Connected => {
                self.observer.observe(CoreEvent::Connected);
                // Chat keeps flowing while the channel is set up again
                let setup = self.channel_setup.clone();
                self.setups.spawn(async move { setup.run().await });
                true
            }
            TransportEvent::Joined { channel } => {
                tracing::debug!("Joined #{}", channel);
                true
            }
            TransportEvent::Disconnected { reason } => {
                self.observer.observe(CoreEvent::Disconnected { reason });
                false
            }
        }
    }

    /// Fan a message out on its own task
    pub fn dispatch(&mut self, message: InboundMessage) {
        let core = self.core.clone();
        self.tasks.spawn(async move { core.fan_out(&message).await });
    }

    /// Abandon any setup still running and wait for every in-flight
    /// fan-out to finish
    pub async fn shutdown(&mut self) {
        self.setups.shutdown().await;
        while let Some(finished) = self.tasks.join_next().await {
            if let Err(e) = finished {
                tracing::error!("Dispatch task failed: {}", e);
            }
        }
    }
}
