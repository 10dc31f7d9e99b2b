//! Shared fakes for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once, RwLock};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

use gauntly_bot::application::errors::{PlatformError, PluginError, PluginResult, TransportError};
use gauntly_bot::domain::entities::{
    normalize_channel, ApiCredentials, ChannelInfo, InboundMessage, PlatformUser, StreamInfo,
};
use gauntly_bot::domain::traits::{ChatTransport, PlatformApi, TransportEvent};
use gauntly_bot::plugins::{Plugin, PluginBase, PluginContext};

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// In-memory chat transport that records every send
pub struct FakeTransport {
    connected: AtomicBool,
    /// Emit `Connected` from `connect`
    pub auto_connect: AtomicBool,
    /// Confirm joins immediately
    pub auto_join: AtomicBool,
    joined: RwLock<Vec<String>>,
    sent: Mutex<Vec<(String, String)>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<TransportEvent>>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            connected: AtomicBool::new(false),
            auto_connect: AtomicBool::new(true),
            auto_join: AtomicBool::new(true),
            joined: RwLock::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    /// Connected from the start, for tests that skip `Bot::start`
    pub fn connected() -> Arc<Self> {
        let transport = Self::new();
        transport.connected.store(true, Ordering::SeqCst);
        transport
    }

    pub fn emit(&self, event: TransportEvent) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn chat(&self, channel: &str, sender: &str, text: &str) {
        self.emit(TransportEvent::MessageReceived {
            channel: channel.to_string(),
            sender: sender.to_string(),
            text: text.to_string(),
        });
    }

    /// Drop every confirmed join, as a server does on reconnect
    pub fn forget_joins(&self) {
        self.joined.write().unwrap().clear();
    }

    /// Every `(channel, text)` sent so far
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        if self.auto_connect.load(Ordering::SeqCst) {
            self.connected.store(true, Ordering::SeqCst);
            self.emit(TransportEvent::Connected);
        }
        Ok(())
    }

    async fn join_channel(&self, channel: &str) -> Result<(), TransportError> {
        if self.auto_join.load(Ordering::SeqCst) {
            let channel = normalize_channel(channel);
            self.joined.write().unwrap().push(channel.clone());
            self.emit(TransportEvent::Joined { channel });
        }
        Ok(())
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.sent
            .lock()
            .unwrap()
            .push((normalize_channel(channel), text.to_string()));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn joined_channels(&self) -> Vec<String> {
        self.joined.read().unwrap().clone()
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<TransportEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }
}

/// Scripted platform API that counts every call
#[derive(Default)]
pub struct FakePlatform {
    pub streams: Mutex<Vec<StreamInfo>>,
    pub users: Mutex<Vec<PlatformUser>>,
    pub channel: Mutex<Option<ChannelInfo>>,
    pub fail: AtomicBool,
    pub credentials: Option<ApiCredentials>,
    calls: AtomicUsize,
}

impl FakePlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_credentials(token: &str, client_id: &str) -> Arc<Self> {
        Arc::new(Self {
            credentials: Some(ApiCredentials {
                access_token: token.to_string(),
                client_id: client_id.to_string(),
            }),
            ..Self::default()
        })
    }

    pub fn set_live(&self, login: &str, started_at: DateTime<Utc>) {
        *self.streams.lock().unwrap() = vec![StreamInfo {
            user_login: login.to_string(),
            title: "Live!".to_string(),
            game_name: "Just Chatting".to_string(),
            viewer_count: 42,
            started_at,
        }];
    }

    pub fn set_offline(&self) {
        self.streams.lock().unwrap().clear();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) -> Result<(), PlatformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PlatformError::Status(503));
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn get_users(&self, logins: &[String]) -> Result<Vec<PlatformUser>, PlatformError> {
        self.record_call()?;
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .filter(|u| logins.iter().any(|l| l.eq_ignore_ascii_case(&u.login)))
            .cloned()
            .collect())
    }

    async fn get_channel_info(&self, _user_id: &str) -> Result<Option<ChannelInfo>, PlatformError> {
        self.record_call()?;
        Ok(self.channel.lock().unwrap().clone())
    }

    async fn get_streams(&self, _logins: &[String]) -> Result<Vec<StreamInfo>, PlatformError> {
        self.record_call()?;
        Ok(self.streams.lock().unwrap().clone())
    }

    fn credentials(&self) -> Option<ApiCredentials> {
        self.credentials.clone()
    }
}

/// What a `Recorder` does after recording the message
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail,
    Panic,
}

/// Records `"<name>:<text>"` into a shared log for every message it sees
pub struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    behavior: Behavior,
}

impl Recorder {
    pub fn new(name: &'static str, log: &Arc<Mutex<Vec<String>>>, behavior: Behavior) -> Self {
        Self {
            name,
            log: Arc::clone(log),
            behavior,
        }
    }
}

#[async_trait]
impl Plugin for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "records every message"
    }

    fn commands(&self) -> &[&str] {
        &[]
    }

    fn initialize(&mut self, _ctx: PluginContext) -> PluginResult<()> {
        Ok(())
    }

    async fn handle(&self, message: &InboundMessage) -> PluginResult<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.name, message.raw_text()));
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(PluginError::Failed("recorded failure".to_string())),
            Behavior::Panic => panic!("recorded panic"),
        }
    }
}

/// Answers `!slow` only after `release` is notified
pub struct GatedPlugin {
    base: PluginBase,
    pub gate: Arc<Notify>,
    pub started: Arc<AtomicUsize>,
    pub finished: Arc<AtomicUsize>,
}

impl GatedPlugin {
    pub fn new() -> Self {
        Self {
            base: PluginBase::new("Gated"),
            gate: Arc::new(Notify::new()),
            started: Arc::new(AtomicUsize::new(0)),
            finished: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Plugin for GatedPlugin {
    fn name(&self) -> &str {
        "Gated"
    }

    fn description(&self) -> &str {
        "waits on a gate before replying"
    }

    fn commands(&self) -> &[&str] {
        &["!slow"]
    }

    fn initialize(&mut self, ctx: PluginContext) -> PluginResult<()> {
        self.base.attach(ctx);
        Ok(())
    }

    async fn handle(&self, message: &InboundMessage) -> PluginResult<()> {
        if !message.raw_text().trim().starts_with("!slow") {
            return Ok(());
        }
        self.started.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        self.base.reply(message, "slow answer").await
    }
}

/// Poll `condition` every 10ms until it holds or two seconds pass
pub async fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

pub fn context(transport: &Arc<FakeTransport>, platform: &Arc<FakePlatform>) -> PluginContext {
    let transport: Arc<dyn ChatTransport> = transport.clone();
    let platform: Arc<dyn PlatformApi> = platform.clone();
    PluginContext::new(transport, platform)
}

pub fn message(channel: &str, sender: &str, text: &str) -> InboundMessage {
    InboundMessage::new(channel, sender, text)
}
