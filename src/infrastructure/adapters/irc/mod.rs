//! Twitch chat adapter over plain IRC

pub mod message;

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::application::errors::TransportError;
use crate::domain::entities::normalize_channel;
use crate::domain::traits::{ChatTransport, TransportEvent};
pub use message::IrcMessage;

/// Twitch chat server
pub const DEFAULT_HOST: &str = "irc.chat.twitch.tv";
pub const DEFAULT_PORT: u16 = 6667;

/// Login details for the chat server
#[derive(Clone)]
pub struct IrcSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Chat token, with or without the `oauth:` prefix
    pub token: String,
}

impl std::fmt::Debug for IrcSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IrcSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// State shared between the transport handle and its reader task
struct Shared {
    username: String,
    connected: AtomicBool,
    joined: RwLock<Vec<String>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<TransportEvent>>>,
}

impl Shared {
    fn new(username: &str) -> Self {
        Self {
            username: username.to_lowercase(),
            connected: AtomicBool::new(false),
            joined: RwLock::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Deliver to every live subscriber, forgetting the closed ones
    fn emit(&self, event: TransportEvent) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    fn is_self(&self, msg: &IrcMessage) -> bool {
        msg.nick().map(|n| n.eq_ignore_ascii_case(&self.username)).unwrap_or(false)
    }

    /// React to one server line. Replies (PONG) go to `outbound`.
    fn handle_line(&self, line: &str, outbound: &mpsc::UnboundedSender<String>) {
        let Some(msg) = IrcMessage::parse(line) else {
            return;
        };

        match msg.command.as_str() {
            "PING" => {
                let server = msg.param(0).unwrap_or("tmi.twitch.tv");
                let _ = outbound.send(format!("PONG :{}", server));
            }
            "001" => {
                self.connected.store(true, Ordering::SeqCst);
                tracing::info!("Logged in as | {}", self.username);
                self.emit(TransportEvent::Connected);
            }
            "JOIN" if self.is_self(&msg) => {
                let Some(channel) = msg.param(0).map(normalize_channel) else {
                    return;
                };
                if let Ok(mut joined) = self.joined.write() {
                    if !joined.contains(&channel) {
                        joined.push(channel.clone());
                    }
                }
                self.emit(TransportEvent::Joined { channel });
            }
            "PART" if self.is_self(&msg) => {
                if let Some(channel) = msg.param(0).map(normalize_channel) {
                    if let Ok(mut joined) = self.joined.write() {
                        joined.retain(|c| c != &channel);
                    }
                }
            }
            "PRIVMSG" => {
                let (Some(channel), Some(text)) = (msg.param(0), msg.param(1)) else {
                    return;
                };
                let sender = msg
                    .tag("display-name")
                    .or_else(|| msg.nick())
                    .unwrap_or("unknown")
                    .to_string();
                self.emit(TransportEvent::MessageReceived {
                    channel: normalize_channel(channel),
                    sender,
                    text: text.to_string(),
                });
            }
            "NOTICE" => {
                let text = msg.params.last().map(|s| s.as_str()).unwrap_or_default();
                tracing::warn!("Server notice: {}", text);
            }
            "RECONNECT" => tracing::warn!("Server asked us to reconnect"),
            _ => {}
        }
    }

    fn disconnected(&self, reason: String) {
        self.connected.store(false, Ordering::SeqCst);
        if let Ok(mut joined) = self.joined.write() {
            joined.clear();
        }
        self.emit(TransportEvent::Disconnected { reason });
    }
}

/// Chat transport speaking the Twitch flavour of IRC
pub struct IrcTransport {
    settings: IrcSettings,
    shared: Arc<Shared>,
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
}

impl IrcTransport {
    pub fn new(settings: IrcSettings) -> Self {
        let shared = Arc::new(Shared::new(&settings.username));
        Self {
            settings,
            shared,
            outbound: Mutex::new(None),
        }
    }

    fn send_raw(&self, line: String) -> Result<(), TransportError> {
        let outbound = self
            .outbound
            .lock()
            .map_err(|_| TransportError::Closed("outbound lock poisoned".to_string()))?;
        let tx = outbound.as_ref().ok_or(TransportError::NotConnected)?;
        tx.send(line)
            .map_err(|_| TransportError::Closed("writer stopped".to_string()))
    }
}

/// Chat lines cannot carry line breaks
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

#[async_trait]
impl ChatTransport for IrcTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        tracing::info!("Connecting to {}:{}", self.settings.host, self.settings.port);
        let stream = TcpStream::connect((self.settings.host.as_str(), self.settings.port)).await?;
        let (read_half, mut write_half) = stream.into_split();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                let framed = format!("{}\r\n", line);
                if let Err(e) = write_half.write_all(framed.as_bytes()).await {
                    tracing::error!("Failed to write to chat socket: {}", e);
                    break;
                }
            }
        });

        let shared = Arc::clone(&self.shared);
        let pong_tx = tx.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(read_half).lines();
            let reason = loop {
                match lines.next_line().await {
                    Ok(Some(line)) => shared.handle_line(&line, &pong_tx),
                    Ok(None) => break "connection closed by server".to_string(),
                    Err(e) => break e.to_string(),
                }
            };
            shared.disconnected(reason);
        });

        let token = if self.settings.token.starts_with("oauth:") {
            self.settings.token.clone()
        } else {
            format!("oauth:{}", self.settings.token)
        };
        let login = [
            "CAP REQ :twitch.tv/tags twitch.tv/commands".to_string(),
            format!("PASS {}", token),
            format!("NICK {}", self.settings.username.to_lowercase()),
        ];
        for line in login {
            tx.send(line)
                .map_err(|_| TransportError::Closed("writer stopped".to_string()))?;
        }

        if let Ok(mut outbound) = self.outbound.lock() {
            *outbound = Some(tx);
        }
        Ok(())
    }

    async fn join_channel(&self, channel: &str) -> Result<(), TransportError> {
        let channel = normalize_channel(channel);
        if channel.is_empty() || channel.contains(char::is_whitespace) {
            return Err(TransportError::InvalidChannel(channel));
        }
        tracing::info!("Attempting to join channel: {}", channel);
        self.send_raw(format!("JOIN #{}", channel))
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        tracing::debug!("Sending to #{}: {}", channel, text);
        self.send_raw(format!("PRIVMSG #{} :{}", normalize_channel(channel), single_line(text)))
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    fn joined_channels(&self) -> Vec<String> {
        self.shared.joined.read().map(|j| j.clone()).unwrap_or_default()
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<TransportEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subscribers) = self.shared.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }
}
