//! Console transport for local development
//!
//! Every stdin line is posted to the configured channel as user `console`;
//! whatever the bot sends is printed.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::application::errors::TransportError;
use crate::domain::entities::normalize_channel;
use crate::domain::traits::{ChatTransport, TransportEvent};

/// Name console input is attributed to
pub const CONSOLE_USER: &str = "console";

pub struct ConsoleTransport {
    channel: String,
    connected: AtomicBool,
    joined: RwLock<Vec<String>>,
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<TransportEvent>>>>,
}

impl ConsoleTransport {
    pub fn new(channel: impl AsRef<str>) -> Self {
        Self {
            channel: normalize_channel(channel.as_ref()),
            connected: AtomicBool::new(false),
            joined: RwLock::new(Vec::new()),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn emit(&self, event: TransportEvent) {
        broadcast(&self.subscribers, event);
    }
}

fn broadcast(subscribers: &Mutex<Vec<mpsc::UnboundedSender<TransportEvent>>>, event: TransportEvent) {
    if let Ok(mut subscribers) = subscribers.lock() {
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        tracing::info!("Starting console transport (dev mode)");
        self.connected.store(true, Ordering::SeqCst);

        let subscribers = Arc::clone(&self.subscribers);
        let channel = self.channel.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => continue,
                    Ok(Some(line)) => broadcast(
                        &subscribers,
                        TransportEvent::MessageReceived {
                            channel: channel.clone(),
                            sender: CONSOLE_USER.to_string(),
                            text: line.trim().to_string(),
                        },
                    ),
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
            broadcast(
                &subscribers,
                TransportEvent::Disconnected {
                    reason: "console input closed".to_string(),
                },
            );
        });

        self.emit(TransportEvent::Connected);
        Ok(())
    }

    async fn join_channel(&self, channel: &str) -> Result<(), TransportError> {
        let channel = normalize_channel(channel);
        if channel.is_empty() {
            return Err(TransportError::InvalidChannel(channel));
        }
        if let Ok(mut joined) = self.joined.write() {
            if !joined.contains(&channel) {
                joined.push(channel.clone());
            }
        }
        self.emit(TransportEvent::Joined { channel });
        Ok(())
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        println!("[#{}] {}", normalize_channel(channel), text);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn joined_channels(&self) -> Vec<String> {
        self.joined.read().map(|j| j.clone()).unwrap_or_default()
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<TransportEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_join_is_recorded() {
        let console = ConsoleTransport::new("#Dev");
        let mut events = console.subscribe();

        console.join_channel("#Dev").await.unwrap();
        console.join_channel("dev").await.unwrap();

        assert_eq!(console.joined_channels(), vec!["dev".to_string()]);
        assert_eq!(
            events.recv().await.unwrap(),
            TransportEvent::Joined { channel: "dev".to_string() }
        );
    }

    #[tokio::test]
    async fn test_send_before_connect_fails() {
        let console = ConsoleTransport::new("dev");
        assert!(matches!(
            console.send_message("dev", "hi").await,
            Err(TransportError::NotConnected)
        ));
    }
}
