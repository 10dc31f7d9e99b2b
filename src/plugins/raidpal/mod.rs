//! RaidPal - raid coordination through the RaidPal REST API

pub mod models;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::{PluginError, PluginResult};
use crate::application::messaging::Trigger;
use crate::domain::entities::InboundMessage;
use crate::plugins::trait_def::{Clock, Plugin, PluginBase, PluginContext};
use models::{RaidPalUserResponse, RaidRequest, RaidResponse, RaidStats};

const COMMANDS: &[&str] = &["!raid", "!raidstats", "!events"];

/// RaidPal API endpoint
pub const API_BASE: &str = "https://api.raidpal.com/rest";

const REGISTER_URL: &str = "https://raidpal.com/";

/// How many upcoming events `!events` lists
const UPCOMING_LIMIT: usize = 3;

/// Connection settings for the RaidPal API
#[derive(Debug, Clone)]
pub struct RaidPalSettings {
    pub base_url: String,
    /// Overrides the bot's own client id
    pub client_id: Option<String>,
    /// Overrides the bot's own access token
    pub access_token: Option<String>,
    pub timeout: Duration,
}

impl Default for RaidPalSettings {
    fn default() -> Self {
        Self {
            base_url: API_BASE.to_string(),
            client_id: None,
            access_token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Blank config values count as unset
fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// `!raid <channel>`, `!raidstats` and `!events [@channel]`
pub struct RaidPalPlugin {
    base: PluginBase,
    settings: RaidPalSettings,
    client: Option<Client>,
    clock: Clock,
}

impl RaidPalPlugin {
    pub fn new(settings: RaidPalSettings) -> Self {
        Self {
            base: PluginBase::new("RaidPal"),
            settings,
            client: None,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Bearer token and client id: the plugin's own if configured, the
    /// bot's otherwise
    fn auth_headers(&self, ctx: &PluginContext) -> PluginResult<HeaderMap> {
        let bot = ctx.platform.credentials();
        let token = non_empty(self.settings.access_token.as_deref())
            .or_else(|| non_empty(bot.as_ref().map(|c| c.access_token.as_str())));
        let client_id = non_empty(self.settings.client_id.as_deref())
            .or_else(|| non_empty(bot.as_ref().map(|c| c.client_id.as_str())));

        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.trim_start_matches("oauth:")))
                .map_err(|e| PluginError::Failed(format!("Invalid RaidPal token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        if let Some(client_id) = client_id {
            let value = HeaderValue::from_str(&client_id)
                .map_err(|e| PluginError::Failed(format!("Invalid client id: {}", e)))?;
            headers.insert(HeaderName::from_static("client-id"), value);
        }
        Ok(headers)
    }

    fn client(&self) -> PluginResult<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| PluginError::NotInitialized("RaidPal".to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    async fn get(&self, path: &str) -> PluginResult<reqwest::Response> {
        self.client()?
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| PluginError::Http(e.to_string()))
    }

    /// Check both channels are on RaidPal, then create the raid event
    async fn raid(&self, channel: &str, username: &str, target: &str) -> PluginResult<String> {
        let source = self.get(&format!("/user/{}", channel)).await?;
        let destination = self.get(&format!("/user/{}", target)).await?;

        if source.status() == StatusCode::UNAUTHORIZED || destination.status() == StatusCode::UNAUTHORIZED {
            return Ok(format!(
                "@{} Authentication error. Please reconnect your Twitch account to RaidPal.",
                username
            ));
        }
        if !source.status().is_success() || !destination.status().is_success() {
            return Ok(format!(
                "@{} Both channels need to be registered on RaidPal! Register at {}",
                username, REGISTER_URL
            ));
        }

        let response = self
            .client()?
            .post(self.url("/events"))
            .json(&RaidRequest {
                source: channel,
                target,
                initiator: username,
            })
            .send()
            .await
            .map_err(|e| PluginError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(format!("@{} Failed to initiate raid. Please try again later.", username));
        }

        if let Ok(created) = response.json::<RaidResponse>().await {
            tracing::info!(
                "RaidPal raid {} -> {} created (id: {:?}, status: {:?})",
                channel,
                target,
                created.raid_id,
                created.status
            );
        }
        Ok(format!(
            "@{} Raid initiated to {}! Join the raid train! Check details at {}",
            username, target, REGISTER_URL
        ))
    }

    async fn raid_stats(&self, channel: &str, username: &str) -> PluginResult<String> {
        let response = self.get(&format!("/stats/{}", channel)).await?;
        if !response.status().is_success() {
            return Ok(format!("@{} Unable to fetch raid stats at this time.", username));
        }

        let stats: RaidStats = response
            .json()
            .await
            .map_err(|e| PluginError::Http(e.to_string()))?;
        Ok(format!(
            "@{} Raid Stats: Raids Led: {}, Participated In: {}, Total Impact: {} viewers",
            username, stats.raids_led, stats.raids_participated, stats.total_impact
        ))
    }

    async fn events(&self, channel: &str, username: &str, target: Option<&str>) -> PluginResult<String> {
        let lookup = target.unwrap_or(channel);
        let response = self.get(&format!("/user/{}", lookup)).await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                return Ok(format!(
                    "@{} Authentication error. The bot needs to be reconnected to RaidPal.",
                    username
                ))
            }
            StatusCode::NOT_FOUND => {
                return Ok(format!("@{} User not found on RaidPal. Register at {}", username, REGISTER_URL))
            }
            status if !status.is_success() => {
                return Ok(format!("@{} Unable to fetch events for {}", username, lookup))
            }
            _ => {}
        }

        let body: RaidPalUserResponse = response
            .json()
            .await
            .map_err(|e| PluginError::Http(e.to_string()))?;
        let Some(user) = body.user else {
            return Ok(format!("@{} Not on RaidPal? Register at {}", username, REGISTER_URL));
        };

        let upcoming = user.upcoming((self.clock)(), UPCOMING_LIMIT);
        if upcoming.is_empty() {
            return Ok(format!("@{} No upcoming events found for {}", username, user.display_name));
        }

        let list = upcoming
            .iter()
            .map(|e| format!("{} ({} UTC)", e.title, e.starttime.format("%b %d %H:%M")))
            .collect::<Vec<_>>()
            .join(" | ");
        Ok(format!("@{} Upcoming events for {}: {}", username, user.display_name, list))
    }
}

#[async_trait]
impl Plugin for RaidPalPlugin {
    fn name(&self) -> &str {
        "RaidPal"
    }

    fn description(&self) -> &str {
        "Coordinates raids and lists upcoming raid train events from RaidPal"
    }

    fn commands(&self) -> &[&str] {
        COMMANDS
    }

    fn initialize(&mut self, ctx: PluginContext) -> PluginResult<()> {
        let client = Client::builder()
            .default_headers(self.auth_headers(&ctx)?)
            .timeout(self.settings.timeout)
            .build()
            .map_err(|e| PluginError::Http(e.to_string()))?;
        self.client = Some(client);
        self.base.attach(ctx);
        Ok(())
    }

    async fn handle(&self, message: &InboundMessage) -> PluginResult<()> {
        let Some(trigger) = Trigger::parse(message.raw_text()) else {
            return Ok(());
        };
        let channel = message.channel();
        let username = message.sender();

        let (result, apology) = match trigger.name.as_str() {
            "!raid" => {
                let target = trigger.arg(0).map(|t| t.trim_start_matches('@')).filter(|t| !t.is_empty());
                let Some(target) = target else {
                    let usage = format!("@{} Usage: !raid <channel>", username);
                    return self.base.reply(message, &usage).await;
                };
                (
                    self.raid(channel, username, target).await,
                    "Sorry, there was an error processing your raid request.",
                )
            }
            "!raidstats" if trigger.is_bare() => (
                self.raid_stats(channel, username).await,
                "Sorry, there was an error fetching your raid stats.",
            ),
            "!events" => {
                let target = trigger.arg(0).map(|t| t.trim_start_matches('@'));
                (
                    self.events(channel, username, target).await,
                    "Sorry, there was an error fetching events.",
                )
            }
            _ => return Ok(()),
        };

        let text = match result {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Error in RaidPal API call for #{}: {}", channel, e);
                format!("@{} {}", username, apology)
            }
        };
        self.base.reply(message, &text).await
    }
}
