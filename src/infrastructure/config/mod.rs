//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::application::errors::ConfigError;
use crate::application::services::BotSettings;
use crate::infrastructure::adapters::irc::{self, IrcSettings};
use crate::infrastructure::helix;
use crate::plugins::raidpal::{self, RaidPalSettings};

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub chat: ChatConfig,
    pub helix: HelixConfig,
    pub raidpal: RaidPalConfig,
    pub ai: AiConfig,
}

/// Account and channel the bot runs as
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub username: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub channel_name: String,
    pub announcement: String,
    pub connect_timeout_secs: u64,
    pub join_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChatConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HelixConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RaidPalConfig {
    pub enabled: bool,
    pub base_url: String,
    pub client_id: Option<String>,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AiConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub system_prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: f32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            access_token: String::new(),
            refresh_token: None,
            client_id: String::new(),
            client_secret: None,
            channel_name: String::new(),
            announcement: "Hello chat! GauntlyBot is now online! Type !commands to see what I can do!"
                .to_string(),
            connect_timeout_secs: 10,
            join_timeout_secs: 5,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            host: irc::DEFAULT_HOST.to_string(),
            port: irc::DEFAULT_PORT,
        }
    }
}

impl Default for HelixConfig {
    fn default() -> Self {
        Self {
            base_url: helix::API_BASE.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for RaidPalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: raidpal::API_BASE.to_string(),
            client_id: None,
            access_token: None,
            timeout_secs: 10,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: None,
            model: None,
            system_prompt: "You are a friendly Twitch chat bot. Answer in one or two short sentences."
                .to_string(),
            max_tokens: Some(150),
            temperature: 0.7,
        }
    }
}

/// Treat empty strings from the environment as unset
fn non_empty(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults plus whatever the environment provides
    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Overlay the process environment onto this config
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| var(key).and_then(non_empty);

        if let Some(v) = get("BOT_USERNAME") {
            self.bot.username = v;
        }
        if let Some(v) = get("BOT_ACCESS_TOKEN") {
            self.bot.access_token = v;
        }
        if let Some(v) = get("BOT_REFRESH_TOKEN") {
            self.bot.refresh_token = Some(v);
        }
        if let Some(v) = get("BOT_CLIENT_ID") {
            self.bot.client_id = v;
        }
        if let Some(v) = get("BOT_CLIENT_SECRET") {
            self.bot.client_secret = Some(v);
        }
        if let Some(v) = get("BOT_CHANNEL") {
            self.bot.channel_name = v;
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.ai.api_key = Some(v);
        }
        if let Some(v) = get("RAIDPAL_ACCESS_TOKEN") {
            self.raidpal.access_token = Some(v);
        }
    }

    /// Fields the bot cannot start without
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("bot.username", &self.bot.username),
            ("bot.access-token", &self.bot.access_token),
            ("bot.client-id", &self.bot.client_id),
            ("bot.channel-name", &self.bot.channel_name),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(name.to_string()));
            }
        }
        if self.chat.port == 0 {
            return Err(ConfigError::InvalidValue("chat.port must not be 0".to_string()));
        }
        Ok(())
    }

    /// Chat login password, always `oauth:`-prefixed
    pub fn chat_password(&self) -> String {
        let token = self.bot.access_token.trim();
        if token.starts_with("oauth:") {
            token.to_string()
        } else {
            format!("oauth:{}", token)
        }
    }

    /// Bearer token for the HTTP APIs, without the `oauth:` prefix
    pub fn api_token(&self) -> &str {
        self.bot.access_token.trim().trim_start_matches("oauth:")
    }

    /// OpenAI key when the AI plugin should run
    pub fn ai_key(&self) -> Option<&str> {
        if !self.ai.enabled {
            return None;
        }
        self.ai.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn bot_settings(&self) -> BotSettings {
        BotSettings::new(&self.bot.channel_name)
            .with_announcement(self.bot.announcement.clone())
            .with_timeouts(
                Duration::from_secs(self.bot.connect_timeout_secs),
                Duration::from_secs(self.bot.join_timeout_secs),
            )
    }

    pub fn irc_settings(&self) -> IrcSettings {
        IrcSettings {
            host: self.chat.host.clone(),
            port: self.chat.port,
            username: self.bot.username.clone(),
            token: self.chat_password(),
        }
    }

    pub fn raidpal_settings(&self) -> RaidPalSettings {
        RaidPalSettings {
            base_url: self.raidpal.base_url.clone(),
            client_id: self.raidpal.client_id.clone(),
            access_token: self.raidpal.access_token.clone(),
            timeout: Duration::from_secs(self.raidpal.timeout_secs),
        }
    }

    pub fn helix_timeout(&self) -> Duration {
        Duration::from_secs(self.helix.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn complete() -> Config {
        let mut config = Config::default();
        config.bot.username = "gauntlybot".to_string();
        config.bot.access_token = "abc123".to_string();
        config.bot.client_id = "cid".to_string();
        config.bot.channel_name = "#SomeChannel".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.chat.host, "irc.chat.twitch.tv");
        assert_eq!(config.chat.port, 6667);
        assert_eq!(config.bot.connect_timeout_secs, 10);
        assert_eq!(config.bot.join_timeout_secs, 5);
        assert!(config.raidpal.enabled);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "bot:\n  username: gauntlybot\n  channel-name: c1\nchat:\n  port: 6697\n";
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.bot.username, "gauntlybot");
        assert_eq!(config.bot.channel_name, "c1");
        assert_eq!(config.chat.port, 6697);
        assert_eq!(config.chat.host, "irc.chat.twitch.tv");
        assert_eq!(config.helix.base_url, "https://api.twitch.tv/helix");
    }

    #[test]
    fn test_yaml_written_by_init_config_loads_back() {
        let yaml = complete().to_yaml().unwrap();
        assert!(yaml.contains("channel-name"));
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.bot.client_id, "cid");
    }

    #[test]
    fn test_bad_yaml_is_a_parse_error() {
        assert!(matches!(Config::from_yaml("bot: ["), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_names_missing_field() {
        assert!(complete().validate().is_ok());

        let mut config = complete();
        config.bot.client_id.clear();
        match config.validate() {
            Err(ConfigError::MissingField(field)) => assert_eq!(field, "bot.client-id"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BOT_USERNAME", "envbot"),
            ("BOT_CHANNEL", "envchannel"),
            ("OPENAI_API_KEY", "sk-test"),
            ("BOT_CLIENT_ID", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = complete();
        config.apply_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.bot.username, "envbot");
        assert_eq!(config.bot.channel_name, "envchannel");
        assert_eq!(config.ai_key(), Some("sk-test"));
        assert_eq!(config.bot.client_id, "cid");
    }

    #[test]
    fn test_token_forms() {
        let mut config = complete();
        assert_eq!(config.chat_password(), "oauth:abc123");
        assert_eq!(config.api_token(), "abc123");

        config.bot.access_token = "oauth:abc123".to_string();
        assert_eq!(config.chat_password(), "oauth:abc123");
        assert_eq!(config.api_token(), "abc123");
    }

    #[test]
    fn test_bot_settings_normalize_channel() {
        let settings = complete().bot_settings();
        assert_eq!(settings.channel, "somechannel");
        assert_eq!(settings.join_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_ai_disabled_hides_key() {
        let mut config = complete();
        config.ai.api_key = Some("sk-test".to_string());
        config.ai.enabled = false;
        assert_eq!(config.ai_key(), None);
    }
}
