//! Stream uptime

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::errors::PluginResult;
use crate::application::messaging::Trigger;
use crate::domain::entities::InboundMessage;
use crate::plugins::trait_def::{Clock, Plugin, PluginBase, PluginContext};

const COMMANDS: &[&str] = &["!uptime"];

/// Answers `!uptime` with how long the channel has been live
pub struct UptimePlugin {
    base: PluginBase,
    clock: Clock,
}

impl UptimePlugin {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            base: PluginBase::new("Uptime"),
            clock,
        }
    }
}

impl Default for UptimePlugin {
    fn default() -> Self {
        Self::new()
    }
}

/// `2h 5m 3s`. Hours are not wrapped into days.
pub fn format_uptime(started_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - started_at).num_seconds().max(0);
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[async_trait]
impl Plugin for UptimePlugin {
    fn name(&self) -> &str {
        "Uptime"
    }

    fn description(&self) -> &str {
        "Shows how long the stream has been live"
    }

    fn commands(&self) -> &[&str] {
        COMMANDS
    }

    fn initialize(&mut self, ctx: PluginContext) -> PluginResult<()> {
        self.base.attach(ctx);
        Ok(())
    }

    async fn handle(&self, message: &InboundMessage) -> PluginResult<()> {
        match Trigger::parse(message.raw_text()) {
            Some(trigger) if trigger.is_any(COMMANDS) && trigger.is_bare() => {}
            _ => return Ok(()),
        }

        let logins = [message.channel().to_string()];
        let streams = match self.base.platform()?.get_streams(&logins).await {
            Ok(streams) => streams,
            Err(e) => {
                tracing::warn!("Error getting uptime for #{}: {}", message.channel(), e);
                return self.base.reply(message, "Couldn't fetch uptime right now.").await;
            }
        };

        let text = match streams.first() {
            Some(stream) => format!(
                "Stream has been live for {}",
                format_uptime(stream.started_at, (self.clock)())
            ),
            None => "Stream is offline!".to_string(),
        };
        self.base.reply(message, &text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_format_uptime() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let now = start + Duration::seconds(2 * 3600 + 5 * 60 + 3);
        assert_eq!(format_uptime(start, now), "2h 5m 3s");
    }

    #[test]
    fn test_format_uptime_keeps_hours_past_a_day() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let now = start + Duration::hours(26);
        assert_eq!(format_uptime(start, now), "26h 0m 0s");
    }

    #[test]
    fn test_start_in_the_future_is_zero() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(format_uptime(start, start - Duration::seconds(30)), "0h 0m 0s");
    }
}
