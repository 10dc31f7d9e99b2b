//! RaidPal API payloads

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /events`
#[derive(Debug, Clone, Serialize)]
pub struct RaidRequest<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub initiator: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaidResponse {
    #[serde(default)]
    pub raid_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaidStats {
    pub raids_led: u32,
    pub raids_participated: u32,
    pub total_impact: u32,
}

/// Body of `GET /user/{name}`
#[derive(Debug, Clone, Deserialize)]
pub struct RaidPalUserResponse {
    pub user: Option<RaidPalUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RaidPalUser {
    pub display_name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub twitch_uri: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub events_joined: Vec<RaidPalEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RaidPalEvent {
    pub title: String,
    #[serde(deserialize_with = "utc_timestamp")]
    pub starttime: DateTime<Utc>,
    #[serde(deserialize_with = "utc_timestamp")]
    pub endtime: DateTime<Utc>,
    #[serde(default)]
    pub raidpal_link: Option<String>,
    #[serde(default)]
    pub api_link: Option<String>,
}

impl RaidPalUser {
    /// The next `limit` events that start after `now`, soonest first
    pub fn upcoming(&self, now: DateTime<Utc>, limit: usize) -> Vec<&RaidPalEvent> {
        let mut events: Vec<&RaidPalEvent> = self
            .events_joined
            .iter()
            .filter(|e| e.starttime > now)
            .collect();
        events.sort_by_key(|e| e.starttime);
        events.truncate(limit);
        events
    }
}

/// RFC 3339, or a naive timestamp taken as UTC
fn utc_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
