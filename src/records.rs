use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Twitter's `created_at` layout, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const TWITTER_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// A user object as returned by the v1.1 API and stored in friend/follower
/// snapshots. Fields the audit does not look at are kept in `extra` so the
/// snapshot round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub screen_name: String,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub friends_count: u64,
    #[serde(default)]
    pub statuses_count: u64,
    #[serde(default)]
    pub favourites_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LastStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The most recent tweet embedded in a user object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetRecord {
    pub id_str: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub favorite_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub favorited: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Timestamp of the user's last tweet, if the snapshot carries one.
    pub fn last_active(&self) -> Option<DateTime<Utc>> {
        self.status
            .as_ref()
            .and_then(|status| status.created_at.as_deref())
            .and_then(parse_twitter_time)
    }
}

impl TweetRecord {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        parse_twitter_time(&self.created_at)
    }
}

/// Parse a `created_at` value. Accepts the Twitter layout first, then
/// RFC 2822 and RFC 3339.
pub fn parse_twitter_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_str(raw, TWITTER_TIME_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
