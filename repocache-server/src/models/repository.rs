//! Repository record and the upstream descriptor it is built from

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// Repository as stored in the cache and returned to clients.
///
/// `(name, owner)` is the natural key; `id` is assigned by the store and
/// survives upserts of the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Repository {
    pub id: i64,
    pub name: String,
    pub owner: String,
    pub language: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Owner object embedded in an upstream repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamOwner {
    pub login: String,
}

/// Repository descriptor as returned by `GET /users/{username}/repos`.
///
/// Only the fields the cache keeps are deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamRepo {
    pub name: String,
    pub owner: UpstreamOwner,
    #[serde(default)]
    pub language: Option<String>,
    pub html_url: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl UpstreamRepo {
    /// Natural key of the record this descriptor maps to.
    pub fn key(&self) -> (&str, &str) {
        (&self.name, &self.owner.login)
    }
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid created_at timestamp: {}", raw)))
}
