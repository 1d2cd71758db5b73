//! Source record types
//!
//! Typed views over the raw JSON records. The event log is messy: `userId`
//! arrives as a number or a string (sometimes empty), and most fields can be
//! absent on non-listen actions, so everything an event is not guaranteed to
//! carry is optional.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The action type that marks a song play in the event log
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// One song-catalog entry
#[derive(Debug, Clone, Deserialize)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub artist_name: String,
    #[serde(default)]
    pub artist_location: Option<String>,
    #[serde(default)]
    pub artist_latitude: Option<f64>,
    #[serde(default)]
    pub artist_longitude: Option<f64>,
    /// Release year; the catalog uses 0 when unknown
    #[serde(default)]
    pub year: i32,
    pub duration: f64,
    #[serde(default)]
    pub num_songs: Option<i64>,
}

/// One logged user action
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "userId", default, deserialize_with = "opt_string_or_number")]
    pub user_id: Option<String>,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    /// Action type; only `NextSong` rows feed the star schema
    pub page: String,
    /// Event time, epoch milliseconds
    pub ts: i64,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "userAgent", default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub registration: Option<f64>,
}

impl EventRecord {
    /// Whether this event is a song play
    pub fn is_songplay(&self) -> bool {
        self.page == NEXT_SONG_PAGE
    }
}

/// Accept a string or a number, mapping empty strings and nulls to `None`
fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
