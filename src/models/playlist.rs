use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrivacyStatus {
    Public,
    Unlisted,
    Private,
    #[default]
    PrivacyStatusUnspecified,
}

impl PrivacyStatus {
    /// Whether the item should be treated as private when pruning the lives playlist.
    pub fn is_private_like(self) -> bool {
        matches!(self, Self::Private | Self::PrivacyStatusUnspecified)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Unlisted => "unlisted",
            Self::Private => "private",
            Self::PrivacyStatusUnspecified => "privacyStatusUnspecified",
        }
    }
}

impl fmt::Display for PrivacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveStatus {
    #[default]
    None,
    Live,
    Upcoming,
}

impl LiveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Live => "live",
            Self::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for LiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A video held by a playlist.
///
/// `item_id` is scoped to the playlist and is what delete and reposition calls
/// address. Candidates that are not in the playlist yet carry an empty `item_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    pub video_id: String,
    pub item_id: String,
    pub release_date: Option<DateTime<Utc>>,
    pub status: PrivacyStatus,
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoStats {
    pub video_id: String,
    pub duration_seconds: u64,
    pub live_status: LiveStatus,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    /// Only reported while a broadcast is running.
    pub concurrent_viewers: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveCandidate {
    pub channel_id: String,
    pub video_id: String,
}

impl From<LiveCandidate> for PlaylistItem {
    fn from(candidate: LiveCandidate) -> Self {
        Self {
            video_id: candidate.video_id,
            item_id: String::new(),
            release_date: None,
            status: PrivacyStatus::Public,
            channel_id: Some(candidate.channel_id),
            channel_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: String,
    pub title: String,
    pub uploads_playlist_id: Option<String>,
    pub subscribers: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistItemsPage {
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}
