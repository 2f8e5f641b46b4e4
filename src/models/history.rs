use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LiveStatus, PlaylistItem, PrivacyStatus, VideoStats};

/// One row of the mix history audit file.
///
/// Stats columns stay empty when the video could no longer be looked up
/// (deleted uploads still get pruned and recorded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub video_id: String,
    pub item_id: String,
    pub release_date: Option<DateTime<Utc>>,
    pub status: PrivacyStatus,
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
    pub subscribers: Option<u64>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub duration: Option<u64>,
    pub live_status: Option<LiveStatus>,
}

impl HistoryRecord {
    pub fn new(item: &PlaylistItem, stats: Option<&VideoStats>, subscribers: Option<u64>) -> Self {
        Self {
            video_id: item.video_id.clone(),
            item_id: item.item_id.clone(),
            release_date: item.release_date,
            status: item.status,
            channel_id: item.channel_id.clone(),
            channel_name: item.channel_name.clone(),
            subscribers,
            views: stats.map(|s| s.views),
            likes: stats.map(|s| s.likes),
            comments: stats.map(|s| s.comments),
            duration: stats.map(|s| s.duration_seconds),
            live_status: stats.map(|s| s.live_status),
        }
    }
}
