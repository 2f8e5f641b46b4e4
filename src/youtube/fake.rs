//! In-memory [`PlaylistApi`] used by tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{ChannelInfo, PlaylistItem, PlaylistItemsPage, VideoStats};

use super::{PlaylistApi, MAX_RESULTS};

#[derive(Debug, Default)]
pub struct FakeState {
    pub playlists: HashMap<String, Vec<PlaylistItem>>,
    pub videos: HashMap<String, VideoStats>,
    pub channels: HashMap<String, ChannelInfo>,
    pub missing_playlists: HashSet<String>,
    pub broken_playlists: HashSet<String>,
    pub rejected_videos: HashSet<String>,
    /// Playlist item IDs whose delete or move is refused.
    pub rejected_items: HashSet<String>,

    pub page_requests: Vec<(String, Option<String>)>,
    pub video_batches: Vec<usize>,
    pub channel_batches: Vec<usize>,
    pub inserted: Vec<(String, String)>,
    pub deleted: Vec<String>,
    pub moved: Vec<(String, usize)>,
}

#[derive(Debug, Default)]
pub struct FakeApi {
    pub state: Mutex<FakeState>,
    page_size: Option<usize>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    pub fn with_playlist(self, playlist_id: &str, items: Vec<PlaylistItem>) -> Self {
        self.state
            .lock()
            .unwrap()
            .playlists
            .insert(playlist_id.to_string(), items);
        self
    }

    pub fn with_videos(self, stats: Vec<VideoStats>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for s in stats {
                state.videos.insert(s.video_id.clone(), s);
            }
        }
        self
    }

    pub fn with_channels(self, channels: Vec<ChannelInfo>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for c in channels {
                state.channels.insert(c.id.clone(), c);
            }
        }
        self
    }

    pub fn playlist(&self, playlist_id: &str) -> Vec<PlaylistItem> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .get(playlist_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn video_ids(&self, playlist_id: &str) -> Vec<String> {
        self.playlist(playlist_id)
            .into_iter()
            .map(|item| item.video_id)
            .collect()
    }
}

fn api_error(status: u16, reason: &str) -> AppError {
    AppError::Api {
        status,
        reason: reason.to_string(),
        message: format!("fake {reason}"),
    }
}

#[async_trait]
impl PlaylistApi for FakeApi {
    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemsPage> {
        let mut state = self.state.lock().unwrap();
        state
            .page_requests
            .push((playlist_id.to_string(), page_token.map(str::to_string)));

        if state.missing_playlists.contains(playlist_id) {
            return Err(api_error(404, "playlistNotFound"));
        }
        if state.broken_playlists.contains(playlist_id) {
            return Err(api_error(403, "quotaExceeded"));
        }

        let items = state.playlists.get(playlist_id).cloned().unwrap_or_default();
        let page_size = self.page_size.unwrap_or(MAX_RESULTS);
        let start: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let end = (start + page_size).min(items.len());

        Ok(PlaylistItemsPage {
            items: items[start.min(end)..end].to_vec(),
            next_page_token: (end < items.len()).then(|| end.to_string()),
        })
    }

    async fn list_videos(&self, video_ids: &[String]) -> Result<Vec<VideoStats>> {
        assert!(video_ids.len() <= MAX_RESULTS, "batch over platform cap");
        let mut state = self.state.lock().unwrap();
        state.video_batches.push(video_ids.len());
        Ok(video_ids
            .iter()
            .filter_map(|id| state.videos.get(id).cloned())
            .collect())
    }

    async fn list_channels(&self, channel_ids: &[String]) -> Result<Vec<ChannelInfo>> {
        assert!(channel_ids.len() <= MAX_RESULTS, "batch over platform cap");
        let mut state = self.state.lock().unwrap();
        state.channel_batches.push(channel_ids.len());
        Ok(channel_ids
            .iter()
            .filter_map(|id| state.channels.get(id).cloned())
            .collect())
    }

    async fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.rejected_videos.contains(video_id) {
            return Err(api_error(404, "videoNotFound"));
        }
        state
            .inserted
            .push((playlist_id.to_string(), video_id.to_string()));
        state
            .playlists
            .entry(playlist_id.to_string())
            .or_default()
            .push(PlaylistItem {
                video_id: video_id.to_string(),
                item_id: format!("item-{video_id}"),
                release_date: None,
                status: crate::models::PrivacyStatus::Public,
                channel_id: None,
                channel_name: None,
            });
        Ok(())
    }

    async fn delete_playlist_item(&self, item_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.rejected_items.contains(item_id) {
            return Err(api_error(403, "forbidden"));
        }
        state.deleted.push(item_id.to_string());
        for items in state.playlists.values_mut() {
            items.retain(|item| item.item_id != item_id);
        }
        Ok(())
    }

    async fn update_playlist_item_position(
        &self,
        playlist_id: &str,
        item_id: &str,
        _video_id: &str,
        position: usize,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.rejected_items.contains(item_id) {
            return Err(api_error(400, "manualSortRequired"));
        }
        state.moved.push((item_id.to_string(), position));
        let items = state.playlists.entry(playlist_id.to_string()).or_default();
        if let Some(idx) = items.iter().position(|item| item.item_id == item_id) {
            let item = items.remove(idx);
            let position = position.min(items.len());
            items.insert(position, item);
        }
        Ok(())
    }
}
