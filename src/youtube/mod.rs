mod auth;
mod client;
#[cfg(test)]
pub mod fake;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChannelInfo, PlaylistItemsPage, VideoStats};

pub use auth::{encode_credentials_file, Credentials};
pub use client::YouTubeClient;

/// Per-call cap on IDs and page size imposed by the platform.
pub const MAX_RESULTS: usize = 50;

/// The slice of the platform API the curator needs.
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemsPage>;

    /// At most [`MAX_RESULTS`] IDs per call. Unknown or deleted videos are
    /// simply absent from the result.
    async fn list_videos(&self, video_ids: &[String]) -> Result<Vec<VideoStats>>;

    /// At most [`MAX_RESULTS`] IDs per call.
    async fn list_channels(&self, channel_ids: &[String]) -> Result<Vec<ChannelInfo>>;

    async fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> Result<()>;

    async fn delete_playlist_item(&self, item_id: &str) -> Result<()>;

    async fn update_playlist_item_position(
        &self,
        playlist_id: &str,
        item_id: &str,
        video_id: &str,
        position: usize,
    ) -> Result<()>;
}
