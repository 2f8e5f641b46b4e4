use std::collections::HashMap;

use crate::error::Result;
use crate::models::{ChannelInfo, VideoStats};
use crate::youtube::{PlaylistApi, MAX_RESULTS};

/// Fetch stats for the given videos, [`MAX_RESULTS`] IDs per call.
pub async fn get_stats<A: PlaylistApi + ?Sized>(
    api: &A,
    video_ids: &[String],
) -> Result<Vec<VideoStats>> {
    let mut stats = Vec::with_capacity(video_ids.len());
    for chunk in video_ids.chunks(MAX_RESULTS) {
        match api.list_videos(chunk).await {
            Ok(batch) => stats.extend(batch),
            Err(e) => {
                tracing::error!("Failed to fetch video stats: {}", e);
                return Err(e);
            }
        }
    }
    Ok(stats)
}

/// Same as [`get_stats`], keyed by video ID.
pub async fn get_stats_by_id<A: PlaylistApi + ?Sized>(
    api: &A,
    video_ids: &[String],
) -> Result<HashMap<String, VideoStats>> {
    Ok(get_stats(api, video_ids)
        .await?
        .into_iter()
        .map(|s| (s.video_id.clone(), s))
        .collect())
}

pub async fn get_channels<A: PlaylistApi + ?Sized>(
    api: &A,
    channel_ids: &[String],
) -> Result<Vec<ChannelInfo>> {
    let mut channels = Vec::with_capacity(channel_ids.len());
    for chunk in channel_ids.chunks(MAX_RESULTS) {
        channels.extend(api.list_channels(chunk).await?);
    }
    Ok(channels)
}

/// Subscriber counts for the distinct channels among `channel_ids`.
pub async fn get_subscribers<A: PlaylistApi + ?Sized>(
    api: &A,
    channel_ids: &[Option<String>],
) -> Result<HashMap<String, u64>> {
    let mut distinct: Vec<String> = Vec::new();
    for id in channel_ids.iter().flatten() {
        if !distinct.contains(id) {
            distinct.push(id.clone());
        }
    }

    Ok(get_channels(api, &distinct)
        .await?
        .into_iter()
        .map(|c| (c.id, c.subscribers))
        .collect())
}
