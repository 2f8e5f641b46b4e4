use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{
    ChannelInfo, LiveStatus, PlaylistItem, PlaylistItemsPage, PrivacyStatus, VideoStats,
};

use super::{PlaylistApi, MAX_RESULTS};

// Request bodies

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId<'a> {
    kind: &'static str,
    video_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippetBody<'a> {
    playlist_id: &'a str,
    resource_id: ResourceId<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<usize>,
}

#[derive(Debug, Serialize)]
struct PlaylistItemBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    snippet: PlaylistItemSnippetBody<'a>,
}

// Responses

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemListResponse {
    #[serde(default)]
    items: Vec<PlaylistItemResource>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemResource {
    id: String,
    #[serde(default)]
    snippet: PlaylistItemSnippet,
    content_details: PlaylistItemContentDetails,
    status: Option<PlaylistItemStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    video_owner_channel_id: Option<String>,
    video_owner_channel_title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: String,
    video_published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemStatus {
    privacy_status: PrivacyStatus,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    snippet: Option<VideoSnippet>,
    content_details: Option<VideoContentDetails>,
    statistics: Option<VideoStatistics>,
    live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    live_broadcast_content: Option<LiveStatus>,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: Option<String>,
}

// Counters come back as decimal strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveStreamingDetails {
    concurrent_viewers: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelResource {
    id: String,
    snippet: Option<ChannelSnippet>,
    statistics: Option<ChannelStatistics>,
    content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    subscriber_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

pub struct YouTubeClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl YouTubeClient {
    pub fn new(base_url: &str, access_token: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    /// Turn a non-success response into [`AppError::Api`], keeping the first reason.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await?;
        let (reason, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => (
                envelope
                    .error
                    .errors
                    .into_iter()
                    .find_map(|e| e.reason)
                    .unwrap_or_else(|| "unknown".to_string()),
                envelope.error.message,
            ),
            Err(_) => ("unknown".to_string(), body),
        };

        Err(AppError::Api {
            status: status.as_u16(),
            reason,
            message,
        })
    }
}

#[async_trait]
impl PlaylistApi for YouTubeClient {
    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemsPage> {
        let max_results = MAX_RESULTS.to_string();
        let mut query = vec![
            ("part", "snippet,contentDetails,status"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .client
            .get(self.endpoint("playlistItems"))
            .bearer_auth(&self.access_token)
            .query(&query)
            .send()
            .await?;

        let list: PlaylistItemListResponse = Self::check(response).await?.json().await?;

        let items = list
            .items
            .into_iter()
            .map(|item| PlaylistItem {
                video_id: item.content_details.video_id,
                item_id: item.id,
                release_date: item.content_details.video_published_at,
                status: item.status.map(|s| s.privacy_status).unwrap_or_default(),
                channel_id: item.snippet.video_owner_channel_id,
                channel_name: item.snippet.video_owner_channel_title,
            })
            .collect();

        Ok(PlaylistItemsPage {
            items,
            next_page_token: list.next_page_token,
        })
    }

    async fn list_videos(&self, video_ids: &[String]) -> Result<Vec<VideoStats>> {
        let ids = video_ids.join(",");
        let max_results = MAX_RESULTS.to_string();
        let response = self
            .client
            .get(self.endpoint("videos"))
            .bearer_auth(&self.access_token)
            .query(&[
                ("part", "snippet,contentDetails,statistics,liveStreamingDetails"),
                ("id", ids.as_str()),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await?;

        let list: VideoListResponse = Self::check(response).await?.json().await?;

        let stats = list
            .items
            .into_iter()
            .map(|video| {
                let statistics = video.statistics.as_ref();
                VideoStats {
                    duration_seconds: video
                        .content_details
                        .and_then(|d| d.duration)
                        .and_then(|d| parse_iso8601_duration(&d))
                        .unwrap_or(0),
                    live_status: video
                        .snippet
                        .and_then(|s| s.live_broadcast_content)
                        .unwrap_or_default(),
                    views: count(statistics.and_then(|s| s.view_count.as_deref())),
                    likes: count(statistics.and_then(|s| s.like_count.as_deref())),
                    comments: count(statistics.and_then(|s| s.comment_count.as_deref())),
                    concurrent_viewers: video
                        .live_streaming_details
                        .and_then(|l| l.concurrent_viewers)
                        .and_then(|v| v.parse().ok()),
                    video_id: video.id,
                }
            })
            .collect();

        Ok(stats)
    }

    async fn list_channels(&self, channel_ids: &[String]) -> Result<Vec<ChannelInfo>> {
        let ids = channel_ids.join(",");
        let max_results = MAX_RESULTS.to_string();
        let response = self
            .client
            .get(self.endpoint("channels"))
            .bearer_auth(&self.access_token)
            .query(&[
                ("part", "snippet,statistics,contentDetails"),
                ("id", ids.as_str()),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await?;

        let list: ChannelListResponse = Self::check(response).await?.json().await?;

        Ok(list
            .items
            .into_iter()
            .map(|channel| ChannelInfo {
                title: channel.snippet.map(|s| s.title).unwrap_or_default(),
                uploads_playlist_id: channel
                    .content_details
                    .and_then(|c| c.related_playlists.uploads),
                subscribers: count(
                    channel
                        .statistics
                        .as_ref()
                        .and_then(|s| s.subscriber_count.as_deref()),
                ),
                id: channel.id,
            })
            .collect())
    }

    async fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> Result<()> {
        let body = PlaylistItemBody {
            id: None,
            snippet: PlaylistItemSnippetBody {
                playlist_id,
                resource_id: ResourceId {
                    kind: "youtube#video",
                    video_id,
                },
                position: None,
            },
        };

        let response = self
            .client
            .post(self.endpoint("playlistItems"))
            .bearer_auth(&self.access_token)
            .query(&[("part", "snippet")])
            .json(&body)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete_playlist_item(&self, item_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint("playlistItems"))
            .bearer_auth(&self.access_token)
            .query(&[("id", item_id)])
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn update_playlist_item_position(
        &self,
        playlist_id: &str,
        item_id: &str,
        video_id: &str,
        position: usize,
    ) -> Result<()> {
        let body = PlaylistItemBody {
            id: Some(item_id),
            snippet: PlaylistItemSnippetBody {
                playlist_id,
                resource_id: ResourceId {
                    kind: "youtube#video",
                    video_id,
                },
                position: Some(position),
            },
        };

        let response = self
            .client
            .put(self.endpoint("playlistItems"))
            .bearer_auth(&self.access_token)
            .query(&[("part", "snippet")])
            .json(&body)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

fn count(value: Option<&str>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Parse an ISO 8601 duration such as `PT1H2M3S` or `P1DT4M` into seconds.
fn parse_iso8601_duration(value: &str) -> Option<u64> {
    let re = Regex::new(
        r"^P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:\.\d+)?S)?)?$",
    )
    .ok()?;
    let caps = re.captures(value)?;

    [604_800u64, 86_400, 3_600, 60, 1]
        .into_iter()
        .enumerate()
        .try_fold(0u64, |total, (idx, unit)| {
            let amount: u64 = match caps.get(idx + 1) {
                Some(m) => m.as_str().parse().ok()?,
                None => 0,
            };
            amount.checked_mul(unit)?.checked_add(total)
        })
}
