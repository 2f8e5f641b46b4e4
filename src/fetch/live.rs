use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, USER_AGENT};
use reqwest::Client;
use serde_json::Value;

use crate::error::Result;
use crate::models::LiveCandidate;

const USER_AGENT_STRING: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

const FEATURED_SECTION_POINTER: &str = "/contents/twoColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents/0/itemSectionRenderer/contents/0";

/// Tells which tracked channels are broadcasting right now.
#[async_trait]
pub trait LiveProbe: Send + Sync {
    /// Never fails: anything that goes wrong means "not live".
    async fn find_livestreams(&self, channel_id: &str) -> Vec<LiveCandidate>;
}

/// Reads the featured-content shelf off a channel's public page.
pub struct ChannelPageProbe {
    client: Client,
    base_url: String,
}

impl ChannelPageProbe {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));

        // Skips the cookie consent interstitial.
        let suffix = chrono::Utc::now().timestamp_subsec_micros() % 900 + 100;
        let consent = format!("CONSENT=YES+cb.20210328-17-p0.en-GB+FX+{suffix}");
        if let Ok(value) = HeaderValue::from_str(&consent) {
            headers.insert(COOKIE, value);
        }
        headers
    }
}

#[async_trait]
impl LiveProbe for ChannelPageProbe {
    async fn find_livestreams(&self, channel_id: &str) -> Vec<LiveCandidate> {
        let url = format!("{}/{}", self.base_url, channel_id);

        let response = match self.client.get(&url).headers(Self::headers()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("ConnectionError with this channel: {} ({})", channel_id, e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Channel page {} answered {}", channel_id, response.status());
            return Vec::new();
        }

        let html = match response.text().await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("ConnectionError with this channel: {} ({})", channel_id, e);
                return Vec::new();
            }
        };

        extract_featured_live(channel_id, &html).into_iter().collect()
    }
}

/// Pull the featured live video, if any, out of the page's `ytInitialData` blob.
pub fn extract_featured_live(channel_id: &str, html: &str) -> Option<LiveCandidate> {
    let re = Regex::new(r"(?s)var ytInitialData = (\{.*?\});\s*</script>").ok()?;
    let blob = re.captures(html)?.get(1)?.as_str();
    let data: Value = serde_json::from_str(blob).ok()?;

    let section = data.pointer(FEATURED_SECTION_POINTER)?;
    let video_id = section
        .pointer("/channelFeaturedContentRenderer/items")?
        .as_array()?
        .iter()
        .find_map(|item| item.pointer("/videoRenderer/videoId")?.as_str())?;

    Some(LiveCandidate {
        channel_id: channel_id.to_string(),
        video_id: video_id.to_string(),
    })
}
