use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: String,
    #[serde(rename = "uploads", default)]
    pub uploads_playlist_id: String,
    #[serde(default)]
    pub title: String,
}

impl ChannelRecord {
    /// Uploads playlists share the channel ID's suffix behind a `UU` prefix.
    pub fn derived_uploads_id(channel_id: &str) -> String {
        format!("UU{}", channel_id.get(2..).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistRef {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistRegistry {
    pub mixes: PlaylistRef,
    pub lives: PlaylistRef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IgnoreList {
    /// Channels skipped entirely when collecting uploads.
    #[serde(rename = "toPass", default)]
    pub to_pass: HashSet<String>,
    /// Channels whose uploads playlist is known to 404.
    #[serde(rename = "playlistNotFoundPass", default)]
    pub playlist_not_found_pass: HashSet<String>,
}

impl IgnoreList {
    pub fn skips_channel(&self, channel_id: &str) -> bool {
        self.to_pass.contains(channel_id)
    }

    pub fn expects_missing(&self, channel_id: &str) -> bool {
        self.playlist_not_found_pass.contains(channel_id)
    }
}

pub fn load_channels(path: &Path) -> Result<Vec<ChannelRecord>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_channels(path: &Path, channels: &[ChannelRecord]) -> Result<()> {
    let content = serde_json::to_string_pretty(channels)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_playlists(path: &Path) -> Result<PlaylistRegistry> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// A missing ignore file means nothing is ignored.
pub fn load_ignore_list(path: &Path) -> Result<IgnoreList> {
    if !path.exists() {
        return Ok(IgnoreList::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
