//! Playlist exports: the on-disk input format for the sectioner

use crate::duration::parse_iso8601_duration;
use crate::sectioning::Video;
use crate::{Result, SectionerError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Title used for items exported without one
pub const UNTITLED_VIDEO: &str = "Untitled video";

/// Title used for playlists exported without one
pub const UNTITLED_PLAYLIST: &str = "Untitled playlist";

/// A playlist as exported from the video platform
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistExport {
    /// Platform playlist id
    #[serde(default)]
    pub playlist_id: Option<String>,
    /// Playlist URL, used when no id is given
    #[serde(default)]
    pub playlist_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Playlist entries, in any order
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

/// A single playlist entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub video_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Position reported by the platform; file order when absent
    #[serde(default)]
    pub position: Option<usize>,
    /// Duration in seconds
    #[serde(default)]
    pub duration_seconds: Option<u64>,
    /// ISO 8601 duration (`PT4M13S`), used when `durationSeconds` is absent
    #[serde(default)]
    pub duration: Option<String>,
}

impl PlaylistItem {
    fn seconds(&self) -> u64 {
        self.duration_seconds
            .or_else(|| self.duration.as_deref().map(parse_iso8601_duration))
            .unwrap_or(0)
    }
}

impl PlaylistExport {
    /// Parse an export from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load an export from a JSON file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let export = Self::from_json(&content)?;
        info!("📄 Loaded playlist export with {} items: {}", export.items.len(), path.as_ref().display());
        Ok(export)
    }

    /// Playlist id from `playlistId`, falling back to the URL's `list` parameter
    pub fn resolve_playlist_id(&self) -> Result<String> {
        if let Some(id) = self.playlist_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            return Ok(id.to_string());
        }

        match self.playlist_url.as_deref() {
            Some(url) => extract_playlist_id(url)
                .ok_or_else(|| SectionerError::InvalidPlaylistUrl(url.to_string())),
            None => Err(SectionerError::MissingPlaylistId),
        }
    }

    pub fn title_or_default(&self) -> String {
        self.title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED_PLAYLIST.to_string())
    }

    /// Sectioner input in playlist order.
    ///
    /// Items without a video id are dropped, the rest are ordered by their
    /// reported position (stable, file order for ties and gaps) and then
    /// renumbered to contiguous 0-based positions.
    pub fn to_videos(&self) -> Vec<Video> {
        let mut ordered: Vec<(usize, &PlaylistItem)> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.video_id.trim().is_empty())
            .map(|(idx, item)| (item.position.unwrap_or(idx), item))
            .collect();

        let skipped = self.items.len() - ordered.len();
        if skipped > 0 {
            debug!("Skipped {} playlist items without a video id", skipped);
        }

        ordered.sort_by_key(|(position, _)| *position);

        ordered
            .into_iter()
            .enumerate()
            .map(|(position, (_, item))| Video {
                id: item.video_id.trim().to_string(),
                title: item
                    .title
                    .clone()
                    .unwrap_or_else(|| UNTITLED_VIDEO.to_string()),
                duration_seconds: item.seconds(),
                position,
                description: item.description.clone(),
                thumbnail_url: item.thumbnail_url.clone(),
            })
            .collect()
    }

    /// md5 over everything a preview is built from.
    ///
    /// Editing the export (items, order, durations, titles) changes it, while
    /// fields the preview ignores do not.
    pub fn content_fingerprint(&self) -> String {
        let mut context = md5::Context::new();
        context.consume(self.title_or_default().as_bytes());
        context.consume(b"\x1f");
        context.consume(self.description.as_deref().unwrap_or_default().as_bytes());

        for video in self.to_videos() {
            context.consume(b"\x1e");
            for field in [
                video.id.as_str(),
                video.title.as_str(),
                video.description.as_deref().unwrap_or_default(),
                video.thumbnail_url.as_deref().unwrap_or_default(),
            ] {
                context.consume(field.as_bytes());
                context.consume(b"\x1f");
            }
            context.consume(video.duration_seconds.to_le_bytes());
        }

        format!("{:x}", context.compute())
    }
}

/// Extract the playlist id (the `list` query parameter) from a playlist URL
pub fn extract_playlist_id(playlist_url: &str) -> Option<String> {
    let url = Url::parse(playlist_url.trim()).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "list")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
