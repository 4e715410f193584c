//! Course previews: playlist metadata plus computed sections

use crate::playlist::PlaylistExport;
use crate::sectioning::{Section, Sectioner, Video};
use crate::{Result, SectionerError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A sectioned course ready to be stored or rendered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoursePreview {
    pub playlist_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_videos: usize,
    pub total_duration_seconds: u64,
    pub sections: Vec<SectionSummary>,
    /// When the sections were computed
    pub generated_at: DateTime<Utc>,
}

/// A section together with its running time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectionSummary {
    pub title: String,
    pub order_index: usize,
    pub duration_seconds: u64,
    pub videos: Vec<Video>,
}

impl From<Section> for SectionSummary {
    fn from(section: Section) -> Self {
        Self {
            duration_seconds: section.duration_seconds(),
            title: section.title,
            order_index: section.order_index,
            videos: section.videos,
        }
    }
}

impl CoursePreview {
    /// Videos of all sections in playlist order
    pub fn videos(&self) -> impl Iterator<Item = &Video> {
        self.sections.iter().flat_map(|s| s.videos.iter())
    }
}

/// Build a course preview for a playlist export.
///
/// Fails when the playlist id cannot be resolved or no videos remain after
/// normalization.
pub fn build_preview(export: &PlaylistExport, sectioner: &Sectioner) -> Result<CoursePreview> {
    let playlist_id = export.resolve_playlist_id()?;
    let videos = export.to_videos();

    if videos.is_empty() {
        return Err(SectionerError::EmptyPlaylist(playlist_id));
    }

    let total_videos = videos.len();
    let total_duration_seconds = videos
        .iter()
        .map(|v| v.duration_seconds)
        .fold(0, u64::saturating_add);
    let sections: Vec<SectionSummary> = sectioner
        .section(&videos)
        .into_iter()
        .map(SectionSummary::from)
        .collect();

    info!(
        "📚 Built preview for {}: {} videos in {} sections",
        playlist_id,
        total_videos,
        sections.len()
    );

    Ok(CoursePreview {
        playlist_id,
        title: export.title_or_default(),
        description: export.description.clone().filter(|d| !d.trim().is_empty()),
        total_videos,
        total_duration_seconds,
        sections,
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::PlaylistItem;

    fn item(id: &str, title: &str, secs: u64) -> PlaylistItem {
        PlaylistItem {
            video_id: id.to_string(),
            title: Some(title.to_string()),
            duration_seconds: Some(secs),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_preview_totals() {
        let export = PlaylistExport {
            playlist_id: Some("PLcourse".to_string()),
            title: Some("Sourdough Masterclass".to_string()),
            description: Some("".to_string()),
            items: vec![
                item("a", "Sourdough Starter Basics Part 1", 600),
                item("b", "Sourdough Starter Basics Part 2", 660),
                item("c", "Live Bake Along", 5400),
                item("d", "Shaping Boules", 480),
                item("e", "Shaping Batards", 420),
            ],
            ..Default::default()
        };

        let preview = build_preview(&export, &Sectioner::default()).unwrap();

        assert_eq!(preview.playlist_id, "PLcourse");
        assert_eq!(preview.title, "Sourdough Masterclass");
        assert_eq!(preview.description, None);
        assert_eq!(preview.total_videos, 5);
        assert_eq!(preview.total_duration_seconds, 7560);

        let durations: Vec<u64> = preview.sections.iter().map(|s| s.duration_seconds).collect();
        assert_eq!(durations, vec![1260, 5400, 900]);
        assert_eq!(preview.sections[0].title, "Sourdough Starter Basics");
        assert_eq!(preview.sections[1].title, "Live Bake Along");
        // "shaping" appears in both titles, so the first distinct word wins
        assert_eq!(preview.sections[2].title, "Boules");

        let ids: Vec<&str> = preview.videos().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_empty_playlist_is_an_error() {
        let export = PlaylistExport {
            playlist_id: Some("PLempty".to_string()),
            items: vec![item("", "Private video", 0)],
            ..Default::default()
        };
        let result = build_preview(&export, &Sectioner::default());
        assert!(matches!(result, Err(SectionerError::EmptyPlaylist(id)) if id == "PLempty"));
    }

    #[test]
    fn test_total_duration_saturates() {
        let export = PlaylistExport {
            playlist_id: Some("PLendless".to_string()),
            items: vec![
                item("a", "Endless Stream One", u64::MAX),
                item("b", "Endless Stream Two", u64::MAX),
            ],
            ..Default::default()
        };
        let preview = build_preview(&export, &Sectioner::default()).unwrap();

        assert_eq!(preview.total_videos, 2);
        assert_eq!(preview.total_duration_seconds, u64::MAX);
        assert!(preview.sections.iter().all(|s| s.duration_seconds == u64::MAX));
    }

    #[test]
    fn test_preview_wire_format() {
        let export = PlaylistExport {
            playlist_id: Some("PLwire".to_string()),
            items: vec![item("a", "Only video", 90)],
            ..Default::default()
        };
        let preview = build_preview(&export, &Sectioner::default()).unwrap();
        let json = serde_json::to_value(&preview).unwrap();

        assert_eq!(json["playlistId"], "PLwire");
        assert_eq!(json["title"], "Untitled playlist");
        assert_eq!(json["totalVideos"], 1);
        assert_eq!(json["sections"][0]["orderIndex"], 0);
        assert_eq!(json["sections"][0]["durationSeconds"], 90);
    }
}
