/// Playlist sectioning module
///
/// This module splits an ordered playlist into short, titled sections using
/// title similarity, "Part N" series detection and long-video hard breaks.

pub mod tokens;
pub mod title;
pub mod sectioner;

// Re-export main types
pub use sectioner::{auto_section, Sectioner};
pub use title::{infer_title, title_case};
pub use tokens::{numeric_series, token_prefix_score, tokenize};

use crate::{Result, SectionerError};
use serde::{Deserialize, Serialize};

/// Smallest group the grouping pass pads up to
pub const DEFAULT_WINDOW_MIN: usize = 2;

/// Largest group the grouping pass may build
pub const DEFAULT_WINDOW_MAX: usize = 4;

/// Videos at least this long (seconds) are isolated by hard breaks
pub const DEFAULT_LONG_BREAK_SECONDS: u64 = 30 * 60;

/// Minimum shared token prefix used verbatim as a section title
pub const DEFAULT_TITLE_PREFIX_MIN: usize = 3;

/// Words ignored when comparing and titling videos
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "the",
    "a",
    "an",
    "for",
    "and",
    "of",
    "part",
    "lesson",
    "chapter",
    "introduction",
    "intro",
];

/// A single playlist video as seen by the sectioner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// Platform video id
    pub id: String,
    /// Video title as published
    pub title: String,
    /// Duration in seconds
    pub duration_seconds: u64,
    /// 0-based position within the playlist
    pub position: usize,
    /// Optional description, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional thumbnail URL, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl Video {
    pub fn new(id: impl Into<String>, title: impl Into<String>, duration_seconds: u64, position: usize) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration_seconds,
            position,
            description: None,
            thumbnail_url: None,
        }
    }
}

/// A titled, contiguous run of playlist videos
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Inferred section title
    pub title: String,
    /// 0-based index of this section in the output
    pub order_index: usize,
    /// Videos in playlist order
    pub videos: Vec<Video>,
}

impl Section {
    /// Total duration of all videos in the section
    pub fn duration_seconds(&self) -> u64 {
        self.videos
            .iter()
            .map(|v| v.duration_seconds)
            .fold(0, u64::saturating_add)
    }
}

/// Tunables for the sectioning heuristic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectioningConfig {
    /// Minimum videos per section when enough input remains
    pub window_min: usize,
    /// Maximum videos per section
    pub window_max: usize,
    /// Duration (seconds) from which a video forces hard breaks
    pub long_break_seconds: u64,
    /// Shared prefix length required for a prefix-based title
    pub title_prefix_min: usize,
    /// Words dropped during tokenization
    pub stopwords: Vec<String>,
}

impl Default for SectioningConfig {
    fn default() -> Self {
        Self {
            window_min: DEFAULT_WINDOW_MIN,
            window_max: DEFAULT_WINDOW_MAX,
            long_break_seconds: DEFAULT_LONG_BREAK_SECONDS,
            title_prefix_min: DEFAULT_TITLE_PREFIX_MIN,
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SectioningConfig {
    /// Check that the window bounds describe a usable grouping
    pub fn validate(&self) -> Result<()> {
        if self.window_min == 0 {
            return Err(SectionerError::InvalidConfig(
                "window_min must be greater than 0".to_string(),
            ));
        }
        if self.window_max < self.window_min {
            return Err(SectionerError::InvalidConfig(format!(
                "window_max ({}) must be at least window_min ({})",
                self.window_max, self.window_min
            )));
        }
        if self.title_prefix_min == 0 {
            return Err(SectionerError::InvalidConfig(
                "title_prefix_min must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Stable fingerprint of these settings, used to key cached previews
    pub fn fingerprint(&self) -> String {
        let canonical = format!(
            "{}|{}|{}|{}|{}",
            self.window_min,
            self.window_max,
            self.long_break_seconds,
            self.title_prefix_min,
            self.stopwords.join(",")
        );
        format!("{:x}", md5::compute(canonical.as_bytes()))
    }
}
