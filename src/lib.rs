/// Playlist Sectioner
///
/// Turns an ordered video playlist into a course outline: short, titled
/// sections built from title similarity, numbered-series detection and
/// long-video hard breaks.

pub mod sectioning;
pub mod duration;
pub mod playlist;
pub mod preview;
pub mod cache;
pub mod export;
pub mod batch;
pub mod config;

// Re-export main types for easy access
pub use crate::config::Config;
pub use crate::sectioning::{auto_section, Section, Sectioner, SectioningConfig, Video};
pub use crate::duration::{format_duration, parse_iso8601_duration};
pub use crate::playlist::{extract_playlist_id, PlaylistExport, PlaylistItem};
pub use crate::preview::{build_preview, CoursePreview, SectionSummary};
pub use crate::cache::{CachedPreview, PreviewCacheManager, PreviewKey};
pub use crate::export::ExportFormat;
pub use crate::batch::{BatchResult, BatchSectioner};

/// Result type for sectioner operations
pub type Result<T> = std::result::Result<T, SectionerError>;

/// Error types for sectioner operations
#[derive(thiserror::Error, Debug)]
pub enum SectionerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid sectioning configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid playlist URL: {0}")]
    InvalidPlaylistUrl(String),

    #[error("Playlist export has neither playlistId nor a playlistUrl with a list parameter")]
    MissingPlaylistId,

    #[error("No videos found in playlist {0}")]
    EmptyPlaylist(String),
}
