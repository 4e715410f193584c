//! Rendering course previews for downstream course builders

use crate::duration::format_duration;
use crate::preview::CoursePreview;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
        }
    }
}

/// Render a preview in the requested format
pub fn render(preview: &CoursePreview, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(preview)?),
        ExportFormat::Markdown => Ok(render_markdown(preview)),
    }
}

/// Markdown course outline with one heading per section
pub fn render_markdown(preview: &CoursePreview) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "# {}", preview.title);
    let _ = writeln!(out);
    if let Some(description) = &preview.description {
        let _ = writeln!(out, "{}", description.trim());
        let _ = writeln!(out);
    }
    let _ = writeln!(
        out,
        "**{} videos** in **{} sections** · total {}",
        preview.total_videos,
        preview.sections.len(),
        format_duration(preview.total_duration_seconds)
    );

    for section in &preview.sections {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "## {}. {} ({})",
            section.order_index + 1,
            section.title,
            format_duration(section.duration_seconds)
        );
        let _ = writeln!(out);
        for (i, video) in section.videos.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} [{}]",
                i + 1,
                video.title,
                format_duration(video.duration_seconds)
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::SectionSummary;
    use crate::sectioning::Video;
    use chrono::Utc;

    fn preview() -> CoursePreview {
        CoursePreview {
            playlist_id: "PLmd".to_string(),
            title: "Knife Skills".to_string(),
            description: Some("Everything about knives.\n".to_string()),
            total_videos: 3,
            total_duration_seconds: 3900,
            sections: vec![
                SectionSummary {
                    title: "Knife Grips".to_string(),
                    order_index: 0,
                    duration_seconds: 300,
                    videos: vec![
                        Video::new("k1", "Knife grips: pinch", 120, 0),
                        Video::new("k2", "Knife grips: claw", 180, 1),
                    ],
                },
                SectionSummary {
                    title: "Section 2".to_string(),
                    order_index: 1,
                    duration_seconds: 3600,
                    videos: vec![Video::new("k3", "Full prep session", 3600, 2)],
                },
            ],
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_markdown_outline() {
        let md = render_markdown(&preview());

        assert!(md.starts_with("# Knife Skills\n\nEverything about knives.\n"));
        assert!(md.contains("**3 videos** in **2 sections** · total 01:05:00"));
        assert!(md.contains("## 1. Knife Grips (05:00)\n\n1. Knife grips: pinch [02:00]\n2. Knife grips: claw [03:00]\n"));
        assert!(md.contains("## 2. Section 2 (01:00:00)"));
    }

    #[test]
    fn test_json_render_parses_back() {
        let original = preview();
        let json = render(&original, ExportFormat::Json).unwrap();
        let parsed: CoursePreview = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_extensions() {
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::Markdown.extension(), "md");
    }
}
