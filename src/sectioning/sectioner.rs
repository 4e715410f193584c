/// Greedy playlist sectioner
use super::title::infer_title;
use super::tokens::{numeric_series, token_prefix_score};
use super::{Section, SectioningConfig, Video};
use crate::Result;
use tracing::debug;

/// Splits ordered playlist videos into titled sections
#[derive(Debug, Clone, Default)]
pub struct Sectioner {
    config: SectioningConfig,
}

impl Sectioner {
    /// Create a sectioner with validated settings
    pub fn new(config: SectioningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SectioningConfig {
        &self.config
    }

    /// Group `videos` into sections.
    ///
    /// Every video lands in exactly one section, in input order. A video of
    /// at least `long_break_seconds` always starts its own section and the
    /// video after it starts the next one. Otherwise groups grow while
    /// adjacent titles share leading tokens or continue a numbered series,
    /// capped at `window_max` and padded up to `window_min` when possible.
    pub fn section(&self, videos: &[Video]) -> Vec<Section> {
        let n = videos.len();
        if n == 0 {
            return Vec::new();
        }

        let window_min = self.config.window_min;
        let window_max = self.config.window_max;
        let breaks = self.hard_breaks(videos);

        let mut sections: Vec<Section> = Vec::new();
        let mut start = 0;

        while start < n {
            let limit = (start + window_max).min(n);
            let mut end = start + 1;

            while end < limit && !breaks[end] && self.continues(&videos[end - 1], &videos[end]) {
                end += 1;
            }

            // Backstop: reach window_min unless input runs out or a break cuts in
            while end - start < window_min && end < n && !breaks[end] {
                end += 1;
            }

            let group = videos[start..end].to_vec();
            let title = infer_title(&group, self.config.title_prefix_min, &self.config.stopwords)
                .unwrap_or_else(|| format!("Section {}", sections.len() + 1));

            sections.push(Section {
                title,
                order_index: sections.len(),
                videos: group,
            });
            start = end;
        }

        debug!("Sectioned {} videos into {} sections", n, sections.len());
        sections
    }

    /// Indices where a new section must start
    fn hard_breaks(&self, videos: &[Video]) -> Vec<bool> {
        let threshold = self.config.long_break_seconds;
        let mut breaks = vec![false; videos.len()];

        for (i, flag) in breaks.iter_mut().enumerate() {
            *flag = i == 0
                || videos[i - 1].duration_seconds >= threshold
                || videos[i].duration_seconds >= threshold;
        }

        breaks
    }

    fn continues(&self, prev: &Video, next: &Video) -> bool {
        token_prefix_score(&prev.title, &next.title, &self.config.stopwords) > 0
            || numeric_series(&prev.title, &next.title)
    }
}

/// Section videos with the default settings
pub fn auto_section(videos: &[Video]) -> Vec<Section> {
    Sectioner::default().section(videos)
}
