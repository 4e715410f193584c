/// Preview caching system for storing computed course previews
use crate::playlist::PlaylistExport;
use crate::preview::CoursePreview;
use crate::sectioning::SectioningConfig;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Cached preview for a single playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPreview {
    /// Cache timestamp (unix seconds)
    pub timestamp: u64,
    /// Cache key for identification
    pub cache_key: String,
    /// Playlist the preview belongs to
    pub playlist_id: String,
    /// Fingerprint of the sectioning settings that produced it
    pub settings_fingerprint: String,
    /// Fingerprint of the export contents it was built from
    #[serde(default)]
    pub content_fingerprint: String,
    /// Number of sections
    pub section_count: usize,
    /// Preview data
    pub preview: CoursePreview,
}

/// What a cached preview must have been built from to be served
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewKey {
    pub cache_key: String,
    pub playlist_id: String,
    pub settings_fingerprint: String,
    pub content_fingerprint: String,
}

/// Manages preview cache operations
#[derive(Debug, Clone)]
pub struct PreviewCacheManager {
    /// Cache directory path
    cache_dir: PathBuf,
    /// Cache TTL in hours
    cache_ttl_hours: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl PreviewCacheManager {
    /// Create a new cache manager
    pub fn new(cache_dir: PathBuf, cache_ttl_hours: u64) -> Self {
        Self {
            cache_dir,
            cache_ttl_hours,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Initialize cache directory
    pub async fn initialize(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        info!("📁 Preview cache directory initialized: {}", self.cache_dir.display());
        Ok(())
    }

    /// File name for a cache entry.
    ///
    /// Changing a sectioning setting or the export contents yields a
    /// different key. Distinct ids may still share a key after sanitizing,
    /// which `load_cached_preview` treats as a miss.
    pub fn cache_key(&self, playlist_id: &str, settings_fingerprint: &str, content_fingerprint: &str) -> String {
        format!(
            "{}_{}_{}",
            safe_file_stem(playlist_id),
            &settings_fingerprint[..8.min(settings_fingerprint.len())],
            &content_fingerprint[..8.min(content_fingerprint.len())]
        )
    }

    /// Key for an export sectioned with the given settings
    pub fn preview_key(&self, export: &PlaylistExport, settings: &SectioningConfig) -> Result<PreviewKey> {
        let playlist_id = export.resolve_playlist_id()?;
        let settings_fingerprint = settings.fingerprint();
        let content_fingerprint = export.content_fingerprint();

        Ok(PreviewKey {
            cache_key: self.cache_key(&playlist_id, &settings_fingerprint, &content_fingerprint),
            playlist_id,
            settings_fingerprint,
            content_fingerprint,
        })
    }

    fn entry_path(&self, cache_key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", cache_key))
    }

    /// Load a cached preview if present, built from the same inputs and not expired
    pub async fn load_cached_preview(&self, key: &PreviewKey) -> Option<CachedPreview> {
        let cache_key = key.cache_key.as_str();
        let cache_path = self.entry_path(cache_key);

        if !cache_path.exists() {
            debug!("Cache miss: no file found for key {}", cache_key);
            return None;
        }

        let content = match tokio::fs::read_to_string(&cache_path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read cache file {}: {}", cache_path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<CachedPreview>(&content) {
            Ok(cache) if !Self::built_from(&cache, key) => {
                debug!("Cache miss: {} holds a preview of {}", cache_key, cache.playlist_id);
                None
            }
            Ok(cache) if self.is_cache_valid(&cache) => {
                info!("📚 Cache hit: {} sections for {}", cache.section_count, cache_key);
                Some(cache)
            }
            Ok(_) => {
                info!("⏰ Cache expired for key: {}", cache_key);
                let _ = tokio::fs::remove_file(&cache_path).await;
                None
            }
            Err(e) => {
                warn!("Failed to parse cache file {}: {}", cache_path.display(), e);
                None
            }
        }
    }

    /// Save a preview to the cache
    pub async fn save_cached_preview(&self, key: &PreviewKey, preview: &CoursePreview) -> Result<()> {
        let cache = CachedPreview {
            timestamp: now_secs(),
            cache_key: key.cache_key.clone(),
            playlist_id: key.playlist_id.clone(),
            settings_fingerprint: key.settings_fingerprint.clone(),
            content_fingerprint: key.content_fingerprint.clone(),
            section_count: preview.sections.len(),
            preview: preview.clone(),
        };

        let json_content = serde_json::to_string_pretty(&cache)?;
        tokio::fs::write(self.entry_path(&key.cache_key), json_content).await?;
        info!("💾 Saved preview with {} sections to cache: {}", cache.section_count, key.cache_key);

        Ok(())
    }

    fn built_from(cache: &CachedPreview, key: &PreviewKey) -> bool {
        cache.playlist_id == key.playlist_id
            && cache.settings_fingerprint == key.settings_fingerprint
            && cache.content_fingerprint == key.content_fingerprint
    }

    /// Check if cache is still valid based on TTL
    fn is_cache_valid(&self, cache: &CachedPreview) -> bool {
        self.get_cache_age_hours(cache) < self.cache_ttl_hours
    }

    fn get_cache_age_hours(&self, cache: &CachedPreview) -> u64 {
        now_secs().saturating_sub(cache.timestamp) / 3600
    }

    /// Read every parseable cache entry with its path
    async fn read_entries(&self) -> Result<Vec<(PathBuf, Option<CachedPreview>)>> {
        let mut entries_out = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.cache_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let parsed = match tokio::fs::read_to_string(&path).await {
                    Ok(content) => serde_json::from_str::<CachedPreview>(&content).ok(),
                    Err(_) => None,
                };
                entries_out.push((path, parsed));
            }
        }

        Ok(entries_out)
    }

    /// Clean up expired cache files
    pub async fn cleanup_expired_cache(&self) -> Result<usize> {
        let mut cleaned_count = 0;

        for (path, cache) in self.read_entries().await? {
            if let Some(cache) = cache {
                if !self.is_cache_valid(&cache) && tokio::fs::remove_file(&path).await.is_ok() {
                    cleaned_count += 1;
                    debug!("🗑️ Removed expired cache: {}", path.display());
                }
            }
        }

        if cleaned_count > 0 {
            info!("🧹 Cleaned up {} expired cache files", cleaned_count);
        }

        Ok(cleaned_count)
    }

    /// Get cache statistics
    pub async fn get_cache_stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats::default();

        for (_, cache) in self.read_entries().await? {
            stats.total_files += 1;
            match cache {
                Some(cache) if self.is_cache_valid(&cache) => {
                    stats.valid_files += 1;
                    stats.total_sections += cache.section_count;
                }
                Some(_) => stats.expired_files += 1,
                None => stats.unreadable_files += 1,
            }
        }

        Ok(stats)
    }

    /// Force invalidate a specific cache entry by key
    pub async fn invalidate_cache(&self, cache_key: &str) -> Result<bool> {
        let cache_path = self.entry_path(cache_key);

        if cache_path.exists() {
            tokio::fs::remove_file(&cache_path).await?;
            info!("🗑️ Force invalidated cache for key: {}", cache_key);
            Ok(true)
        } else {
            debug!("Cache file not found for key: {}", cache_key);
            Ok(false)
        }
    }

    /// Force invalidate every cached preview of a playlist
    pub async fn invalidate_playlist_cache(&self, playlist_id: &str) -> Result<usize> {
        let mut removed = 0;

        for (path, cache) in self.read_entries().await? {
            let belongs = cache.map_or(false, |cache| cache.playlist_id == playlist_id);
            if belongs && tokio::fs::remove_file(&path).await.is_ok() {
                removed += 1;
                debug!("🗑️ Removed cache for {}: {}", playlist_id, path.display());
            }
        }

        if removed > 0 {
            info!("🗑️ Force invalidated {} cache files for playlist: {}", removed, playlist_id);
        }

        Ok(removed)
    }

    /// Remove every cached preview
    pub async fn clear_all_cache(&self) -> Result<usize> {
        let mut cleared_count = 0;

        for (path, _) in self.read_entries().await? {
            if tokio::fs::remove_file(&path).await.is_ok() {
                cleared_count += 1;
                debug!("🗑️ Removed cache file: {}", path.display());
            }
        }

        if cleared_count > 0 {
            info!("🧹 Cleared {} cache files", cleared_count);
        }

        Ok(cleared_count)
    }

    /// List all cached previews, newest first
    pub async fn list_cached_previews(&self) -> Result<Vec<CachedPreviewInfo>> {
        let mut previews: Vec<CachedPreviewInfo> = self
            .read_entries()
            .await?
            .into_iter()
            .filter_map(|(_, cache)| cache)
            .map(|cache| CachedPreviewInfo {
                is_valid: self.is_cache_valid(&cache),
                age_hours: self.get_cache_age_hours(&cache),
                cache_key: cache.cache_key,
                playlist_id: cache.playlist_id,
                title: cache.preview.title,
                section_count: cache.section_count,
                timestamp: cache.timestamp,
            })
            .collect();

        previews.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(previews)
    }
}

/// Playlist id reduced to a safe, bounded file name stem
pub fn safe_file_stem(playlist_id: &str) -> String {
    playlist_id
        .chars()
        .take(40)
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Cache statistics
#[derive(Debug, Default)]
pub struct CacheStats {
    pub total_files: usize,
    pub valid_files: usize,
    pub expired_files: usize,
    pub unreadable_files: usize,
    pub total_sections: usize,
}

/// Information about a cached preview
#[derive(Debug, Clone)]
pub struct CachedPreviewInfo {
    pub cache_key: String,
    pub playlist_id: String,
    pub title: String,
    pub section_count: usize,
    pub is_valid: bool,
    pub age_hours: u64,
    pub timestamp: u64,
}
