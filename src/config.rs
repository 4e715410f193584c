use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::export::ExportFormat;
use crate::sectioning::SectioningConfig;

/// Configuration for the playlist sectioner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Sectioning heuristic settings
    pub sectioning: SectioningConfig,

    /// Preview cache settings
    pub cache: CacheConfig,

    /// Output and logging settings
    pub output: OutputConfig,

    /// Performance and resource settings
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Enable the preview cache
    pub enable_caching: bool,

    /// Cache directory
    pub cache_dir: PathBuf,

    /// Cache TTL in hours
    pub cache_ttl_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Base output directory for batch runs
    pub base_dir: PathBuf,

    /// Export formats written per playlist
    pub export_formats: Vec<ExportFormat>,

    /// Log level used when RUST_LOG is unset
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceConfig {
    /// Maximum number of concurrent batch workers
    pub max_workers: usize,
}

/// Locations searched by [`Config::load`], in order
pub const CONFIG_PATHS: &[&str] = &[
    "playlist-sectioner.toml",
    "config/playlist-sectioner.toml",
    "/etc/playlist-sectioner/config.toml",
];

impl Config {
    /// Load configuration from the first readable config file, then the environment
    pub fn load() -> Result<Self> {
        for path in CONFIG_PATHS {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from an explicit file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by `PLAYLIST_SECTIONER_*` values from `lookup`.
    ///
    /// A value that does not parse is an error naming the variable.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
        where
            T: std::str::FromStr,
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            lookup(name)
                .map(|value| {
                    value
                        .trim()
                        .parse::<T>()
                        .with_context(|| format!("Invalid {}: {}", name, value))
                })
                .transpose()
        }

        let mut config = Self::default();

        if let Some(window_min) = parsed(&lookup, "PLAYLIST_SECTIONER_WINDOW_MIN")? {
            config.sectioning.window_min = window_min;
        }
        if let Some(window_max) = parsed(&lookup, "PLAYLIST_SECTIONER_WINDOW_MAX")? {
            config.sectioning.window_max = window_max;
        }
        if let Some(long_break) = parsed(&lookup, "PLAYLIST_SECTIONER_LONG_BREAK_SECONDS")? {
            config.sectioning.long_break_seconds = long_break;
        }
        if let Some(workers) = parsed(&lookup, "PLAYLIST_SECTIONER_WORKERS")? {
            config.performance.max_workers = workers;
        }

        if let Some(cache_dir) = lookup("PLAYLIST_SECTIONER_CACHE_DIR") {
            config.cache.cache_dir = PathBuf::from(cache_dir);
        }
        if let Some(output_dir) = lookup("PLAYLIST_SECTIONER_OUTPUT_DIR") {
            config.output.base_dir = PathBuf::from(output_dir);
        }
        if let Some(log_level) = lookup("PLAYLIST_SECTIONER_LOG_LEVEL") {
            config.output.log_level = log_level;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.as_ref().display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.sectioning.validate()?;

        if self.performance.max_workers == 0 {
            return Err(anyhow!("max_workers must be greater than 0"));
        }

        if self.output.export_formats.is_empty() {
            return Err(anyhow!("at least one export format is required"));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Playlist Sectioner Configuration:\n\
            - Window: {}-{} videos\n\
            - Long Break: {}s\n\
            - Title Prefix Min: {} tokens\n\
            - Stopwords: {}\n\
            - Workers: {}\n\
            - Caching Enabled: {} ({})\n\
            - Output Directory: {}\n\
            - Export Formats: {:?}",
            self.sectioning.window_min,
            self.sectioning.window_max,
            self.sectioning.long_break_seconds,
            self.sectioning.title_prefix_min,
            self.sectioning.stopwords.len(),
            self.performance.max_workers,
            self.cache.enable_caching,
            self.cache.cache_dir.display(),
            self.output.base_dir.display(),
            self.output.export_formats
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sectioning: SectioningConfig::default(),
            cache: CacheConfig {
                enable_caching: true,
                cache_dir: PathBuf::from("./preview_cache"),
                cache_ttl_hours: 24,
            },
            output: OutputConfig {
                base_dir: PathBuf::from("./output"),
                export_formats: vec![ExportFormat::Json],
                log_level: "info".to_string(),
            },
            performance: PerformanceConfig {
                max_workers: num_cpus::get().min(8), // Use available cores, max 8
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_window(mut self, min: usize, max: usize) -> Self {
        self.config.sectioning.window_min = min;
        self.config.sectioning.window_max = max;
        self
    }

    pub fn with_long_break_seconds(mut self, seconds: u64) -> Self {
        self.config.sectioning.long_break_seconds = seconds;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.performance.max_workers = workers;
        self
    }

    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.config.cache.cache_dir = dir;
        self
    }

    pub fn enable_caching(mut self, enable: bool) -> Self {
        self.config.cache.enable_caching = enable;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.base_dir = dir;
        self
    }

    pub fn with_export_formats(mut self, formats: Vec<ExportFormat>) -> Self {
        self.config.output.export_formats = formats;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sectioning.window_min, 2);
        assert_eq!(config.sectioning.window_max, 4);
        assert!(config.cache.enable_caching);
        assert!(config.performance.max_workers >= 1);
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_window(3, 5)
            .with_long_break_seconds(900)
            .with_workers(8)
            .enable_caching(false)
            .with_export_formats(vec![ExportFormat::Json, ExportFormat::Markdown])
            .build();

        assert_eq!(config.sectioning.window_min, 3);
        assert_eq!(config.sectioning.window_max, 5);
        assert_eq!(config.sectioning.long_break_seconds, 900);
        assert_eq!(config.performance.max_workers, 8);
        assert!(!config.cache.enable_caching);
        assert_eq!(config.output.export_formats.len(), 2);
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());
        assert!(ConfigBuilder::new().with_workers(0).build().validate().is_err());
        assert!(ConfigBuilder::new().with_window(4, 2).build().validate().is_err());
        assert!(ConfigBuilder::new().with_export_formats(vec![]).build().validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("playlist-sectioner.toml");

        let config = ConfigBuilder::new()
            .with_window(2, 6)
            .with_export_formats(vec![ExportFormat::Markdown])
            .build();
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[sectioning]"));
        assert!(content.contains("window_max = 6"));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_vars(vars(&[
            ("PLAYLIST_SECTIONER_WINDOW_MIN", "3"),
            ("PLAYLIST_SECTIONER_WINDOW_MAX", "5"),
            ("PLAYLIST_SECTIONER_LONG_BREAK_SECONDS", "900"),
            ("PLAYLIST_SECTIONER_WORKERS", "6"),
            ("PLAYLIST_SECTIONER_CACHE_DIR", "/tmp/previews"),
            ("PLAYLIST_SECTIONER_LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.sectioning.window_min, 3);
        assert_eq!(config.sectioning.window_max, 5);
        assert_eq!(config.sectioning.long_break_seconds, 900);
        assert_eq!(config.performance.max_workers, 6);
        assert_eq!(config.cache.cache_dir, PathBuf::from("/tmp/previews"));
        assert_eq!(config.output.log_level, "debug");

        assert_eq!(Config::from_vars(vars(&[])).unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_env_values_are_errors() {
        for name in [
            "PLAYLIST_SECTIONER_WINDOW_MIN",
            "PLAYLIST_SECTIONER_WINDOW_MAX",
            "PLAYLIST_SECTIONER_LONG_BREAK_SECONDS",
            "PLAYLIST_SECTIONER_WORKERS",
        ] {
            let err = Config::from_vars(vars(&[(name, "many")])).unwrap_err();
            assert!(err.to_string().contains(name), "{}", err);
        }
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "[sectioning\nwindow_min = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
