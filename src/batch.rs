use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::cache::{safe_file_stem, PreviewCacheManager};
use crate::config::Config;
use crate::export::{render, ExportFormat};
use crate::playlist::PlaylistExport;
use crate::preview::{build_preview, CoursePreview};
use crate::sectioning::Sectioner;

/// Processing result for a single playlist export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistResult {
    pub path: PathBuf,
    pub playlist_id: Option<String>,
    pub title: Option<String>,
    pub video_count: usize,
    pub section_count: usize,
    pub outputs: Vec<PathBuf>,
    pub from_cache: bool,
    pub processing_time: Duration,
    pub status: ProcessingStatus,
    pub error_message: Option<String>,
}

/// Overall batch results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_time: Duration,
    pub results: Vec<PlaylistResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStatus {
    Completed,
    Failed,
}

/// Sections every playlist export under a directory with a bounded worker pool
pub struct BatchSectioner {
    worker: PlaylistWorker,
    worker_semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

/// Per-task state cloned into each spawned job
#[derive(Clone)]
struct PlaylistWorker {
    sectioner: Sectioner,
    cache: Option<PreviewCacheManager>,
    formats: Vec<ExportFormat>,
}

impl BatchSectioner {
    pub async fn new(config: Config, max_workers: usize) -> Result<Self> {
        if max_workers == 0 {
            return Err(anyhow!("max_workers must be greater than 0"));
        }
        info!("🔧 Initializing BatchSectioner with {} workers", max_workers);

        let sectioner = Sectioner::new(config.sectioning.clone())?;

        let cache = if config.cache.enable_caching {
            let manager = PreviewCacheManager::new(config.cache.cache_dir.clone(), config.cache.cache_ttl_hours);
            manager.initialize().await?;
            Some(manager)
        } else {
            None
        };

        Ok(Self {
            worker: PlaylistWorker {
                sectioner,
                cache,
                formats: config.output.export_formats.clone(),
            },
            worker_semaphore: Arc::new(Semaphore::new(max_workers)),
            max_concurrent: max_workers,
        })
    }

    /// Find playlist exports (`*.json`) below `dir`, skipping `exclude`
    pub async fn discover_playlists(&self, dir: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.to_path_buf();
        let exclude = exclude.map(Path::to_path_buf);

        let paths = tokio::task::spawn_blocking(move || {
            let mut found: Vec<PathBuf> = WalkDir::new(&dir)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!("Skipping unreadable entry: {}", e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
                .filter(|path| exclude.as_ref().map_or(true, |ex| !path.starts_with(ex)))
                .collect();
            found.sort();
            found
        })
        .await?;

        Ok(paths)
    }

    /// Section all playlist exports in a directory
    pub async fn process_directory(&self, input_dir: PathBuf, output_dir: PathBuf) -> Result<BatchResult> {
        let start_time = Instant::now();

        info!("🚀 Starting batch sectioning...");
        info!("📁 Input: {}", input_dir.display());
        info!("📂 Output: {}", output_dir.display());

        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory not found: {}", input_dir.display()));
        }
        tokio::fs::create_dir_all(&output_dir).await?;

        let playlist_paths = self.discover_playlists(&input_dir, Some(&output_dir)).await?;

        if playlist_paths.is_empty() {
            warn!("No playlist exports found in {}", input_dir.display());
            return Ok(BatchResult {
                total: 0,
                successful: 0,
                failed: 0,
                total_time: start_time.elapsed(),
                results: Vec::new(),
            });
        }

        info!("📋 Found {} playlist exports to process", playlist_paths.len());

        let total = playlist_paths.len();
        let mut handles = Vec::with_capacity(total);

        for (index, path) in playlist_paths.into_iter().enumerate() {
            let worker = self.worker.clone();
            let input_dir = input_dir.clone();
            let output_dir = output_dir.clone();
            let semaphore = Arc::clone(&self.worker_semaphore);

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                debug!("📋 Processing playlist {}/{}: {}", index + 1, total, path.display());
                let relative = path.strip_prefix(&input_dir).unwrap_or(&path).to_path_buf();
                worker.process_playlist(&path, &relative, &output_dir).await
            }));
        }

        let mut results = Vec::with_capacity(total);
        for joined in futures::future::join_all(handles).await {
            match joined {
                Ok(result) => {
                    match result.status {
                        ProcessingStatus::Completed => info!(
                            "✅ Completed: {} ({} sections) in {:.2}s",
                            result.path.display(),
                            result.section_count,
                            result.processing_time.as_secs_f64()
                        ),
                        ProcessingStatus::Failed => warn!(
                            "❌ Failed: {} - {}",
                            result.path.display(),
                            result.error_message.as_deref().unwrap_or("Unknown error")
                        ),
                    }
                    results.push(result);
                }
                Err(e) => error!("Worker task error: {}", e),
            }
        }

        let successful = results
            .iter()
            .filter(|r| r.status == ProcessingStatus::Completed)
            .count();
        let batch_result = BatchResult {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            total_time: start_time.elapsed(),
            results,
        };

        let results_path = output_dir.join("batch_results.json");
        tokio::fs::write(&results_path, serde_json::to_string_pretty(&batch_result)?).await?;
        info!("💾 Results saved to: {}", results_path.display());

        Ok(batch_result)
    }

    pub fn get_stats(&self) -> BatchStats {
        BatchStats {
            max_workers: self.max_concurrent,
            available_permits: self.worker_semaphore.available_permits(),
        }
    }
}

impl PlaylistWorker {
    async fn process_playlist(&self, path: &Path, relative_path: &Path, output_dir: &Path) -> PlaylistResult {
        let start_time = Instant::now();
        let mut result = PlaylistResult {
            path: path.to_path_buf(),
            playlist_id: None,
            title: None,
            video_count: 0,
            section_count: 0,
            outputs: Vec::new(),
            from_cache: false,
            processing_time: Duration::from_secs(0),
            status: ProcessingStatus::Failed,
            error_message: None,
        };

        match self.preview_for(path).await {
            Ok((preview, from_cache)) => {
                result.playlist_id = Some(preview.playlist_id.clone());
                result.title = Some(preview.title.clone());
                result.video_count = preview.total_videos;
                result.section_count = preview.sections.len();
                result.from_cache = from_cache;

                let stem = output_stem(&preview.playlist_id, relative_path);
                match self.write_outputs(&preview, output_dir, &stem).await {
                    Ok(outputs) => {
                        result.outputs = outputs;
                        result.status = ProcessingStatus::Completed;
                    }
                    Err(e) => result.error_message = Some(format!("Writing outputs failed: {}", e)),
                }
            }
            Err(e) => result.error_message = Some(e.to_string()),
        }

        result.processing_time = start_time.elapsed();
        result
    }

    /// Cached preview when available, otherwise a freshly built (and cached) one
    async fn preview_for(&self, path: &Path) -> Result<(CoursePreview, bool)> {
        let export = PlaylistExport::from_file(path).await?;
        let settings = self.sectioner.config();

        let Some(cache) = &self.cache else {
            return Ok((build_preview(&export, &self.sectioner)?, false));
        };

        let key = cache.preview_key(&export, settings)?;
        if let Some(cached) = cache.load_cached_preview(&key).await {
            return Ok((cached.preview, true));
        }

        let preview = build_preview(&export, &self.sectioner)?;
        if let Err(e) = cache.save_cached_preview(&key, &preview).await {
            warn!("Failed to cache preview {}: {}", key.cache_key, e);
        }
        Ok((preview, false))
    }

    async fn write_outputs(&self, preview: &CoursePreview, output_dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
        let mut outputs = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            let path = output_dir.join(format!("{}.{}", stem, format.extension()));
            tokio::fs::write(&path, render(preview, *format)?).await?;
            outputs.push(path);
        }
        Ok(outputs)
    }
}

/// Output file stem for an export.
///
/// The sanitized playlist id keeps names inside the output directory, the
/// digest of the export's relative path keeps exports sharing an id apart.
fn output_stem(playlist_id: &str, relative_path: &Path) -> String {
    let digest = format!("{:x}", md5::compute(relative_path.to_string_lossy().as_bytes()));
    format!("{}_{}", safe_file_stem(playlist_id), &digest[..8])
}

#[derive(Debug, Clone)]
pub struct BatchStats {
    pub max_workers: usize,
    pub available_permits: usize,
}
