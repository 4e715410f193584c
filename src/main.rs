use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

use playlist_sectioner::config::CONFIG_PATHS;
use playlist_sectioner::export::render;
use playlist_sectioner::{
    build_preview, BatchSectioner, Config, CoursePreview, ExportFormat, PlaylistExport,
    PreviewCacheManager, Sectioner,
};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[derive(Parser)]
#[command(name = "playlist-sectioner")]
#[command(version, about = "Turn video playlists into sectioned course outlines")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to the standard search paths)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sections of a playlist export as JSON
    Section {
        /// Playlist export file
        file: PathBuf,
    },
    /// Build a course preview for a playlist export
    Preview {
        /// Playlist export file
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip the preview cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Section every playlist export under a directory
    Batch {
        /// Directory containing playlist exports
        dir: PathBuf,
        /// Output directory for results
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Number of parallel workers
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Inspect or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration to a file
    Init {
        /// Target file
        #[arg(default_value = "playlist-sectioner.toml")]
        path: PathBuf,
    },
    /// Print the effective configuration
    Show,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };
    config.validate()?;
    Ok(config)
}

fn crate_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("playlist_sectioner={},warn", level))
}

/// Install the global subscriber; `RUST_LOG` wins over the verbosity flag
fn init_logging(from_env: Option<EnvFilter>, verbose: bool) -> FilterHandle {
    let level = if verbose { "debug" } else { "info" };
    let (filter, handle) = reload::Layer::new(from_env.unwrap_or_else(|| crate_filter(level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    handle
}

fn apply_log_level(handle: &FilterHandle, level: &str) {
    if let Err(e) = handle.modify(|filter| *filter = crate_filter(level)) {
        warn!("Failed to apply log level {}: {}", level, e);
    }
}

async fn cached_preview(config: &Config, file: &Path, use_cache: bool) -> Result<CoursePreview> {
    let export = PlaylistExport::from_file(file).await?;
    let sectioner = Sectioner::new(config.sectioning.clone())?;

    if !use_cache || !config.cache.enable_caching {
        return Ok(build_preview(&export, &sectioner)?);
    }

    let cache = PreviewCacheManager::new(config.cache.cache_dir.clone(), config.cache.cache_ttl_hours);
    cache.initialize().await?;

    let key = cache.preview_key(&export, &config.sectioning)?;
    if let Some(cached) = cache.load_cached_preview(&key).await {
        return Ok(cached.preview);
    }

    let preview = build_preview(&export, &sectioner)?;
    cache.save_cached_preview(&key, &preview).await?;
    Ok(preview)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging before the config is read, then apply its level
    let from_env = EnvFilter::try_from_default_env().ok();
    let has_env_filter = from_env.is_some();
    let filter_handle = init_logging(from_env, cli.verbose);

    let config = load_config(cli.config.as_ref())?;
    if !has_env_filter && !cli.verbose {
        apply_log_level(&filter_handle, &config.output.log_level);
    }

    match cli.command {
        Commands::Section { file } => {
            let export = PlaylistExport::from_file(&file).await?;
            let sectioner = Sectioner::new(config.sectioning.clone())?;
            let sections = sectioner.section(&export.to_videos());
            info!("📚 {} sections", sections.len());
            println!("{}", serde_json::to_string_pretty(&sections)?);
        }

        Commands::Preview { file, format, output, no_cache } => {
            let preview = cached_preview(&config, &file, !no_cache).await?;
            let rendered = render(&preview, format)?;

            match output {
                Some(path) => {
                    tokio::fs::write(&path, rendered).await?;
                    info!("💾 Preview written to: {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Batch { dir, output_dir, workers } => {
            let output_dir = output_dir.unwrap_or_else(|| config.output.base_dir.clone());
            let workers = workers.unwrap_or(config.performance.max_workers);

            info!("🚀 Playlist Sectioner starting...");
            info!("📁 Input directory: {}", dir.display());
            info!("📂 Output directory: {}", output_dir.display());
            info!("🔧 Workers: {}", workers);

            if !dir.exists() {
                error!("Input directory does not exist: {}", dir.display());
                return Err(anyhow!("Input directory not found"));
            }

            let batch = BatchSectioner::new(config, workers).await?;
            let start_time = std::time::Instant::now();
            let results = batch.process_directory(dir, output_dir).await?;
            let duration = start_time.elapsed();

            info!("🎉 Processing completed in {:.2}s", duration.as_secs_f64());
            info!("✅ Successful: {}", results.successful);
            info!("❌ Failed: {}", results.failed);
            info!("📊 Success rate: {:.1}%",
                if results.total > 0 {
                    results.successful as f64 / results.total as f64 * 100.0
                } else {
                    0.0
                }
            );
        }

        Commands::Config { action } => match action {
            ConfigAction::Init { path } => {
                if path.exists() {
                    return Err(anyhow!("Refusing to overwrite existing file: {}", path.display()));
                }
                Config::default().save(&path)?;
            }
            ConfigAction::Show => {
                info!("🔍 Config search paths: {}", CONFIG_PATHS.join(", "));
                println!("{}", config.summary());
            }
        },
    }

    Ok(())
}
