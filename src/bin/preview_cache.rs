use anyhow::Result;
use clap::{Parser, Subcommand};
use playlist_sectioner::{Config, PreviewCacheManager};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "preview-cache")]
#[command(about = "Course preview cache management utility")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Cache directory (defaults to the configured one)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Cache TTL in hours (defaults to the configured one)
    #[arg(long)]
    ttl_hours: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all cached previews
    List,
    /// Get cache statistics
    Stats,
    /// Invalidate cache for a specific key
    Invalidate {
        /// Cache key to invalidate
        cache_key: String,
    },
    /// Invalidate every cached preview of a playlist
    InvalidatePlaylist {
        /// Playlist id (e.g., "PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG")
        playlist_id: String,
    },
    /// Clear all cache entries
    Clear,
    /// Clean up expired cache entries
    Cleanup,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    let cache_manager = PreviewCacheManager::new(
        cli.cache_dir.unwrap_or_else(|| config.cache.cache_dir.clone()),
        cli.ttl_hours.unwrap_or(config.cache.cache_ttl_hours),
    );
    cache_manager.initialize().await?;

    match cli.command {
        Commands::List => {
            let previews = cache_manager.list_cached_previews().await?;

            if previews.is_empty() {
                info!("📭 No cached previews found");
                return Ok(());
            }

            info!("📚 Found {} cached previews:", previews.len());

            for preview in previews {
                let status = if preview.is_valid { "✅ Valid" } else { "❌ Expired" };
                info!("  {} - {} sections, {} hours old, {}",
                     preview.cache_key,
                     preview.section_count,
                     preview.age_hours,
                     status);
                info!("    Playlist: {} ({})", preview.title, preview.playlist_id);
            }
        }

        Commands::Stats => {
            let stats = cache_manager.get_cache_stats().await?;
            info!("📊 Cache Statistics:");
            info!("  Total files: {}", stats.total_files);
            info!("  Valid files: {}", stats.valid_files);
            info!("  Expired files: {}", stats.expired_files);
            info!("  Unreadable files: {}", stats.unreadable_files);
            info!("  Total sections: {}", stats.total_sections);
        }

        Commands::Invalidate { cache_key } => {
            let removed = cache_manager.invalidate_cache(&cache_key).await?;
            if removed {
                info!("✅ Successfully invalidated cache for: {}", cache_key);
            } else {
                warn!("⚠️ Cache key not found: {}", cache_key);
            }
        }

        Commands::InvalidatePlaylist { playlist_id } => {
            let removed = cache_manager.invalidate_playlist_cache(&playlist_id).await?;
            if removed > 0 {
                info!("✅ Invalidated {} cache files for playlist: {}", removed, playlist_id);
            } else {
                warn!("⚠️ No cache found for playlist: {}", playlist_id);
            }
        }

        Commands::Clear => {
            let count = cache_manager.clear_all_cache().await?;
            info!("🧹 Cleared {} cache files", count);
        }

        Commands::Cleanup => {
            let count = cache_manager.cleanup_expired_cache().await?;
            info!("🗑️ Cleaned up {} expired cache files", count);
        }
    }

    Ok(())
}
