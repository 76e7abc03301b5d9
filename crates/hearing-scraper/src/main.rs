//! Senate hearing page scraper
//!
//! Fetches a subcommittee hearing page through the cached, rate-accounted
//! fetcher and prints the stripped page text. The cache and the rate
//! tracker both persist under `--cache-dir`, so repeated runs within the
//! TTL read from disk instead of the network.

mod extract;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

use file_kv_cache::{Cache, DiskCache, DiskCacheConfig};
use page_fetcher::Fetcher;
use rate_tracker::RateTracker;

#[derive(Debug, Parser)]
#[command(
    name = "hearing-scraper",
    about = "Scrape a senate subcommittee hearing page"
)]
struct Args {
    /// URL of the hearing page to scrape
    #[arg(long, short = 'u')]
    hearing_url: String,

    /// Root directory for cached responses and rate buckets
    #[arg(long, default_value = ".cache")]
    cache_dir: PathBuf,

    /// Entry-count bound for each cache
    #[arg(long, default_value_t = 100)]
    max_entries: usize,

    /// Seconds before a cached response expires
    #[arg(long, default_value_t = 3600)]
    ttl_secs: u64,

    /// Minutes of request history the rate tracker retains
    #[arg(long, default_value_t = 60)]
    window_minutes: u32,

    /// Bypass the response cache and always hit the network
    #[arg(long)]
    no_cache: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("hearing_scraper=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let args = Args::parse();
    info!("Cache dir: {:?}", args.cache_dir);
    info!("Cache TTL: {} seconds", args.ttl_secs);

    let fetcher = build_fetcher(&args).await?;

    let response = fetcher
        .fetch(&args.hearing_url, !args.no_cache)
        .await
        .with_context(|| format!("Failed to retrieve {}", args.hearing_url))?;

    if !response.content_type.contains("text/html") {
        warn!(
            content_type = %response.content_type,
            "Page is not HTML, printing body as text"
        );
        println!("{}", response.text());
        return Ok(());
    }

    println!("{}", extract::extract_page_text(&response.text()));
    Ok(())
}

/// Wire the disk caches, tracker, and fetcher together. Responses and
/// rate buckets get separate subdirectories so their keys never mix.
async fn build_fetcher(args: &Args) -> anyhow::Result<Fetcher> {
    let responses = DiskCache::new(DiskCacheConfig {
        cache_dir: args.cache_dir.join("responses"),
        max_entries: args.max_entries,
        ttl_secs: args.ttl_secs,
    });
    responses
        .init()
        .await
        .context("Failed to create response cache directory")?;

    let buckets = DiskCache::new(DiskCacheConfig {
        cache_dir: args.cache_dir.join("rate"),
        max_entries: args.max_entries,
        // Buckets live exactly as long as the tracker window.
        ttl_secs: u64::from(args.window_minutes) * 60,
    });
    buckets
        .init()
        .await
        .context("Failed to create rate bucket directory")?;

    let tracker = RateTracker::with_window(Arc::new(buckets), args.window_minutes);
    let url_cache: Arc<dyn Cache> = Arc::new(responses);

    Ok(Fetcher::with_cache(tracker, Some(url_cache)))
}
