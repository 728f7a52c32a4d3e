//! reviewcache - command-line access to the restaurant-review offline cache.
//!
//! Reads go to the review service first and fall back to the local cache;
//! reviews and favorites that cannot be posted are queued and replayed by
//! `reviewcache sync` or `reviewcache watch`.

use std::io;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reviewcache_core::store::{CollectionAges, PendingCounts};
use reviewcache_core::sync::query::ALL;
use reviewcache_core::{Config, NewReview, ReviewCache, SubmitOutcome};

const USAGE: &str = "\
Usage: reviewcache <command> [args]

Commands:
  restaurants [cuisine] [neighborhood]   List restaurants (\"all\" disables a filter)
  restaurant <id>                        Show one restaurant
  reviews <restaurant_id>                List reviews of a restaurant
  neighborhoods                          List distinct neighborhoods
  cuisines                               List distinct cuisines
  review <restaurant_id> <rating> <name> <comments>
                                         Post a review (queued when offline)
  favorite <restaurant_id> <true|false>  Mark or unmark a favorite (queued when offline)
  sync                                   Replay queued reviews and favorites once
  watch                                  Replay queued writes periodically until Ctrl-C
  status                                 Show cache ages and queued writes";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr and to a daily file under `<data_dir>/logs`. The returned
/// guard must be held until exit so the file writer flushes.
fn init_tracing(data_dir: &Path) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_appender = tracing_appender::rolling::daily(data_dir.join("logs"), "reviewcache.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .with(filter)
        .init();

    guard
}

#[derive(Serialize)]
struct Status<'a> {
    base_url: &'a str,
    data_dir: String,
    cache_ages: CollectionAges,
    pending: PendingCounts,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum WriteResult<T> {
    Synced { record: T },
    Queued,
}

impl<T> From<SubmitOutcome<T>> for WriteResult<T> {
    fn from(outcome: SubmitOutcome<T>) -> Self {
        match outcome {
            SubmitOutcome::Synced(record) => WriteResult::Synced { record },
            SubmitOutcome::Queued => WriteResult::Queued,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("Missing argument <{}>\n\n{}", name, USAGE))
}

fn parse_id(value: &str) -> Result<i64> {
    value
        .parse()
        .with_context(|| format!("Invalid restaurant id: {}", value))
}

fn parse_rating(value: &str) -> Result<u8> {
    match value.parse::<u8>() {
        Ok(rating @ 1..=5) => Ok(rating),
        _ => bail!("Rating must be a whole number from 1 to 5, got {}", value),
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        _ => bail!("Expected true or false, got {}", value),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };
    if matches!(command, "-h" | "--help" | "help") {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load()?;
    let data_dir = config.data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    let _log_guard = init_tracing(&data_dir);
    info!(command, base_url = %config.base_url, "reviewcache starting");

    let cache = ReviewCache::open(&config).await?;
    let engine = &cache.engine;

    match command {
        "restaurants" => {
            let cuisine = args.get(1).map(String::as_str).unwrap_or(ALL);
            let neighborhood = args.get(2).map(String::as_str).unwrap_or(ALL);
            let restaurants = engine
                .fetch_restaurants_by_cuisine_and_neighborhood(cuisine, neighborhood)
                .await?;
            print_json(&restaurants)?;
        }
        "restaurant" => {
            let id = parse_id(arg(&args, 1, "id")?)?;
            print_json(&engine.fetch_restaurant_by_id(id).await?)?;
        }
        "reviews" => {
            let id = parse_id(arg(&args, 1, "restaurant_id")?)?;
            print_json(&engine.fetch_reviews_by_restaurant_id(id).await?)?;
        }
        "neighborhoods" => print_json(&engine.fetch_neighborhoods().await?)?,
        "cuisines" => print_json(&engine.fetch_cuisines().await?)?,
        "review" => {
            let review = NewReview::new(
                parse_id(arg(&args, 1, "restaurant_id")?)?,
                arg(&args, 3, "name")?,
                parse_rating(arg(&args, 2, "rating")?)?,
                args[4..].join(" "),
            );
            if review.comments.trim().is_empty() {
                bail!("Missing argument <comments>\n\n{}", USAGE);
            }
            let outcome = engine.submit_review(review).await?;
            print_json(&WriteResult::from(outcome))?;
        }
        "favorite" => {
            let id = parse_id(arg(&args, 1, "restaurant_id")?)?;
            let is_favorite = parse_flag(arg(&args, 2, "true|false")?)?;
            let outcome = engine.submit_favorite(id, is_favorite).await?;
            print_json(&WriteResult::from(outcome))?;
        }
        "sync" => {
            let report = cache.replay.run_once().await?;
            print_json(&report)?;
        }
        "watch" => {
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let handle = cache
                .replay
                .clone()
                .spawn_periodic(config.replay_interval(), shutdown_rx);
            eprintln!(
                "Replaying queued writes every {}s, press Ctrl-C to stop",
                config.replay_interval().as_secs()
            );

            tokio::signal::ctrl_c().await?;
            let _ = shutdown_tx.send(true);
            handle.await?;
        }
        "status" => {
            let store = cache.store();
            print_json(&Status {
                base_url: &config.base_url,
                data_dir: store.data_dir().display().to_string(),
                cache_ages: store.collection_ages().await?,
                pending: store.pending_counts().await?,
            })?;
        }
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    }

    info!("reviewcache finished");
    Ok(())
}
