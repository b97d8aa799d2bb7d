//! wildfire-watch: active wildfires near an address.
//!
//! Single-binary Tokio application that:
//! 1. Geocodes the address within the configured province
//! 2. Loads active fires through a session cache
//! 3. Ranks them by distance with a risk tier each
//! 4. Prints the result, optionally repeating until Ctrl+C

mod config;
mod display;

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, SecondsFormat};
use clap::Parser;
use tracing::{error, info, warn};

use common::Error;
use geocoder_client::GeocoderClient;
use search::{spawn_invalidation, FireCache, SearchOrchestrator, SearchResult, SessionStore};
use wildfire_client::WildfireClient;

/// Find active wildfires near an address.
#[derive(Parser)]
#[command(name = "wildfire-watch", about = "Active wildfires near an address")]
struct Cli {
    /// Street address or place name within the configured province.
    address: String,

    /// Print the search result as JSON.
    #[arg(long)]
    json: bool,

    /// Re-run the search every N seconds until Ctrl+C.
    #[arg(long, value_name = "SECS")]
    repeat_secs: Option<u64>,

    /// Path to an optional TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

fn print_result(result: &SearchResult) {
    let loc = &result.user_location;
    println!(
        "Location: {} ({:.4}, {:.4}) score={:.0}",
        loc.normalized_address, loc.location.latitude, loc.location.longitude, loc.match_score
    );
    println!(
        "   Last updated: {}{}",
        result
            .last_updated
            .with_timezone(&Local)
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        if result.from_cache { " (cached)" } else { "" }
    );
    if let Some(notice) = result.notice {
        println!("   Notice: {}", notice.message());
    }

    for (i, ranked) in result.ranked_fires.iter().enumerate() {
        let fire = &ranked.fire;
        let look = display::descriptor_for(fire);
        println!(
            "{:>3}. {} {:<28} {:>8.1} km  {:<10} {}{}",
            i + 1,
            look.marker,
            fire.display_name(),
            ranked.distance_km,
            display::risk_badge(ranked.risk_tier),
            look.label,
            fire.area_hectares
                .map(|ha| format!(", {:.1} ha", ha))
                .unwrap_or_default(),
        );
    }

    if !result.hotspots.is_empty() {
        let nearest = &result.hotspots[0];
        let look = display::descriptor_for(&nearest.hotspot);
        println!(
            "   {} {} satellite hotspots in region; nearest {:.1} km",
            look.marker,
            result.hotspots.len(),
            nearest.distance_km
        );
    }
}

fn report_error(e: &Error) {
    if e.is_user_correctable() {
        warn!("Search rejected: {}", e);
    } else {
        error!("Search failed: {}", e);
    }
    eprintln!("{}", e);
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "wildfire_watch=info,geocoder_client=info,wildfire_client=info,search=info".into()
            }),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = match config::load_config(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!("Region: {} ({})", cfg.region.name, cfg.region.country_code);
    if cfg.wildfire.fires_url.is_empty() {
        warn!("No wildfire feed configured (WILDFIRE_FIRES_URL); sample data will be shown");
    }

    let timeout = Duration::from_secs(cfg.wildfire.timeout_secs);
    let geocoder = match GeocoderClient::new(&cfg.geocoder, &cfg.region, timeout) {
        Ok(g) => g,
        Err(e) => {
            error!("Geocoder initialization failed: {}", e);
            std::process::exit(1);
        }
    };
    let wildfire = match WildfireClient::new(&cfg.wildfire, cfg.region.bounds) {
        Ok(w) => w,
        Err(e) => {
            error!("Wildfire client initialization failed: {}", e);
            std::process::exit(1);
        }
    };

    // ── Session state ────────────────────────────────────────────────
    let store = SessionStore::new();
    let cache = FireCache::with_system_clock(store.clone(), Duration::from_secs(cfg.cache.ttl_secs));
    let invalidation_handle = spawn_invalidation(
        cache.clone(),
        Duration::from_secs(cfg.cache.invalidation_interval_secs),
    );
    let orchestrator = SearchOrchestrator::new(geocoder, wildfire, cache, store);

    let mut exit_code;
    loop {
        match orchestrator.search(&cli.address).await {
            Ok(result) => {
                exit_code = 0;
                if cli.json {
                    match serde_json::to_string_pretty(&result) {
                        Ok(s) => println!("{}", s),
                        Err(e) => error!("Failed to serialize result: {}", e),
                    }
                } else {
                    print_result(&result);
                }
            }
            Err(e) => {
                report_error(&e);
                exit_code = if e.is_user_correctable() { 2 } else { 1 };
                // A bad address will not get better by repeating it.
                if e.is_user_correctable() {
                    break;
                }
            }
        }

        let Some(secs) = cli.repeat_secs.filter(|s| *s > 0) else {
            break;
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
        }
    }

    invalidation_handle.abort();
    std::process::exit(exit_code);
}
