//! Search orchestrator.
//!
//! `search(address)` geocodes the address, loads active fires through the
//! cache, and returns them ranked by distance with a risk tier each.
//! Hotspots ride along as map context and never enter the ranked list.
//!
//! Every search takes a monotonic request token. The shared presentation
//! state only accepts a result whose token is at least as new as the one it
//! holds, so a slow search that finishes after a newer one is discarded
//! from the state and from the saved hotspot context (its caller still
//! gets its own result).

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use common::{
    distance_km, Coordinate, Error, FireRecord, GeocodeResult, NearbyHotspot, RankedFireRecord,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::FireCache;
use crate::risk::risk_tier;
use crate::sources::{FireSource, Geocoder};
use crate::store::{SessionStore, HOTSPOTS_KEY};

/// Informational conditions attached to a successful search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// The live feed has no active fires.
    AreaClear,
    /// The live feed failed; fires shown are sample data.
    DegradedData,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::AreaClear => "No active wildfires reported. The area is clear.",
            Notice::DegradedData => {
                "Live wildfire data is unavailable. Showing sample data for reference only."
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub request_token: u64,
    pub user_location: GeocodeResult,
    /// Ascending by distance; ties keep fetch order.
    pub ranked_fires: Vec<RankedFireRecord>,
    /// Map context, ascending by distance.
    pub hotspots: Vec<NearbyHotspot>,
    pub notice: Option<Notice>,
    /// When the fire data was fetched.
    pub last_updated: DateTime<Utc>,
    pub from_cache: bool,
}

/// What the presentation layer renders after the latest search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchState {
    pub request_token: u64,
    pub user_location: Option<GeocodeResult>,
    pub ranked_fires: Vec<RankedFireRecord>,
    pub hotspots: Vec<NearbyHotspot>,
    /// Error text or informational banner.
    pub message: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Distance and risk for each fire, sorted ascending by distance. The sort
/// is stable, so equidistant fires keep their input order.
pub fn rank_fires(origin: Coordinate, fires: Vec<FireRecord>) -> Vec<RankedFireRecord> {
    let mut ranked: Vec<RankedFireRecord> = fires
        .into_iter()
        .map(|fire| {
            let d = distance_km(origin, fire.location);
            RankedFireRecord {
                risk_tier: risk_tier(d, fire.status),
                distance_km: d,
                fire,
            }
        })
        .collect();
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}

pub fn place_hotspots(origin: Coordinate, hotspots: Vec<FireRecord>) -> Vec<NearbyHotspot> {
    let mut placed: Vec<NearbyHotspot> = hotspots
        .into_iter()
        .map(|hotspot| NearbyHotspot {
            distance_km: distance_km(origin, hotspot.location),
            hotspot,
        })
        .collect();
    placed.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    placed
}

fn epoch_ms_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_else(Utc::now)
}

struct ActiveFires {
    records: Vec<FireRecord>,
    degraded: bool,
    fetched_at_ms: i64,
    from_cache: bool,
}

pub struct SearchOrchestrator<G, F> {
    geocoder: G,
    source: F,
    cache: FireCache,
    store: SessionStore,
    last_token: AtomicU64,
    state: RwLock<SearchState>,
}

impl<G: Geocoder, F: FireSource> SearchOrchestrator<G, F> {
    pub fn new(geocoder: G, source: F, cache: FireCache, store: SessionStore) -> Self {
        Self {
            geocoder,
            source,
            cache,
            store,
            last_token: AtomicU64::new(0),
            state: RwLock::new(SearchState::default()),
        }
    }

    pub fn cache(&self) -> &FireCache {
        &self.cache
    }

    /// Snapshot of the latest published state.
    pub async fn state(&self) -> SearchState {
        self.state.read().await.clone()
    }

    /// Hotspot context saved by the most recent search.
    pub fn saved_hotspots(&self) -> Vec<NearbyHotspot> {
        self.store.get_json(HOTSPOTS_KEY).unwrap_or_default()
    }

    pub async fn search(&self, address: &str) -> Result<SearchResult, Error> {
        let token = self.last_token.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = self.run_search(token, address).await;
        self.publish(token, &outcome).await;
        outcome
    }

    async fn run_search(&self, token: u64, address: &str) -> Result<SearchResult, Error> {
        let address = address.trim();
        if address.is_empty() {
            return Err(Error::InvalidInput("please enter an address".into()));
        }

        info!("Search #{}: {:?}", token, address);
        let user_location = self.geocoder.geocode(address).await?;
        let origin = user_location.location;

        let (active, hotspots) = tokio::join!(self.active_fires(), self.source.fetch_hotspots());

        let ranked_fires = rank_fires(origin, active.records);
        let hotspots = place_hotspots(origin, hotspots);

        let notice = if active.degraded {
            Some(Notice::DegradedData)
        } else if ranked_fires.is_empty() {
            Some(Notice::AreaClear)
        } else {
            None
        };

        info!(
            "Search #{}: {} fires, {} hotspots near {} (cache={}, degraded={})",
            token,
            ranked_fires.len(),
            hotspots.len(),
            user_location.normalized_address,
            active.from_cache,
            active.degraded
        );

        Ok(SearchResult {
            request_token: token,
            user_location,
            ranked_fires,
            hotspots,
            notice,
            last_updated: epoch_ms_to_datetime(active.fetched_at_ms),
            from_cache: active.from_cache,
        })
    }

    /// Cached fires when fresh, otherwise a fetch. Fallback data is never
    /// cached so the next search retries the live feed.
    async fn active_fires(&self) -> ActiveFires {
        if let Some(entry) = self.cache.fresh_entry() {
            debug!("Fire cache hit ({} records)", entry.payload.len());
            return ActiveFires {
                records: entry.payload,
                degraded: false,
                fetched_at_ms: entry.fetched_at_epoch_ms,
                from_cache: true,
            };
        }

        let outcome = self.source.fetch_active_fires().await;
        if !outcome.degraded {
            self.cache.set_cached(outcome.records.clone());
        }
        ActiveFires {
            records: outcome.records,
            degraded: outcome.degraded,
            fetched_at_ms: self.cache.now_ms(),
            from_cache: false,
        }
    }

    async fn publish(&self, token: u64, outcome: &Result<SearchResult, Error>) {
        let mut state = self.state.write().await;
        if token < state.request_token {
            debug!(
                "Discarding search #{}; #{} already published",
                token, state.request_token
            );
            return;
        }

        // Saved hotspot context follows the same token guard as the state.
        if let Ok(result) = outcome {
            if let Err(e) = self.store.set_json(HOTSPOTS_KEY, &result.hotspots) {
                warn!("Failed to save hotspot context: {}", e);
            }
        }

        *state = match outcome {
            Ok(result) => SearchState {
                request_token: token,
                user_location: Some(result.user_location.clone()),
                ranked_fires: result.ranked_fires.clone(),
                hotspots: result.hotspots.clone(),
                message: result.notice.map(|n| n.message().to_string()),
                last_updated: Some(result.last_updated),
            },
            Err(e) => SearchState {
                request_token: token,
                message: Some(e.to_string()),
                ..SearchState::default()
            },
        };
    }
}
