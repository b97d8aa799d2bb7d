//! Wildfire feature-service client.
//!
//! Fetches managed wildfire records and satellite hotspots from ArcGIS
//! feature services. A failed wildfire fetch never reaches the caller: the
//! client substitutes a fixed sample set and flags the outcome as degraded.
//! A failed hotspot fetch yields no hotspots.

pub mod fallback;
pub mod features;

use std::time::Duration;

use common::config::{BoundingBox, WildfireConfig};
use common::{truncate_body, Error, FireRecord};
use tracing::{debug, info, warn};

use crate::features::{parse_active_fires, parse_hotspots, FeatureQueryResponse};

pub use fallback::fallback_fires;

/// Result of an active-fire fetch. `degraded` is true when `records` is the
/// fallback sample set rather than live data.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub records: Vec<FireRecord>,
    pub degraded: bool,
}

impl FetchOutcome {
    pub fn live(records: Vec<FireRecord>) -> Self {
        Self {
            records,
            degraded: false,
        }
    }

    pub fn fallback() -> Self {
        Self {
            records: fallback_fires(),
            degraded: true,
        }
    }
}

/// Feature-service client with connection pooling.
#[derive(Debug, Clone)]
pub struct WildfireClient {
    client: reqwest::Client,
    fires_url: String,
    hotspots_url: String,
    hotspots_enabled: bool,
    bounds: BoundingBox,
}

impl WildfireClient {
    pub fn new(config: &WildfireConfig, bounds: BoundingBox) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent("wildfire-watch/0.1")
            .pool_max_idle_per_host(4)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build wildfire HTTP client: {}", e)))?;

        Ok(Self {
            client,
            fires_url: config.fires_url.clone(),
            hotspots_url: config.hotspots_url.clone(),
            hotspots_enabled: config.hotspots_enabled,
            bounds,
        })
    }

    async fn query(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<FeatureQueryResponse, Error> {
        if url.trim().is_empty() {
            return Err(Error::DataUnavailable("no feature service URL configured".into()));
        }

        debug!("Querying feature service: {}", url);

        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| Error::DataUnavailable(format!("HTTP error: {}", e)))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::DataUnavailable(format!(
                "feature service returned {}: {}",
                status,
                truncate_body(&body, 500)
            )));
        }

        resp.json()
            .await
            .map_err(|e| Error::DataUnavailable(format!("JSON parse error: {}", e)))
    }

    /// Fetch every wildfire record and keep the active ones.
    pub async fn try_fetch_active_fires(&self) -> Result<Vec<FireRecord>, Error> {
        let params = [
            ("where", "1=1".to_string()),
            ("outFields", "*".to_string()),
            ("f", "json".to_string()),
            ("returnGeometry", "true".to_string()),
            ("outSR", "4326".to_string()),
        ];
        let response = self.query(&self.fires_url, &params).await?;
        parse_active_fires(&response)
    }

    /// Active fires, or the fallback set flagged as degraded on any failure.
    pub async fn fetch_active_fires(&self) -> FetchOutcome {
        match self.try_fetch_active_fires().await {
            Ok(records) => {
                info!("Fetched {} active fires", records.len());
                FetchOutcome::live(records)
            }
            Err(e) => {
                warn!("Wildfire fetch failed, serving sample data: {}", e);
                FetchOutcome::fallback()
            }
        }
    }

    pub async fn try_fetch_hotspots(&self) -> Result<Vec<FireRecord>, Error> {
        let params = [
            ("where", "1=1".to_string()),
            ("geometry", self.bounds.to_envelope_param()),
            ("geometryType", "esriGeometryEnvelope".to_string()),
            ("inSR", "4326".to_string()),
            ("spatialRel", "esriSpatialRelIntersects".to_string()),
            ("outFields", "*".to_string()),
            ("returnGeometry", "true".to_string()),
            ("outSR", "4326".to_string()),
            ("f", "json".to_string()),
        ];
        let response = self.query(&self.hotspots_url, &params).await?;
        parse_hotspots(&response)
    }

    /// Hotspots inside the configured envelope; empty on any failure.
    pub async fn fetch_hotspots(&self) -> Vec<FireRecord> {
        if !self.hotspots_enabled {
            return Vec::new();
        }
        match self.try_fetch_hotspots().await {
            Ok(hotspots) => {
                debug!("Fetched {} hotspots", hotspots.len());
                hotspots
            }
            Err(e) => {
                debug!("Hotspot fetch failed: {}", e);
                Vec::new()
            }
        }
    }
}
