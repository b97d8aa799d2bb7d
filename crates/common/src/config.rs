//! Application configuration types.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Province the search is scoped to.
    #[serde(default)]
    pub region: RegionConfig,

    /// Address geocoding service.
    #[serde(default)]
    pub geocoder: GeocoderConfig,

    /// Wildfire and hotspot feature services.
    #[serde(default)]
    pub wildfire: WildfireConfig,

    /// Session cache timing.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Fixed region bias applied to every search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Appended to every geocoding query (e.g., "Newfoundland and Labrador").
    #[serde(default = "default_region_name")]
    pub name: String,

    /// ISO 3166 alpha-3 country filter for the geocoder.
    #[serde(default = "default_country_code")]
    pub country_code: String,

    /// Envelope used to bound hotspot queries.
    #[serde(default)]
    pub bounds: BoundingBox,
}

/// Lon/lat envelope in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// `xmin,ymin,xmax,ymax`, the envelope form feature services expect.
    pub fn to_envelope_param(&self) -> String {
        format!("{},{},{},{}", self.xmin, self.ymin, self.xmax, self.ymax)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// `findAddressCandidates` endpoint.
    #[serde(default = "default_geocoder_url")]
    pub url: String,

    /// Candidates requested per query. Only the first is used.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WildfireConfig {
    /// Feature-service `query` endpoint for managed wildfire records.
    #[serde(default)]
    pub fires_url: String,

    /// Feature-service `query` endpoint for satellite hotspots.
    #[serde(default = "default_hotspots_url")]
    pub hotspots_url: String,

    /// Whether to fetch hotspot map context at all.
    #[serde(default = "default_true")]
    pub hotspots_enabled: bool,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Cache timing (all values in seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Max age of a cached fetch before it counts as a miss.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// Period of the background timer that clears the cache.
    #[serde(default = "default_invalidation_interval")]
    pub invalidation_interval_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_region_name() -> String {
    "Newfoundland and Labrador".into()
}
fn default_country_code() -> String {
    "CAN".into()
}

fn default_geocoder_url() -> String {
    "https://geocode.arcgis.com/arcgis/rest/services/World/GeocodeServer/findAddressCandidates"
        .into()
}
fn default_max_candidates() -> u32 {
    5
}

fn default_hotspots_url() -> String {
    "https://services9.arcgis.com/RHVPKKiFTONKtxq3/arcgis/rest/services/Satellite_VIIRS_Thermal_Hotspots_and_Fire_Activity/FeatureServer/0/query".into()
}
fn default_timeout_secs() -> u64 {
    20
}

fn default_cache_ttl() -> u64 {
    600
}
fn default_invalidation_interval() -> u64 {
    600
}

impl Default for BoundingBox {
    fn default() -> Self {
        // Newfoundland and Labrador, with a little margin offshore.
        Self {
            xmin: -67.9,
            ymin: 46.5,
            xmax: -52.5,
            ymax: 60.5,
        }
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            name: default_region_name(),
            country_code: default_country_code(),
            bounds: BoundingBox::default(),
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: default_geocoder_url(),
            max_candidates: default_max_candidates(),
        }
    }
}

impl Default for WildfireConfig {
    fn default() -> Self {
        Self {
            fires_url: String::new(),
            hotspots_url: default_hotspots_url(),
            hotspots_enabled: default_true(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            invalidation_interval_secs: default_invalidation_interval(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: RegionConfig::default(),
            geocoder: GeocoderConfig::default(),
            wildfire: WildfireConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}
