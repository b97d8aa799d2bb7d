//! Domain types shared across the pipeline.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ── Geography ─────────────────────────────────────────────────────────

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a coordinate only if both components are finite and in range.
    pub fn checked(latitude: f64, longitude: f64) -> Option<Self> {
        let c = Self::new(latitude, longitude);
        c.is_valid().then_some(c)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// The geocoder's best match for a user-entered address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub location: Coordinate,
    /// Upstream match score (0-100 for ArcGIS).
    pub match_score: f64,
    /// Address as normalized by the geocoding service.
    pub normalized_address: String,
}

// ── Fire records ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireStatus {
    OutOfControl,
    BeingHeld,
    UnderControl,
    Out,
    Unknown,
}

impl FireStatus {
    /// Parse a feature-service status value. Accepts the short agency codes
    /// (`OC`, `BH`, `UC`, `O`) and their spelled-out labels.
    pub fn from_code(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "OC" | "OUT OF CONTROL" => FireStatus::OutOfControl,
            "BH" | "BEING HELD" => FireStatus::BeingHeld,
            "UC" | "UNDER CONTROL" => FireStatus::UnderControl,
            "O" | "OUT" => FireStatus::Out,
            _ => FireStatus::Unknown,
        }
    }

    /// Statuses that belong in the active-fire list.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            FireStatus::OutOfControl | FireStatus::BeingHeld | FireStatus::UnderControl
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            FireStatus::OutOfControl => "Out of Control",
            FireStatus::BeingHeld => "Being Held",
            FireStatus::UnderControl => "Under Control",
            FireStatus::Out => "Out",
            FireStatus::Unknown => "Unknown",
        }
    }
}

/// A wildfire or satellite hotspot as reported by a feature service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireRecord {
    pub id: String,
    pub name: Option<String>,
    pub status: FireStatus,
    pub location: Coordinate,
    pub area_hectares: Option<f64>,
    /// Start of the fire, epoch milliseconds.
    pub start_timestamp: Option<i64>,
    pub provincial_fire_number: Option<i64>,
    pub region: Option<String>,
    pub cause: Option<String>,
    pub is_hotspot: bool,
    pub hotspot_confidence: Option<String>,
}

impl FireRecord {
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.start_timestamp
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// Name for display, falling back to the record id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

// ── Derived results ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    MinimalRisk,
    LowRisk,
    ModerateRisk,
    HighRisk,
    ExtremeRisk,
}

impl RiskTier {
    pub fn label(self) -> &'static str {
        match self {
            RiskTier::ExtremeRisk => "Extreme Risk",
            RiskTier::HighRisk => "High Risk",
            RiskTier::ModerateRisk => "Moderate Risk",
            RiskTier::LowRisk => "Low Risk",
            RiskTier::MinimalRisk => "Minimal Risk",
        }
    }
}

/// A fire annotated with its distance from the searched location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFireRecord {
    #[serde(flatten)]
    pub fire: FireRecord,
    pub distance_km: f64,
    pub risk_tier: RiskTier,
}

/// A hotspot placed relative to the searched location. Map context only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyHotspot {
    #[serde(flatten)]
    pub hotspot: FireRecord,
    pub distance_km: f64,
}
