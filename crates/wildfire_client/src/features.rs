//! Feature-service payloads and their conversion to `FireRecord`s.
//!
//! Attribute names differ between agencies, so each field is looked up
//! against a short list of known column names, case-insensitively.

use common::{Coordinate, Error, FireRecord, FireStatus};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Response from a feature-service `query` operation.
#[derive(Debug, Default, Deserialize)]
pub struct FeatureQueryResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub geometry: Option<PointGeometry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PointGeometry {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

const ID_KEYS: &[&str] = &["OBJECTID", "FID"];
const NAME_KEYS: &[&str] = &["FIRE_NAME", "INCIDENT_NAME", "NAME"];
const STATUS_KEYS: &[&str] = &["FIRE_STATUS", "STATUS", "STAGE_OF_CONTROL"];
const AREA_KEYS: &[&str] = &["FIRE_SIZE_HA", "FIRE_SIZE", "SIZE_HA", "AREA_HA", "HECTARES"];
const START_KEYS: &[&str] = &["FIRE_START_DATE", "START_DATE", "IGNITION_DATE"];
const NUMBER_KEYS: &[&str] = &["FIRE_NUMBER", "FIRE_NUM"];
const REGION_KEYS: &[&str] = &["REGION", "FIRE_REGION", "DISTRICT"];
const CAUSE_KEYS: &[&str] = &["FIRE_CAUSE", "GENERAL_CAUSE", "CAUSE"];
const LAT_KEYS: &[&str] = &["LATITUDE", "LAT"];
const LON_KEYS: &[&str] = &["LONGITUDE", "LON", "LONG"];
const CONFIDENCE_KEYS: &[&str] = &["CONFIDENCE"];

fn attr<'a>(attrs: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| {
        attrs
            .iter()
            .find(|(name, value)| name.eq_ignore_ascii_case(key) && !value.is_null())
            .map(|(_, value)| value)
    })
}

fn attr_str(attrs: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match attr(attrs, keys)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn attr_f64(attrs: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    let value = match attr(attrs, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn attr_i64(attrs: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    match attr(attrs, keys)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Geometry first, then latitude/longitude attributes. Out-of-range
/// positions count as missing.
fn feature_location(feature: &Feature) -> Option<Coordinate> {
    let from_geometry = feature
        .geometry
        .as_ref()
        .and_then(|g| Some((g.y?, g.x?)));
    let from_attrs = || {
        Some((
            attr_f64(&feature.attributes, LAT_KEYS)?,
            attr_f64(&feature.attributes, LON_KEYS)?,
        ))
    };
    let (lat, lon) = from_geometry.or_else(from_attrs)?;
    Coordinate::checked(lat, lon)
}

fn check_service_error(response: &FeatureQueryResponse) -> Result<(), Error> {
    match &response.error {
        Some(err) => Err(Error::DataUnavailable(format!(
            "feature service reported error: {}",
            err
        ))),
        None => Ok(()),
    }
}

/// Convert one wildfire feature. `None` when it has no usable location.
pub fn parse_fire(feature: &Feature, index: usize) -> Option<FireRecord> {
    let location = feature_location(feature)?;
    let attrs = &feature.attributes;
    let status = attr_str(attrs, STATUS_KEYS)
        .map(|s| FireStatus::from_code(&s))
        .unwrap_or(FireStatus::Unknown);

    Some(FireRecord {
        id: attr_str(attrs, ID_KEYS).unwrap_or_else(|| format!("fire-{}", index)),
        name: attr_str(attrs, NAME_KEYS),
        status,
        location,
        area_hectares: attr_f64(attrs, AREA_KEYS),
        start_timestamp: attr_i64(attrs, START_KEYS),
        provincial_fire_number: attr_i64(attrs, NUMBER_KEYS),
        region: attr_str(attrs, REGION_KEYS),
        cause: attr_str(attrs, CAUSE_KEYS),
        is_hotspot: false,
        hotspot_confidence: None,
    })
}

/// Active fires in service order. Records without a location, or whose
/// status is `Out` or unrecognized, are dropped.
pub fn parse_active_fires(response: &FeatureQueryResponse) -> Result<Vec<FireRecord>, Error> {
    check_service_error(response)?;

    let fires: Vec<FireRecord> = response
        .features
        .iter()
        .enumerate()
        .filter_map(|(i, f)| parse_fire(f, i))
        .filter(|f| f.status.is_active())
        .collect();

    debug!(
        "Kept {} active fires of {} features",
        fires.len(),
        response.features.len()
    );
    Ok(fires)
}

/// Convert one hotspot feature. `None` when it has no usable location.
pub fn parse_hotspot(feature: &Feature, index: usize) -> Option<FireRecord> {
    let location = feature_location(feature)?;
    let attrs = &feature.attributes;
    let id = attr_str(attrs, ID_KEYS).unwrap_or_else(|| index.to_string());

    Some(FireRecord {
        id: format!("hotspot-{}", id),
        name: None,
        status: FireStatus::Unknown,
        location,
        area_hectares: None,
        start_timestamp: None,
        provincial_fire_number: None,
        region: None,
        cause: None,
        is_hotspot: true,
        hotspot_confidence: attr_str(attrs, CONFIDENCE_KEYS),
    })
}

pub fn parse_hotspots(response: &FeatureQueryResponse) -> Result<Vec<FireRecord>, Error> {
    check_service_error(response)?;

    Ok(response
        .features
        .iter()
        .enumerate()
        .filter_map(|(i, f)| parse_hotspot(f, i))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> FeatureQueryResponse {
        serde_json::from_str(raw).expect("fixture should parse")
    }

    const MIXED_FIXTURE: &str = r#"{
        "features": [
            {"attributes": {"OBJECTID": 11, "FIRE_NAME": "Gander Lake", "FIRE_STATUS": "OC",
                            "FIRE_SIZE_HA": 1250.5, "FIRE_START_DATE": 1717200000000,
                            "FIRE_NUMBER": 24017, "REGION": "Central", "FIRE_CAUSE": "Lightning"},
             "geometry": {"x": -54.75, "y": 48.95}},
            {"attributes": {"OBJECTID": 12, "FIRE_NAME": "Old Burn", "FIRE_STATUS": "O"},
             "geometry": {"x": -55.1, "y": 49.1}},
            {"attributes": {"OBJECTID": 13, "FIRE_NAME": "No Geometry", "FIRE_STATUS": "BH"}},
            {"attributes": {"OBJECTID": 14, "FIRE_NAME": "Mystery", "FIRE_STATUS": "XX"},
             "geometry": {"x": -56.0, "y": 49.5}},
            {"attributes": {"OBJECTID": 15, "FIRE_STATUS": "UC"},
             "geometry": {"x": -57.4, "y": 49.2}},
            {"attributes": {"OBJECTID": 16, "FIRE_STATUS": "BH", "LATITUDE": "52.9", "LONGITUDE": "-66.9"}},
            {"attributes": {"OBJECTID": 17, "FIRE_STATUS": "OC"},
             "geometry": {"x": -54.0, "y": 95.0}},
            {"attributes": {"OBJECTID": 18, "FIRE_STATUS": null},
             "geometry": {"x": -54.0, "y": 48.0}}
        ]
    }"#;

    #[test]
    fn test_active_filter_keeps_service_order() {
        let fires = parse_active_fires(&parse(MIXED_FIXTURE)).unwrap();
        let ids: Vec<&str> = fires.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["11", "15", "16"]);
    }

    #[test]
    fn test_out_and_unlocated_records_excluded() {
        let fires = parse_active_fires(&parse(MIXED_FIXTURE)).unwrap();
        for fire in &fires {
            assert_ne!(fire.status, FireStatus::Out);
            assert_ne!(fire.status, FireStatus::Unknown);
            assert!(fire.location.is_valid());
        }
        assert!(fires.iter().all(|f| f.id != "12" && f.id != "13" && f.id != "17"));
    }

    #[test]
    fn test_all_attributes_mapped() {
        let fires = parse_active_fires(&parse(MIXED_FIXTURE)).unwrap();
        let gander = &fires[0];
        assert_eq!(gander.name.as_deref(), Some("Gander Lake"));
        assert_eq!(gander.status, FireStatus::OutOfControl);
        assert_eq!(gander.location, Coordinate::new(48.95, -54.75));
        assert_eq!(gander.area_hectares, Some(1250.5));
        assert_eq!(gander.start_timestamp, Some(1_717_200_000_000));
        assert_eq!(gander.provincial_fire_number, Some(24017));
        assert_eq!(gander.region.as_deref(), Some("Central"));
        assert_eq!(gander.cause.as_deref(), Some("Lightning"));
        assert!(!gander.is_hotspot);
    }

    #[test]
    fn test_attribute_location_fallback() {
        let fires = parse_active_fires(&parse(MIXED_FIXTURE)).unwrap();
        let labrador = fires.iter().find(|f| f.id == "16").unwrap();
        assert_eq!(labrador.location, Coordinate::new(52.9, -66.9));
    }

    #[test]
    fn test_lowercase_attribute_names() {
        let resp = parse(
            r#"{"features": [{"attributes": {"objectid": 3, "fire_status": "Being Held", "fire_name": "Deer Lake"},
                              "geometry": {"x": -57.43, "y": 49.17}}]}"#,
        );
        let fires = parse_active_fires(&resp).unwrap();
        assert_eq!(fires.len(), 1);
        assert_eq!(fires[0].status, FireStatus::BeingHeld);
        assert_eq!(fires[0].name.as_deref(), Some("Deer Lake"));
    }

    #[test]
    fn test_error_payload_is_unavailable() {
        let resp = parse(r#"{"error": {"code": 400, "message": "Invalid query"}}"#);
        assert!(matches!(
            parse_active_fires(&resp),
            Err(Error::DataUnavailable(_))
        ));
        assert!(parse_hotspots(&resp).is_err());
    }

    #[test]
    fn test_hotspot_fields() {
        let resp = parse(
            r#"{"features": [
                {"attributes": {"OBJECTID": 901, "latitude": 48.2, "longitude": -56.1, "confidence": "high"}},
                {"attributes": {"OBJECTID": 902, "latitude": 48.3, "longitude": -56.2, "confidence": 87}},
                {"attributes": {"OBJECTID": 903, "confidence": "low"}}
            ]}"#,
        );
        let hotspots = parse_hotspots(&resp).unwrap();
        assert_eq!(hotspots.len(), 2);
        assert_eq!(hotspots[0].id, "hotspot-901");
        assert!(hotspots[0].is_hotspot);
        assert_eq!(hotspots[0].hotspot_confidence.as_deref(), Some("high"));
        assert_eq!(hotspots[1].hotspot_confidence.as_deref(), Some("87"));
        assert_eq!(hotspots[0].location, Coordinate::new(48.2, -56.1));
    }
}
