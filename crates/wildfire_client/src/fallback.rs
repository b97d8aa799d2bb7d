//! Hardcoded sample fires shown when the live feed cannot be read.

use common::{Coordinate, FireRecord, FireStatus};

#[allow(clippy::too_many_arguments)]
fn sample(
    id: &str,
    name: &str,
    status: FireStatus,
    location: Coordinate,
    area_hectares: f64,
    start_timestamp: i64,
    fire_number: i64,
    region: &str,
    cause: &str,
) -> FireRecord {
    FireRecord {
        id: id.into(),
        name: Some(name.into()),
        status,
        location,
        area_hectares: Some(area_hectares),
        start_timestamp: Some(start_timestamp),
        provincial_fire_number: Some(fire_number),
        region: Some(region.into()),
        cause: Some(cause.into()),
        is_hotspot: false,
        hotspot_confidence: None,
    }
}

/// Four representative active fires across the province.
pub fn fallback_fires() -> Vec<FireRecord> {
    vec![
        sample(
            "sample-1",
            "Gander Lake Fire",
            FireStatus::OutOfControl,
            Coordinate::new(48.9500, -54.7500),
            1250.0,
            1_717_200_000_000,
            24_001,
            "Central",
            "Lightning",
        ),
        sample(
            "sample-2",
            "Deer Lake Fire",
            FireStatus::BeingHeld,
            Coordinate::new(49.1700, -57.4300),
            340.0,
            1_717_545_600_000,
            24_002,
            "Western",
            "Human",
        ),
        sample(
            "sample-3",
            "Labrador West Fire",
            FireStatus::UnderControl,
            Coordinate::new(52.9400, -66.9100),
            5200.0,
            1_716_940_800_000,
            24_003,
            "Labrador",
            "Lightning",
        ),
        sample(
            "sample-4",
            "Paddy's Pond Fire",
            FireStatus::OutOfControl,
            Coordinate::new(47.4700, -52.9300),
            85.0,
            1_717_804_800_000,
            24_004,
            "Eastern",
            "Under Investigation",
        ),
    ]
}
