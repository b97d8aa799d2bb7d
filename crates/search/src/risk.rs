//! Risk classifier: (distance, status) to a risk tier.

use common::{FireStatus, RiskTier};

/// Distance bands, in km, for fires that are out of control.
pub const EXTREME_WITHIN_KM: f64 = 10.0;
pub const HIGH_WITHIN_KM: f64 = 25.0;
pub const MODERATE_WITHIN_KM: f64 = 50.0;
/// Band for out-of-control or held fires.
pub const LOW_WITHIN_KM: f64 = 100.0;

/// Classify a fire. Rules are checked top to bottom; the first match wins,
/// so an out-of-control fire at 60 km lands in `LowRisk`.
pub fn risk_tier(distance_km: f64, status: FireStatus) -> RiskTier {
    let out_of_control = status == FireStatus::OutOfControl;

    if out_of_control && distance_km < EXTREME_WITHIN_KM {
        RiskTier::ExtremeRisk
    } else if out_of_control && distance_km < HIGH_WITHIN_KM {
        RiskTier::HighRisk
    } else if out_of_control && distance_km < MODERATE_WITHIN_KM {
        RiskTier::ModerateRisk
    } else if matches!(status, FireStatus::OutOfControl | FireStatus::BeingHeld)
        && distance_km < LOW_WITHIN_KM
    {
        RiskTier::LowRisk
    } else {
        RiskTier::MinimalRisk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_table_fixtures() {
        assert_eq!(risk_tier(5.0, FireStatus::OutOfControl), RiskTier::ExtremeRisk);
        assert_eq!(risk_tier(15.0, FireStatus::OutOfControl), RiskTier::HighRisk);
        assert_eq!(risk_tier(40.0, FireStatus::OutOfControl), RiskTier::ModerateRisk);
        assert_eq!(risk_tier(60.0, FireStatus::OutOfControl), RiskTier::LowRisk);
        assert_eq!(risk_tier(60.0, FireStatus::BeingHeld), RiskTier::LowRisk);
        assert_eq!(risk_tier(200.0, FireStatus::OutOfControl), RiskTier::MinimalRisk);
        assert_eq!(risk_tier(5.0, FireStatus::UnderControl), RiskTier::MinimalRisk);
    }

    #[test]
    fn test_band_edges_are_exclusive() {
        assert_eq!(risk_tier(10.0, FireStatus::OutOfControl), RiskTier::HighRisk);
        assert_eq!(risk_tier(25.0, FireStatus::OutOfControl), RiskTier::ModerateRisk);
        assert_eq!(risk_tier(50.0, FireStatus::OutOfControl), RiskTier::LowRisk);
        assert_eq!(risk_tier(100.0, FireStatus::OutOfControl), RiskTier::MinimalRisk);
        assert_eq!(risk_tier(100.0, FireStatus::BeingHeld), RiskTier::MinimalRisk);
    }

    #[test]
    fn test_held_fire_never_above_low() {
        for d in [0.0, 1.0, 9.9, 24.0, 49.0, 99.9] {
            assert_eq!(risk_tier(d, FireStatus::BeingHeld), RiskTier::LowRisk, "d={}", d);
        }
    }

    #[test]
    fn test_inactive_statuses_minimal() {
        for status in [FireStatus::UnderControl, FireStatus::Out, FireStatus::Unknown] {
            assert_eq!(risk_tier(0.0, status), RiskTier::MinimalRisk);
        }
    }

    #[test]
    fn test_tier_never_increases_with_distance() {
        for status in [FireStatus::OutOfControl, FireStatus::BeingHeld] {
            let mut previous = RiskTier::ExtremeRisk;
            for step in 0..300 {
                let tier = risk_tier(step as f64 * 0.5, status);
                assert!(tier <= previous, "{:?} rose at {} km", status, step as f64 * 0.5);
                previous = tier;
            }
        }
    }
}
