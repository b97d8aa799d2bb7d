//! Render-time lookup from a record variant to how it is drawn.

use common::{FireRecord, FireStatus, RiskTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayDescriptor {
    pub label: &'static str,
    pub marker: &'static str,
}

pub fn descriptor(status: FireStatus, is_hotspot: bool) -> DisplayDescriptor {
    if is_hotspot {
        return DisplayDescriptor {
            label: "Satellite hotspot",
            marker: "◌",
        };
    }
    match status {
        FireStatus::OutOfControl => DisplayDescriptor {
            label: "Out of control",
            marker: "▲",
        },
        FireStatus::BeingHeld => DisplayDescriptor {
            label: "Being held",
            marker: "■",
        },
        FireStatus::UnderControl => DisplayDescriptor {
            label: "Under control",
            marker: "●",
        },
        FireStatus::Out => DisplayDescriptor {
            label: "Out",
            marker: "○",
        },
        FireStatus::Unknown => DisplayDescriptor {
            label: "Unknown status",
            marker: "?",
        },
    }
}

pub fn descriptor_for(record: &FireRecord) -> DisplayDescriptor {
    descriptor(record.status, record.is_hotspot)
}

pub fn risk_badge(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::ExtremeRisk => "[EXTREME]",
        RiskTier::HighRisk => "[HIGH]",
        RiskTier::ModerateRisk => "[MODERATE]",
        RiskTier::LowRisk => "[LOW]",
        RiskTier::MinimalRisk => "[MINIMAL]",
    }
}
