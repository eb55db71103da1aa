//! Risk tier classification.
//!
//! Boundaries: `< 75` at risk, `75..=80` near risk, `> 80` safe. Both 75.0 and
//! 80.0 fall in the near-risk tier.

use serde::{Deserialize, Serialize};

/// Lowest percentage that is not at risk.
pub const AT_RISK_BELOW: f64 = 75.0;
/// Highest percentage that is still near risk.
pub const NEAR_RISK_UP_TO: f64 = 80.0;

/// Risk tier derived from an attendance percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    AtRisk,
    NearRisk,
    Safe,
}

impl RiskTier {
    /// Stable machine-readable id.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AtRisk => "at_risk",
            Self::NearRisk => "near_risk",
            Self::Safe => "safe",
        }
    }

    /// Short user-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::AtRisk => "At Risk",
            Self::NearRisk => "Near Risk",
            Self::Safe => "Safe",
        }
    }
}

/// Classifies a percentage into a risk tier.
///
/// Callers must pass finite values; NaN lands in `Safe` only because every
/// comparison fails, which is not a contract.
pub fn classify(percentage: f64) -> RiskTier {
    if percentage < AT_RISK_BELOW {
        RiskTier::AtRisk
    } else if percentage <= NEAR_RISK_UP_TO {
        RiskTier::NearRisk
    } else {
        RiskTier::Safe
    }
}

/// Headline standing for the aggregate record.
///
/// Two-state: anything at or above 75% is safe territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStanding {
    SafeTerritory,
    AtRisk,
}

impl OverallStanding {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= AT_RISK_BELOW {
            Self::SafeTerritory
        } else {
            Self::AtRisk
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Self::SafeTerritory => "Safe Territory",
            Self::AtRisk => "At Risk",
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            Self::SafeTerritory => "Optimal Standing",
            Self::AtRisk => "Action Required",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, OverallStanding, RiskTier};

    #[test]
    fn boundaries_belong_to_near_risk() {
        assert_eq!(classify(75.0), RiskTier::NearRisk);
        assert_eq!(classify(80.0), RiskTier::NearRisk);
        assert_eq!(classify(74.999), RiskTier::AtRisk);
        assert_eq!(classify(80.001), RiskTier::Safe);
    }

    #[test]
    fn extremes_classify() {
        assert_eq!(classify(0.0), RiskTier::AtRisk);
        assert_eq!(classify(100.0), RiskTier::Safe);
    }

    #[test]
    fn standing_switches_at_seventy_five() {
        assert_eq!(
            OverallStanding::from_percentage(75.0),
            OverallStanding::SafeTerritory
        );
        assert_eq!(OverallStanding::from_percentage(74.9), OverallStanding::AtRisk);
        assert_eq!(OverallStanding::AtRisk.badge(), "Action Required");
    }

    #[test]
    fn tier_ids_are_stable() {
        assert_eq!(RiskTier::AtRisk.as_str(), "at_risk");
        assert_eq!(RiskTier::NearRisk.as_str(), "near_risk");
        assert_eq!(RiskTier::Safe.label(), "Safe");
    }
}
