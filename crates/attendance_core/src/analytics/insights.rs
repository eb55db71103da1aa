//! Per-record insight assembly.

use crate::analytics::projection::{project, Projection};
use crate::analytics::risk::{classify, OverallStanding, RiskTier};
use crate::model::record::{AttendanceRecord, SubjectAttendance, SubjectKey};
use serde::{Deserialize, Serialize};

/// Derived tier and projection for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectInsight {
    pub subject_id: SubjectKey,
    pub tier: RiskTier,
    pub projection: Projection,
}

impl SubjectInsight {
    pub fn for_subject(subject: &SubjectAttendance) -> Self {
        Self {
            subject_id: subject.subject_id.clone(),
            tier: classify(subject.percentage),
            projection: project(subject.present, subject.total),
        }
    }
}

/// Derived metrics for a whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordInsights {
    pub overall_tier: RiskTier,
    pub overall_projection: Projection,
    pub standing: OverallStanding,
    /// Same order as `AttendanceRecord::subjects`.
    pub subjects: Vec<SubjectInsight>,
}

impl RecordInsights {
    pub fn from_record(record: &AttendanceRecord) -> Self {
        Self {
            overall_tier: classify(record.overall_percentage),
            overall_projection: project(record.total_present, record.total_lectures),
            standing: OverallStanding::from_percentage(record.overall_percentage),
            subjects: record
                .subjects
                .iter()
                .map(SubjectInsight::for_subject)
                .collect(),
        }
    }

    /// Counts subjects per tier as `(at_risk, near_risk, safe)`.
    pub fn tier_counts(&self) -> (usize, usize, usize) {
        self.subjects
            .iter()
            .fold((0, 0, 0), |(at, near, safe), insight| match insight.tier {
                RiskTier::AtRisk => (at + 1, near, safe),
                RiskTier::NearRisk => (at, near + 1, safe),
                RiskTier::Safe => (at, near, safe + 1),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::RecordInsights;
    use crate::analytics::projection::Projection;
    use crate::analytics::risk::{OverallStanding, RiskTier};
    use crate::model::record::{AttendanceRecord, SubjectAttendance, SubjectKey};

    fn subject(code: &str, present: u32, total: u32, percentage: f64) -> SubjectAttendance {
        SubjectAttendance {
            subject_id: SubjectKey::CodeFallback(code.to_string()),
            subject_name: code.to_string(),
            subject_code: code.to_string(),
            present,
            absent: total.saturating_sub(present),
            total,
            percentage,
        }
    }

    #[test]
    fn classifies_from_percentage_and_projects_from_counts() {
        // Stale server percentage says safe while counts say at risk.
        let record = AttendanceRecord {
            subjects: vec![subject("A", 30, 50, 90.0), subject("B", 40, 50, 80.0)],
            overall_percentage: 70.0,
            total_present: 70,
            total_lectures: 100,
            ..AttendanceRecord::default()
        };

        let insights = RecordInsights::from_record(&record);
        assert_eq!(insights.subjects[0].tier, RiskTier::Safe);
        assert_eq!(insights.subjects[0].projection, Projection::needed(30));
        assert_eq!(insights.subjects[1].tier, RiskTier::NearRisk);
        assert_eq!(insights.subjects[1].projection, Projection::safe_margin(3));
        assert_eq!(insights.overall_tier, RiskTier::AtRisk);
        assert_eq!(insights.standing, OverallStanding::AtRisk);
        assert_eq!(insights.overall_projection, Projection::needed(20));
        assert_eq!(insights.tier_counts(), (0, 1, 1));
    }
}
