//! Forward projections against an attendance threshold.
//!
//! # Invariants
//! - `total == 0` always yields `SafeMargin(0)`; no ratio is computed.
//! - `Needed` counts are minimal: one fewer attended session is insufficient.
//! - `SafeMargin` counts are maximal: one more missed session breaks the threshold.
//! - Future sessions are modelled as all attended or all missed, consecutively.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Threshold ratio matching the 75% risk boundary.
pub const DEFAULT_THRESHOLD: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    /// Consecutive sessions that must be attended to reach the threshold.
    Needed,
    /// Consecutive sessions that can be missed while staying at the threshold.
    SafeMargin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Projection {
    pub kind: ProjectionKind,
    pub count: u32,
}

impl Projection {
    pub fn needed(count: u32) -> Self {
        Self {
            kind: ProjectionKind::Needed,
            count,
        }
    }

    pub fn safe_margin(count: u32) -> Self {
        Self {
            kind: ProjectionKind::SafeMargin,
            count,
        }
    }

    /// `SafeMargin(0)`: the next session must not be missed.
    pub fn is_pivotal(&self) -> bool {
        self.kind == ProjectionKind::SafeMargin && self.count == 0
    }

    /// Renders the dashboard hint for this projection.
    pub fn message(&self, threshold: f64) -> String {
        let plural = if self.count > 1 { "es" } else { "" };
        match self.kind {
            ProjectionKind::Needed => format!(
                "Need {} class{plural} for {}%",
                self.count,
                (threshold * 100.0).round()
            ),
            ProjectionKind::SafeMargin if self.count == 0 => "Crucial next class".to_string(),
            ProjectionKind::SafeMargin => {
                format!("Can safely bunk {} class{plural}", self.count)
            }
        }
    }
}

/// Rejected custom threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionError {
    /// Threshold must lie strictly between 0 and 1.
    InvalidThreshold(f64),
}

impl Display for ProjectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidThreshold(value) => {
                write!(f, "projection threshold must be in (0, 1), got {value}")
            }
        }
    }
}

impl Error for ProjectionError {}

/// Projects against the default 75% threshold.
pub fn project(present: u32, total: u32) -> Projection {
    compute(present, total, DEFAULT_THRESHOLD)
}

/// Projects against a caller-provided threshold ratio.
///
/// # Errors
/// - `InvalidThreshold` when `threshold` is not finite or not in `(0, 1)`.
pub fn project_with_threshold(
    present: u32,
    total: u32,
    threshold: f64,
) -> Result<Projection, ProjectionError> {
    if !threshold.is_finite() || threshold <= 0.0 || threshold >= 1.0 {
        return Err(ProjectionError::InvalidThreshold(threshold));
    }
    Ok(compute(present, total, threshold))
}

fn compute(present: u32, total: u32, threshold: f64) -> Projection {
    if total == 0 {
        return Projection::safe_margin(0);
    }

    let present_f = f64::from(present);
    let total_f = f64::from(total);
    let present = u64::from(present);
    let total = u64::from(total);

    if present_f < threshold * total_f {
        // Closed form first, then nudge to the exact minimum to absorb rounding.
        let estimate = ((threshold * total_f - present_f) / (1.0 - threshold)).ceil();
        let mut n = estimate.max(1.0) as u64;
        while n > 1 && reaches(present, total, n - 1, threshold) {
            n -= 1;
        }
        while !reaches(present, total, n, threshold) {
            n += 1;
        }
        Projection::needed(saturate(n))
    } else {
        let estimate = ((present_f - threshold * total_f) / threshold).floor();
        let mut n = estimate.max(0.0) as u64;
        while n > 0 && !holds(present, total, n, threshold) {
            n -= 1;
        }
        while holds(present, total, n + 1, threshold) {
            n += 1;
        }
        Projection::safe_margin(saturate(n))
    }
}

fn reaches(present: u64, total: u64, attended: u64, threshold: f64) -> bool {
    (present + attended) as f64 >= threshold * (total + attended) as f64
}

fn holds(present: u64, total: u64, missed: u64, threshold: f64) -> bool {
    present as f64 >= threshold * (total + missed) as f64
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
