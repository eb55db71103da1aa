//! CLI probe for `attendance_core`.
//!
//! # Responsibility
//! - Verify core linkage (`ping`, version) with no arguments.
//! - Given a saved proxy payload file, print per-subject tiers and projections.

use attendance_core::{normalize, RecordInsights, DEFAULT_THRESHOLD};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("attendance_core ping={}", attendance_core::ping());
    println!("attendance_core version={}", attendance_core::core_version());

    let Some(path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match report(&path) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn report(path: &str) -> Result<Vec<String>, String> {
    let text = std::fs::read_to_string(path).map_err(|err| format!("read `{path}`: {err}"))?;
    let raw = serde_json::from_str::<serde_json::Value>(&text)
        .map_err(|err| format!("parse `{path}`: {err}"))?;
    let record = normalize(&raw).map_err(|err| err.to_string())?;
    let insights = RecordInsights::from_record(&record);

    let mut lines = vec![format!(
        "overall percentage={:.1} tier={} standing=\"{}\" hint=\"{}\"",
        record.overall_percentage,
        insights.overall_tier.as_str(),
        insights.standing.headline(),
        insights.overall_projection.message(DEFAULT_THRESHOLD)
    )];
    lines.extend(record.subjects.iter().zip(&insights.subjects).map(|(subject, insight)| {
        format!(
            "subject id={} name=\"{}\" present={}/{} percentage={:.1} tier={} hint=\"{}\"",
            subject.subject_id.as_str(),
            subject.subject_name,
            subject.present,
            subject.total,
            subject.percentage,
            insight.tier.as_str(),
            insight.projection.message(DEFAULT_THRESHOLD)
        )
    }));
    Ok(lines)
}
