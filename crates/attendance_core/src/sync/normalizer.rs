//! Raw attendance payload normalization.
//!
//! # Responsibility
//! - Map the loosely-typed proxy payload into an `AttendanceRecord`.
//! - Default every missing optional field instead of failing.
//!
//! # Invariants
//! - Only a non-object top level or a non-array `summary` is fatal.
//! - Upstream percentages are kept as-is (clamped to `[0, 100]`), never
//!   recomputed from counts.
//! - Output is a pure function of the input value.

use crate::model::record::{
    AttendanceRecord, DailyLogEntry, StudentProfile, SubjectAttendance, SubjectKey,
};
use crate::sync::error::{SyncError, SyncResult};
use chrono::NaiveDate;
use log::{debug, warn};
use serde_json::{Map, Value};

const KEY_SUMMARY: &str = "summary";
const KEY_OVERALL: &str = "overall";
const KEY_DAILY_LOGS: &str = "daily_logs";
const KEY_PROFILE: &str = "profile";

const KEY_SUBJECT_NAME: &str = "name";
const KEY_SUBJECT_CODE: &str = "code";
const KEY_SUBJECT_ID: &str = "subjectId";
// Upstream spelling.
const KEY_PRESENT: &str = "presentLeactures";
const KEY_ABSENT: &str = "absentLeactures";
const KEY_TOTAL: &str = "totalLeactures";
const KEY_PERCENTAGE: &str = "percentageAttendance";

const KEY_OVERALL_PERCENTAGE: &str = "percentage";
const KEY_OVERALL_PRESENT: &str = "present";
const KEY_OVERALL_TOTAL: &str = "total";

const KEY_LOG_DATE: &str = "absentDate";
const KEY_LOG_IS_ABSENT: &str = "isAbsent";
const KEY_LOG_SUBJECT_NAME: &str = "subjectName";
const KEY_LOG_MARKED_BY: &str = "markedBy";

/// Normalizes one decoded attendance payload.
///
/// # Errors
/// - `MalformedPayload` when `raw` is not an object.
/// - `MalformedPayload` when `summary` is present, non-null and not an array.
pub fn normalize(raw: &Value) -> SyncResult<AttendanceRecord> {
    let object = raw.as_object().ok_or_else(|| {
        SyncError::MalformedPayload(format!(
            "top-level payload must be an object, got {}",
            json_kind(raw)
        ))
    })?;

    let subjects = match object.get(KEY_SUMMARY) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => normalize_subjects(entries),
        Some(other) => {
            return Err(SyncError::MalformedPayload(format!(
                "`{KEY_SUMMARY}` must be an array, got {}",
                json_kind(other)
            )));
        }
    };

    let overall = object.get(KEY_OVERALL).and_then(Value::as_object);
    let daily_logs = match object.get(KEY_DAILY_LOGS) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => normalize_logs(entries),
        Some(other) => {
            warn!(
                "event=normalize module=sync status=degraded field={} kind={}",
                KEY_DAILY_LOGS,
                json_kind(other)
            );
            Vec::new()
        }
    };
    let profile = object
        .get(KEY_PROFILE)
        .and_then(Value::as_object)
        .map(normalize_profile)
        .unwrap_or_default();

    let record = AttendanceRecord {
        overall_percentage: read_percentage(overall.and_then(|o| o.get(KEY_OVERALL_PERCENTAGE))),
        total_present: read_count(overall.and_then(|o| o.get(KEY_OVERALL_PRESENT))),
        total_lectures: read_count(overall.and_then(|o| o.get(KEY_OVERALL_TOTAL))),
        subjects,
        daily_logs,
        profile,
    };

    debug!(
        "event=normalize module=sync status=ok subjects={} fallback_ids={} logs={} profile_fields={}",
        record.subjects.len(),
        record
            .subjects
            .iter()
            .filter(|subject| subject.subject_id.is_fallback())
            .count(),
        record.daily_logs.len(),
        record.profile.len()
    );
    Ok(record)
}

fn normalize_subjects(entries: &[Value]) -> Vec<SubjectAttendance> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match entry.as_object() {
            Some(fields) => Some(normalize_subject(fields)),
            None => {
                warn!(
                    "event=normalize module=sync status=skipped field={} index={} kind={}",
                    KEY_SUMMARY,
                    index,
                    json_kind(entry)
                );
                None
            }
        })
        .collect()
}

fn normalize_subject(fields: &Map<String, Value>) -> SubjectAttendance {
    let subject_code = read_string(fields.get(KEY_SUBJECT_CODE));
    let raw_id = fields
        .get(KEY_SUBJECT_ID)
        .filter(|value| !value.is_null())
        .map(|value| read_string(Some(value)));

    SubjectAttendance {
        subject_id: SubjectKey::resolve(raw_id.as_deref(), &subject_code),
        subject_name: read_string(fields.get(KEY_SUBJECT_NAME)),
        subject_code,
        present: read_count(fields.get(KEY_PRESENT)),
        absent: read_count(fields.get(KEY_ABSENT)),
        total: read_count(fields.get(KEY_TOTAL)),
        percentage: read_percentage(fields.get(KEY_PERCENTAGE)),
    }
}

fn normalize_logs(entries: &[Value]) -> Vec<DailyLogEntry> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match entry.as_object() {
            Some(fields) => Some(normalize_log(fields)),
            None => {
                warn!(
                    "event=normalize module=sync status=skipped field={} index={} kind={}",
                    KEY_DAILY_LOGS,
                    index,
                    json_kind(entry)
                );
                None
            }
        })
        .collect()
}

fn normalize_log(fields: &Map<String, Value>) -> DailyLogEntry {
    let raw_date = read_string(fields.get(KEY_LOG_DATE));
    let marked_by = read_string(fields.get(KEY_LOG_MARKED_BY));

    DailyLogEntry {
        date: parse_log_date(&raw_date),
        raw_date,
        is_absent: read_flag(fields.get(KEY_LOG_IS_ABSENT)),
        subject_name: read_string(fields.get(KEY_LOG_SUBJECT_NAME)),
        marked_by: (!marked_by.trim().is_empty()).then_some(marked_by),
    }
}

fn normalize_profile(fields: &Map<String, Value>) -> StudentProfile {
    let mut profile = StudentProfile::new();
    for (key, value) in fields {
        match value {
            Value::String(text) => profile.insert(key.as_str(), text.as_str()),
            Value::Number(number) => profile.insert(key.as_str(), number.to_string()),
            Value::Bool(flag) => profile.insert(key.as_str(), flag.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => {}
        }
    }
    profile
}

/// Parses the ISO date prefix of a log timestamp (`2024-01-10`,
/// `2024-01-10T00:00:00`, `2024-01-10 09:30`).
pub fn parse_log_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn read_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

fn read_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn read_count(value: Option<&Value>) -> u32 {
    if let Some(Value::Number(number)) = value {
        if let Some(exact) = number.as_u64() {
            return u32::try_from(exact).unwrap_or(u32::MAX);
        }
    }
    match read_number(value) {
        Some(number) if number > 0.0 => number.min(f64::from(u32::MAX)).trunc() as u32,
        _ => 0,
    }
}

fn read_percentage(value: Option<&Value>) -> f64 {
    read_number(value).map_or(0.0, |number| number.clamp(0.0, 100.0))
}

fn read_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => {
            let normalized = text.trim().to_ascii_lowercase();
            normalized == "true" || normalized == "1"
        }
        _ => false,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
