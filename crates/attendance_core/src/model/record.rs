//! Attendance record model.
//!
//! # Responsibility
//! - Define per-subject stats, daily session log entries and profile fields.
//! - Make the subject-id fallback rule explicit and auditable.
//!
//! # Invariants
//! - `present + absent == total` is expected but never enforced.
//! - `percentage` is authoritative for display and classification, even when
//!   it disagrees with `present / total`.
//! - `percentage` is kept within `[0, 100]`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable key identifying one subject inside one record.
///
/// The variant records which normalization rule produced the key, so callers
/// and tests can tell a server-issued id from the subject-code fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum SubjectKey {
    /// Non-empty id supplied by the upstream payload.
    ServerIssued(String),
    /// Upstream id was missing or blank; the subject code stands in.
    CodeFallback(String),
}

impl SubjectKey {
    /// Applies the id-or-code rule used during normalization.
    ///
    /// A non-blank id is kept exactly as sent, surrounding whitespace included.
    pub fn resolve(raw_id: Option<&str>, subject_code: &str) -> Self {
        match raw_id {
            Some(id) if !id.trim().is_empty() => Self::ServerIssued(id.to_string()),
            _ => Self::CodeFallback(subject_code.to_string()),
        }
    }

    /// Returns the key value regardless of its origin.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ServerIssued(value) | Self::CodeFallback(value) => value.as_str(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::CodeFallback(_))
    }
}

/// Per-subject attendance statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAttendance {
    pub subject_id: SubjectKey,
    pub subject_name: String,
    pub subject_code: String,
    pub present: u32,
    pub absent: u32,
    pub total: u32,
    /// Server-provided percentage in `[0, 100]`.
    pub percentage: f64,
}

/// One recorded session for one subject on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLogEntry {
    /// Parsed calendar date; `None` when upstream text was not a date.
    pub date: Option<NaiveDate>,
    /// Date text exactly as received.
    pub raw_date: String,
    pub is_absent: bool,
    /// Join key against `SubjectAttendance::subject_name`.
    pub subject_name: String,
    pub marked_by: Option<String>,
}

/// Sparse student profile fields.
///
/// Only non-null scalar values are kept; every value is stored as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    fields: BTreeMap<String, String>,
}

pub const PROFILE_FIRST_NAME: &str = "firstName";
pub const PROFILE_LAST_NAME: &str = "lastName";
pub const PROFILE_DOB: &str = "dob";
pub const PROFILE_BLOOD_GROUP: &str = "bloodGroup";
pub const PROFILE_JEE_RANK: &str = "jeeRank";
pub const PROFILE_TENTH_PERCENTAGE: &str = "tenthPercentage";
pub const PROFILE_TWELFTH_PERCENTAGE: &str = "twelfthPercentage";
pub const PROFILE_BANK_NAME: &str = "bankName";
pub const PROFILE_IFSC_CODE: &str = "ifscCode";
pub const PROFILE_FATHER_NAME: &str = "fatherName";
pub const PROFILE_MOBILE_NO: &str = "mobileNo";

impl StudentProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores one field; blank keys are ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key.trim().is_empty() {
            return;
        }
        self.fields.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn first_name(&self) -> Option<&str> {
        self.get(PROFILE_FIRST_NAME)
    }

    pub fn last_name(&self) -> Option<&str> {
        self.get(PROFILE_LAST_NAME)
    }

    pub fn dob(&self) -> Option<&str> {
        self.get(PROFILE_DOB)
    }

    pub fn blood_group(&self) -> Option<&str> {
        self.get(PROFILE_BLOOD_GROUP)
    }

    pub fn jee_rank(&self) -> Option<&str> {
        self.get(PROFILE_JEE_RANK)
    }

    pub fn tenth_percentage(&self) -> Option<&str> {
        self.get(PROFILE_TENTH_PERCENTAGE)
    }

    pub fn twelfth_percentage(&self) -> Option<&str> {
        self.get(PROFILE_TWELFTH_PERCENTAGE)
    }

    pub fn bank_name(&self) -> Option<&str> {
        self.get(PROFILE_BANK_NAME)
    }

    pub fn ifsc_code(&self) -> Option<&str> {
        self.get(PROFILE_IFSC_CODE)
    }

    pub fn father_name(&self) -> Option<&str> {
        self.get(PROFILE_FATHER_NAME)
    }

    pub fn mobile_no(&self) -> Option<&str> {
        self.get(PROFILE_MOBILE_NO)
    }
}

/// Root aggregate produced by one successful sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Subjects in upstream order.
    pub subjects: Vec<SubjectAttendance>,
    pub overall_percentage: f64,
    pub total_present: u32,
    pub total_lectures: u32,
    /// Session log in upstream order; views sort on demand.
    pub daily_logs: Vec<DailyLogEntry>,
    pub profile: StudentProfile,
}

impl AttendanceRecord {
    /// Looks up one subject by its normalized key value.
    pub fn subject(&self, subject_id: &str) -> Option<&SubjectAttendance> {
        self.subjects
            .iter()
            .find(|subject| subject.subject_id.as_str() == subject_id)
    }

    /// Returns log entries whose subject name matches exactly, in upstream order.
    pub fn logs_for_subject_name<'a>(
        &'a self,
        subject_name: &'a str,
    ) -> impl Iterator<Item = &'a DailyLogEntry> + 'a {
        self.daily_logs
            .iter()
            .filter(move |entry| entry.subject_name == subject_name)
    }
}
