//! Single-subject drill-down state.
//!
//! # Responsibility
//! - Hold at most one active subject id.
//! - Derive the active subject's session log, most recent first.
//!
//! # Invariants
//! - "At most one active subject" is structural: the state is one `Option`.
//! - Logs join on subject *name*; upstream log entries carry no subject id.
//! - Sorting is stable: same-date entries keep upstream relative order.
//! - Entries without a parseable date sort after every dated entry.

use crate::model::record::{AttendanceRecord, DailyLogEntry, SubjectAttendance};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    active_subject_id: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_subject_id(&self) -> Option<&str> {
        self.active_subject_id.as_deref()
    }

    pub fn is_active(&self, subject_id: &str) -> bool {
        self.active_subject_id.as_deref() == Some(subject_id)
    }

    /// Returns the state after selecting `subject_id`.
    ///
    /// Re-selecting the active subject clears the selection; any other id
    /// replaces it.
    pub fn select(&self, subject_id: &str) -> Self {
        if self.is_active(subject_id) {
            Self::default()
        } else {
            Self {
                active_subject_id: Some(subject_id.to_string()),
            }
        }
    }

    /// In-place form of [`SelectionState::select`].
    pub fn toggle(&mut self, subject_id: &str) {
        *self = self.select(subject_id);
    }

    /// Explicit "back" action.
    pub fn clear(&mut self) {
        self.active_subject_id = None;
    }

    /// Resolves the active id against `record`.
    pub fn active_subject<'r>(
        &self,
        record: &'r AttendanceRecord,
    ) -> Option<&'r SubjectAttendance> {
        record.subject(self.active_subject_id.as_deref()?)
    }

    /// Returns the active subject's log entries sorted by date descending.
    ///
    /// Empty when nothing is active or the active id is unknown to `record`.
    pub fn active_logs<'r>(&self, record: &'r AttendanceRecord) -> Vec<&'r DailyLogEntry> {
        let Some(subject) = self.active_subject(record) else {
            return Vec::new();
        };

        let mut logs = record
            .logs_for_subject_name(subject.subject_name.as_str())
            .collect::<Vec<_>>();
        // `None < Some(_)`, so descending order puts undated entries last.
        logs.sort_by(|left, right| right.date.cmp(&left.date));
        logs
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionState;

    #[test]
    fn select_toggles_and_replaces() {
        let empty = SelectionState::new();
        let math = empty.select("MATH");
        assert_eq!(math.active_subject_id(), Some("MATH"));

        let physics = math.select("PHY");
        assert_eq!(physics.active_subject_id(), Some("PHY"));

        assert_eq!(physics.select("PHY"), empty);
    }

    #[test]
    fn toggle_and_clear_mutate_in_place() {
        let mut state = SelectionState::new();
        state.toggle("MATH");
        assert!(state.is_active("MATH"));
        state.clear();
        assert_eq!(state.active_subject_id(), None);
    }
}
