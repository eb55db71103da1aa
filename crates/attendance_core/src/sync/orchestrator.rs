//! Sync lifecycle state machine.
//!
//! # Responsibility
//! - Drive fetch -> normalize -> classify for one attendance record.
//! - Own the current record, its insights and the drill-down selection.
//!
//! # Invariants
//! - States: `Idle -> Loading -> {Ready, Errored}`; both terminal states may
//!   re-enter `Loading`.
//! - At most one request is in flight; `begin_sync` while loading is ignored.
//! - Completions are matched by sequence number; stale tickets are dropped.
//! - A successful sync replaces the record wholesale and clears the selection.
//! - A failed sync keeps the last good record.

use crate::analytics::insights::RecordInsights;
use crate::model::credentials::Credentials;
use crate::model::record::{AttendanceRecord, DailyLogEntry, SubjectAttendance};
use crate::selection::SelectionState;
use crate::sync::api::{
    parse_attendance_response, AttendanceApi, AttendanceRequest, TransportResult,
};
use crate::sync::error::SyncError;
use crate::sync::normalizer::normalize;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Idle,
    Loading,
    Ready,
    Errored,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Errored => "errored",
        }
    }
}

/// Proof that a sync was started; required to complete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTicket {
    sequence: u64,
}

impl SyncTicket {
    /// Rebuilds a ticket from a sequence handed across an FFI boundary.
    pub fn from_sequence(sequence: u64) -> Self {
        Self { sequence }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Owner of the attendance record and its view state.
#[derive(Debug)]
pub struct SyncOrchestrator {
    status: SyncStatus,
    record: Option<AttendanceRecord>,
    insights: Option<RecordInsights>,
    selection: SelectionState,
    last_error: Option<SyncError>,
    last_sequence: u64,
    in_flight: Option<(u64, Instant)>,
}

impl Default for SyncOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncOrchestrator {
    pub fn new() -> Self {
        Self {
            status: SyncStatus::Idle,
            record: None,
            insights: None,
            selection: SelectionState::new(),
            last_error: None,
            last_sequence: 0,
            in_flight: None,
        }
    }

    /// Enters `Loading` and issues a ticket.
    ///
    /// Returns `None` without side effects when a sync is already in flight.
    pub fn begin_sync(&mut self) -> Option<SyncTicket> {
        if let Some((sequence, _)) = self.in_flight {
            info!(
                "event=sync_ignored module=sync status=ignored reason=in_flight in_flight_sequence={}",
                sequence
            );
            return None;
        }

        self.last_sequence += 1;
        let sequence = self.last_sequence;
        self.in_flight = Some((sequence, Instant::now()));
        self.status = SyncStatus::Loading;
        self.last_error = None;

        info!(
            "event=sync_begin module=sync status=start sequence={} has_record={}",
            sequence,
            self.record.is_some()
        );
        Some(SyncTicket { sequence })
    }

    /// Applies the transport outcome for `ticket`.
    ///
    /// Returns `false` and changes nothing when `ticket` is not the request
    /// currently in flight.
    pub fn complete_sync(&mut self, ticket: SyncTicket, outcome: TransportResult) -> bool {
        let started_at = match self.in_flight {
            Some((sequence, started_at)) if sequence == ticket.sequence => started_at,
            other => {
                warn!(
                    "event=sync_ignored module=sync status=ignored reason=stale sequence={} in_flight_sequence={}",
                    ticket.sequence,
                    other.map_or(0, |(sequence, _)| sequence)
                );
                return false;
            }
        };
        self.in_flight = None;

        match parse_attendance_response(outcome).and_then(|raw| normalize(&raw)) {
            Ok(record) => {
                info!(
                    "event=sync_complete module=sync status=ok sequence={} duration_ms={} subjects={} logs={}",
                    ticket.sequence,
                    started_at.elapsed().as_millis(),
                    record.subjects.len(),
                    record.daily_logs.len()
                );
                self.replace_record(record);
                self.status = SyncStatus::Ready;
            }
            Err(err) => {
                error!(
                    "event=sync_complete module=sync status=error sequence={} duration_ms={} error_code={} kept_record={} error={}",
                    ticket.sequence,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    self.record.is_some(),
                    err
                );
                self.last_error = Some(err);
                self.status = SyncStatus::Errored;
            }
        }
        true
    }

    /// Runs one full sync against a blocking transport.
    ///
    /// Returns the resulting status; an ignored request returns `Loading`.
    pub fn sync(&mut self, api: &dyn AttendanceApi, credentials: &Credentials) -> SyncStatus {
        let Some(ticket) = self.begin_sync() else {
            return self.status;
        };
        let outcome = api.fetch_attendance(&AttendanceRequest::from(credentials));
        self.complete_sync(ticket, outcome);
        self.status
    }

    /// Drops record, selection and error; any in-flight ticket becomes stale.
    pub fn reset(&mut self) {
        let last_sequence = self.last_sequence;
        *self = Self {
            last_sequence,
            ..Self::new()
        };
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn in_flight_sequence(&self) -> Option<u64> {
        self.in_flight.map(|(sequence, _)| sequence)
    }

    pub fn record(&self) -> Option<&AttendanceRecord> {
        self.record.as_ref()
    }

    pub fn insights(&self) -> Option<&RecordInsights> {
        self.insights.as_ref()
    }

    pub fn last_error(&self) -> Option<&SyncError> {
        self.last_error.as_ref()
    }

    /// User-facing error for the latest failed attempt.
    pub fn error_message(&self) -> Option<String> {
        self.last_error.as_ref().map(SyncError::user_message)
    }

    /// Whether the visible record predates the current state (loading or errored).
    pub fn is_stale(&self) -> bool {
        self.record.is_some() && matches!(self.status, SyncStatus::Loading | SyncStatus::Errored)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Toggles selection of a subject in the current record.
    ///
    /// Unknown ids, or no record at all, leave the selection untouched and
    /// return `false`.
    pub fn select_subject(&mut self, subject_id: &str) -> bool {
        let known = self
            .record
            .as_ref()
            .is_some_and(|record| record.subject(subject_id).is_some());
        if known {
            self.selection.toggle(subject_id);
        }
        known
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn active_subject(&self) -> Option<&SubjectAttendance> {
        self.selection.active_subject(self.record.as_ref()?)
    }

    pub fn active_logs(&self) -> Vec<&DailyLogEntry> {
        match self.record.as_ref() {
            Some(record) => self.selection.active_logs(record),
            None => Vec::new(),
        }
    }

    fn replace_record(&mut self, record: AttendanceRecord) {
        self.insights = Some(RecordInsights::from_record(&record));
        self.record = Some(record);
        self.selection.clear();
    }
}
