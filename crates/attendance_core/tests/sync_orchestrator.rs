use attendance_core::{
    AttendanceApi, AttendanceRequest, Credentials, HttpResponse, LoginRequest, RiskTier,
    SyncError, SyncOrchestrator, SyncStatus, TransportError, TransportResult,
};
use serde_json::json;
use std::cell::RefCell;
use std::collections::VecDeque;

/// Replays canned transport outcomes in order and records requests.
struct ScriptedApi {
    outcomes: RefCell<VecDeque<TransportResult>>,
    requests: RefCell<Vec<AttendanceRequest>>,
}

impl ScriptedApi {
    fn new(outcomes: Vec<TransportResult>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.into()),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl AttendanceApi for ScriptedApi {
    fn login(&self, _request: &LoginRequest) -> TransportResult {
        Err(TransportError::new("login not scripted"))
    }

    fn fetch_attendance(&self, request: &AttendanceRequest) -> TransportResult {
        self.requests.borrow_mut().push(request.clone());
        self.outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("script exhausted")))
    }
}

fn credentials() -> Credentials {
    Credentials {
        user_id: "1201".to_string(),
        access_token: "tok".to_string(),
        context_id: "4".to_string(),
        x_token: "xt".to_string(),
        session_id: "sid".to_string(),
    }
}

fn payload(math_percentage: f64) -> HttpResponse {
    HttpResponse::new(
        200,
        json!({
            "summary": [
                { "name": "Math", "code": "M1", "subjectId": "11", "presentLeactures": 30,
                  "absentLeactures": 20, "totalLeactures": 50,
                  "percentageAttendance": math_percentage },
                { "name": "Physics", "code": "P1", "presentLeactures": 40,
                  "absentLeactures": 10, "totalLeactures": 50, "percentageAttendance": 80.0 }
            ],
            "overall": { "percentage": 70.0, "present": 70, "total": 100 },
            "daily_logs": [
                { "absentDate": "2024-01-10", "isAbsent": true, "subjectName": "Math" },
                { "absentDate": "2024-01-12", "isAbsent": false, "subjectName": "Physics" }
            ]
        })
        .to_string(),
    )
}

#[test]
fn starts_idle_without_record() {
    let orchestrator = SyncOrchestrator::new();
    assert_eq!(orchestrator.status(), SyncStatus::Idle);
    assert!(orchestrator.record().is_none());
    assert!(orchestrator.error_message().is_none());
    assert!(orchestrator.active_logs().is_empty());
}

#[test]
fn successful_sync_normalizes_and_classifies() {
    let api = ScriptedApi::new(vec![Ok(payload(60.0))]);
    let mut orchestrator = SyncOrchestrator::new();

    assert_eq!(orchestrator.sync(&api, &credentials()), SyncStatus::Ready);

    let record = orchestrator.record().expect("record after success");
    assert_eq!(record.subjects.len(), 2);
    let insights = orchestrator.insights().expect("insights after success");
    assert_eq!(insights.subjects[0].tier, RiskTier::AtRisk);
    assert_eq!(insights.subjects[1].tier, RiskTier::NearRisk);
    assert_eq!(insights.overall_tier, RiskTier::AtRisk);

    let sent = api.requests.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_id, "1201");
    assert_eq!(sent[0].session_id, "sid");
}

#[test]
fn new_record_clears_active_subject() {
    let api = ScriptedApi::new(vec![Ok(payload(60.0)), Ok(payload(61.0))]);
    let mut orchestrator = SyncOrchestrator::new();
    orchestrator.sync(&api, &credentials());

    assert!(orchestrator.select_subject("11"));
    assert_eq!(orchestrator.selection().active_subject_id(), Some("11"));
    assert_eq!(orchestrator.active_logs().len(), 1);

    orchestrator.sync(&api, &credentials());
    assert_eq!(orchestrator.status(), SyncStatus::Ready);
    assert_eq!(orchestrator.selection().active_subject_id(), None);
    assert_eq!(orchestrator.record().map(|r| r.subjects[0].percentage), Some(61.0));
}

#[test]
fn selection_survives_while_loading_and_after_failure() {
    let mut orchestrator = SyncOrchestrator::new();
    let first = orchestrator.begin_sync().expect("first sync");
    orchestrator.complete_sync(first, Ok(payload(60.0)));
    orchestrator.select_subject("P1");

    let second = orchestrator.begin_sync().expect("second sync");
    assert_eq!(orchestrator.status(), SyncStatus::Loading);
    assert_eq!(orchestrator.active_subject().map(|s| s.subject_name.as_str()), Some("Physics"));

    orchestrator.complete_sync(second, Err(TransportError::new("dns failure")));
    assert_eq!(orchestrator.status(), SyncStatus::Errored);
    assert_eq!(orchestrator.selection().active_subject_id(), Some("P1"));
    assert_eq!(orchestrator.active_logs().len(), 1);
}

#[test]
fn select_unknown_subject_is_noop() {
    let mut orchestrator = SyncOrchestrator::new();
    assert!(!orchestrator.select_subject("11"));

    let api = ScriptedApi::new(vec![Ok(payload(60.0))]);
    orchestrator.sync(&api, &credentials());
    assert!(!orchestrator.select_subject("missing"));
    assert_eq!(orchestrator.selection().active_subject_id(), None);
}

#[test]
fn reselecting_and_back_clear_selection() {
    let api = ScriptedApi::new(vec![Ok(payload(60.0))]);
    let mut orchestrator = SyncOrchestrator::new();
    orchestrator.sync(&api, &credentials());

    orchestrator.select_subject("11");
    orchestrator.select_subject("11");
    assert_eq!(orchestrator.selection().active_subject_id(), None);

    orchestrator.select_subject("11");
    orchestrator.select_subject("P1");
    assert_eq!(orchestrator.selection().active_subject_id(), Some("P1"));
    orchestrator.clear_selection();
    assert!(orchestrator.active_subject().is_none());
}

#[test]
fn first_load_failure_has_no_record() {
    let api = ScriptedApi::new(vec![Err(TransportError::new("connection refused"))]);
    let mut orchestrator = SyncOrchestrator::new();

    assert_eq!(orchestrator.sync(&api, &credentials()), SyncStatus::Errored);
    assert!(orchestrator.record().is_none());
    assert!(!orchestrator.is_stale());
    assert_eq!(orchestrator.error_message().as_deref(), Some("Server unreachable."));
}

#[test]
fn server_rejection_surfaces_server_text_and_keeps_record() {
    let api = ScriptedApi::new(vec![
        Ok(payload(60.0)),
        Ok(HttpResponse::new(500, r#"{"error":"Failed to fetch data"}"#)),
    ]);
    let mut orchestrator = SyncOrchestrator::new();
    orchestrator.sync(&api, &credentials());
    orchestrator.sync(&api, &credentials());

    assert_eq!(orchestrator.status(), SyncStatus::Errored);
    assert_eq!(
        orchestrator.last_error(),
        Some(&SyncError::ServerRejected {
            status: 500,
            message: Some("Failed to fetch data".to_string())
        })
    );
    assert_eq!(orchestrator.error_message().as_deref(), Some("Failed to fetch data"));
    assert_eq!(orchestrator.record().map(|r| r.subjects.len()), Some(2));
}

#[test]
fn malformed_payload_errors_with_fixed_message() {
    let api = ScriptedApi::new(vec![Ok(HttpResponse::new(200, "[1, 2, 3]"))]);
    let mut orchestrator = SyncOrchestrator::new();

    assert_eq!(orchestrator.sync(&api, &credentials()), SyncStatus::Errored);
    assert!(matches!(
        orchestrator.last_error(),
        Some(SyncError::MalformedPayload(_))
    ));
    assert_eq!(
        orchestrator.error_message().as_deref(),
        Some("Received an unreadable attendance payload.")
    );
}

#[test]
fn resync_clears_previous_error_on_entering_loading() {
    let api = ScriptedApi::new(vec![
        Err(TransportError::new("offline")),
        Ok(payload(60.0)),
    ]);
    let mut orchestrator = SyncOrchestrator::new();
    orchestrator.sync(&api, &credentials());
    assert!(orchestrator.error_message().is_some());

    let ticket = orchestrator.begin_sync().expect("resync from errored");
    assert!(orchestrator.error_message().is_none());
    let outcome = api.fetch_attendance(&AttendanceRequest::from(&credentials()));
    assert!(orchestrator.complete_sync(ticket, outcome));
    assert_eq!(orchestrator.status(), SyncStatus::Ready);
}

#[test]
fn sync_while_loading_is_ignored_without_calling_transport() {
    let api = ScriptedApi::new(vec![Ok(payload(60.0))]);
    let mut orchestrator = SyncOrchestrator::new();
    let _ticket = orchestrator.begin_sync().expect("first sync");

    assert_eq!(orchestrator.sync(&api, &credentials()), SyncStatus::Loading);
    assert!(api.requests.borrow().is_empty());
}
