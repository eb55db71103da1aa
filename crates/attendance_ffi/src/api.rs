//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Keep the sync state machine in Rust while Dart performs HTTP.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One process-wide orchestrator backs every dashboard call.
//! - Sync completions carry the sequence issued by `attendance_begin_sync`.
//! - Credentials are only stored in a host-chosen location; with none
//!   configured every session call fails.

use attendance_core::db::{open_db, session_db_path};
use attendance_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    parse_login_response, ApiEndpoints, AttendanceRequest, HttpResponse, LoginRequest,
    SessionService, SqliteCredentialRepository, SyncOrchestrator, SyncTicket, TransportError,
    TransportResult, DEFAULT_THRESHOLD,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

const SESSION_DB_PATH_ENV: &str = "ATTENDANCE_DB_PATH";
const STORE_NOT_CONFIGURED: &str =
    "session store is not configured; call init_session_store with the app data directory";
static SESSION_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static ORCHESTRATOR: OnceLock<Mutex<SyncOrchestrator>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling logs.
/// - Idempotent for the same `level + log_dir`; conflicting calls return error.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Points the credential store at the host's private app-data directory.
///
/// # FFI contract
/// - `data_dir`: absolute directory; created when missing.
/// - Idempotent for the same directory; a different directory returns error.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_session_store(data_dir: String) -> String {
    let path = match session_db_path(data_dir.as_str()) {
        Ok(path) => path,
        Err(err) => return err.to_string(),
    };
    let active = SESSION_DB_PATH.get_or_init(|| path.clone());
    if *active == path {
        String::new()
    } else {
        format!(
            "session store already initialized at `{}`; refusing to switch to `{}`",
            active.display(),
            path.display()
        )
    }
}

/// Proxy endpoint locations, honouring `ATTENDANCE_API_BASE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpointsResponse {
    pub base_url: String,
    pub login_url: String,
    pub attendance_url: String,
}

#[flutter_rust_bridge::frb(sync)]
pub fn api_endpoints() -> ApiEndpointsResponse {
    let endpoints = ApiEndpoints::from_env();
    ApiEndpointsResponse {
        base_url: endpoints.base_url().to_string(),
        login_url: endpoints.login_url(),
        attendance_url: endpoints.attendance_url(),
    }
}

/// Session state envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    /// Whether the operation itself succeeded.
    pub ok: bool,
    /// Whether complete credentials are stored after the operation.
    pub signed_in: bool,
    pub user_id: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl SessionResponse {
    fn signed_in(user_id: String, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            signed_in: true,
            user_id: Some(user_id),
            message: message.into(),
        }
    }

    fn signed_out(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            signed_in: false,
            user_id: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            signed_in: false,
            user_id: None,
            message: message.into(),
        }
    }
}

/// Restores a persisted session, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn session_restore() -> SessionResponse {
    match with_session_service(|service| service.restore().map_err(|err| err.to_string())) {
        Ok(Some(credentials)) => {
            SessionResponse::signed_in(credentials.user_id, "Session restored.")
        }
        Ok(None) => SessionResponse::signed_out("No saved session."),
        Err(err) => SessionResponse::failure(format!("session_restore failed: {err}")),
    }
}

/// Serializes the exact `POST /login` body for Dart to send.
#[flutter_rust_bridge::frb(sync)]
pub fn session_login_body(username: String, password: String) -> String {
    let request = LoginRequest {
        username: username.trim().to_string(),
        password,
    };
    serde_json::to_string(&request).unwrap_or_default()
}

/// Completes a login performed by Dart and persists the issued credentials.
///
/// `http_status = None` means the request never reached the server; `body`
/// then carries the transport error text.
#[flutter_rust_bridge::frb(sync)]
pub fn session_complete_login(http_status: Option<u16>, body: String) -> SessionResponse {
    let outcome = parse_login_response(transport_outcome(http_status, body));
    match with_session_service(|service| {
        service
            .complete_login(outcome)
            .map_err(|err| err.user_message())
    }) {
        Ok(credentials) => SessionResponse::signed_in(credentials.user_id, "Signed in."),
        Err(message) => SessionResponse::failure(message),
    }
}

/// Clears stored credentials and all dashboard state.
#[flutter_rust_bridge::frb(sync)]
pub fn session_logout() -> SessionResponse {
    with_orchestrator(SyncOrchestrator::reset);
    match with_session_service(|service| service.logout().map_err(|err| err.to_string())) {
        Ok(()) => SessionResponse::signed_out("Signed out."),
        Err(err) => SessionResponse::failure(format!("session_logout failed: {err}")),
    }
}

/// Result of asking to start a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncBeginResponse {
    pub started: bool,
    /// Pass back to `attendance_complete_sync`.
    pub sequence: Option<u64>,
    /// Exact `POST /attendance` body to send.
    pub request_body: Option<String>,
    pub message: String,
}

impl SyncBeginResponse {
    fn not_started(message: impl Into<String>) -> Self {
        Self {
            started: false,
            sequence: None,
            request_body: None,
            message: message.into(),
        }
    }
}

/// Enters the loading state and returns the request Dart should send.
///
/// Not started when no session is stored or a sync is already in flight.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_begin_sync() -> SyncBeginResponse {
    let credentials =
        match with_session_service(|service| service.restore().map_err(|err| err.to_string())) {
            Ok(Some(credentials)) => credentials,
            Ok(None) => return SyncBeginResponse::not_started("No saved session."),
            Err(err) => {
                return SyncBeginResponse::not_started(format!(
                    "attendance_begin_sync failed: {err}"
                ))
            }
        };

    let request_body = match serde_json::to_string(&AttendanceRequest::from(&credentials)) {
        Ok(body) => body,
        Err(err) => {
            return SyncBeginResponse::not_started(format!(
                "attendance_begin_sync failed: {err}"
            ))
        }
    };

    match with_orchestrator(SyncOrchestrator::begin_sync) {
        Some(ticket) => SyncBeginResponse {
            started: true,
            sequence: Some(ticket.sequence()),
            request_body: Some(request_body),
            message: "Sync started.".to_string(),
        },
        None => SyncBeginResponse::not_started("Sync already in progress."),
    }
}

/// Applies the HTTP outcome for a started sync and returns the new snapshot.
///
/// `http_status = None` means the request never reached the server. Stale
/// sequences are ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_complete_sync(
    sequence: u64,
    http_status: Option<u16>,
    body: String,
) -> DashboardSnapshot {
    with_orchestrator(|orchestrator| {
        let outcome = transport_outcome(http_status, body);
        if !orchestrator.complete_sync(SyncTicket::from_sequence(sequence), outcome) {
            warn!("event=ffi_sync_complete module=ffi status=ignored sequence={sequence}");
        }
        to_snapshot(orchestrator)
    })
}

/// Current dashboard view.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_snapshot() -> DashboardSnapshot {
    with_orchestrator(|orchestrator| to_snapshot(orchestrator))
}

/// Toggles the drill-down subject; unknown ids are ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_select_subject(subject_id: String) -> DashboardSnapshot {
    with_orchestrator(|orchestrator| {
        orchestrator.select_subject(subject_id.as_str());
        to_snapshot(orchestrator)
    })
}

/// Explicit "back" from the drill-down view.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_clear_selection() -> DashboardSnapshot {
    with_orchestrator(|orchestrator| {
        orchestrator.clear_selection();
        to_snapshot(orchestrator)
    })
}

/// Aggregate card; absent until the first successful sync.
#[derive(Debug, Clone, PartialEq)]
pub struct OverallCard {
    pub percentage: f64,
    pub total_present: u32,
    pub total_lectures: u32,
    /// `at_risk|near_risk|safe`.
    pub tier: String,
    pub headline: String,
    pub badge: String,
    pub hint: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectCard {
    pub subject_id: String,
    /// True when the id is the subject code standing in for a missing id.
    pub id_is_fallback: bool,
    pub name: String,
    pub code: String,
    pub present: u32,
    pub absent: u32,
    pub total: u32,
    pub percentage: f64,
    pub tier: String,
    pub hint: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogItem {
    /// ISO date when parseable, otherwise the upstream text.
    pub date: String,
    pub is_absent: bool,
    pub marked_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileField {
    pub key: String,
    pub value: String,
}

/// Everything the dashboard renders, derived in one lock.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    /// `idle|loading|ready|errored`.
    pub status: String,
    pub error_message: Option<String>,
    /// Visible data predates the current status.
    pub is_stale: bool,
    pub overall: Option<OverallCard>,
    pub subjects: Vec<SubjectCard>,
    pub active_subject_id: Option<String>,
    /// Active subject's sessions, most recent first.
    pub active_logs: Vec<LogItem>,
    pub profile: Vec<ProfileField>,
}

fn to_snapshot(orchestrator: &SyncOrchestrator) -> DashboardSnapshot {
    let selection = orchestrator.selection();
    let (overall, subjects, profile) = match (orchestrator.record(), orchestrator.insights()) {
        (Some(record), Some(insights)) => {
            let overall = OverallCard {
                percentage: record.overall_percentage,
                total_present: record.total_present,
                total_lectures: record.total_lectures,
                tier: insights.overall_tier.as_str().to_string(),
                headline: insights.standing.headline().to_string(),
                badge: insights.standing.badge().to_string(),
                hint: insights.overall_projection.message(DEFAULT_THRESHOLD),
            };
            let subjects = record
                .subjects
                .iter()
                .zip(&insights.subjects)
                .map(|(subject, insight)| SubjectCard {
                    subject_id: subject.subject_id.as_str().to_string(),
                    id_is_fallback: subject.subject_id.is_fallback(),
                    name: subject.subject_name.clone(),
                    code: subject.subject_code.clone(),
                    present: subject.present,
                    absent: subject.absent,
                    total: subject.total,
                    percentage: subject.percentage,
                    tier: insight.tier.as_str().to_string(),
                    hint: insight.projection.message(DEFAULT_THRESHOLD),
                    is_active: selection.is_active(subject.subject_id.as_str()),
                })
                .collect();
            let profile = record
                .profile
                .iter()
                .map(|(key, value)| ProfileField {
                    key: key.to_string(),
                    value: value.to_string(),
                })
                .collect();
            (Some(overall), subjects, profile)
        }
        _ => (None, Vec::new(), Vec::new()),
    };

    DashboardSnapshot {
        status: orchestrator.status().as_str().to_string(),
        error_message: orchestrator.error_message(),
        is_stale: orchestrator.is_stale(),
        overall,
        subjects,
        active_subject_id: selection.active_subject_id().map(str::to_string),
        active_logs: orchestrator
            .active_logs()
            .into_iter()
            .map(|entry| LogItem {
                date: entry
                    .date
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| entry.raw_date.clone()),
                is_absent: entry.is_absent,
                marked_by: entry.marked_by.clone(),
            })
            .collect(),
        profile,
    }
}

fn transport_outcome(http_status: Option<u16>, body: String) -> TransportResult {
    match http_status {
        Some(status) => Ok(HttpResponse::new(status, body)),
        None => Err(TransportError::new(body)),
    }
}

fn with_orchestrator<T>(f: impl FnOnce(&mut SyncOrchestrator) -> T) -> T {
    let orchestrator = ORCHESTRATOR.get_or_init(|| Mutex::new(SyncOrchestrator::new()));
    // Transitions never panic mid-update, so a poisoned lock still guards valid state.
    let mut guard = orchestrator
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

fn resolve_session_db_path() -> Result<PathBuf, String> {
    pick_session_db_path(
        SESSION_DB_PATH.get(),
        std::env::var(SESSION_DB_PATH_ENV).ok(),
    )
}

fn pick_session_db_path(
    configured: Option<&PathBuf>,
    env_override: Option<String>,
) -> Result<PathBuf, String> {
    if let Some(path) = configured {
        return Ok(path.clone());
    }
    match env_override.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Ok(PathBuf::from(raw)),
        _ => Err(STORE_NOT_CONFIGURED.to_string()),
    }
}

fn with_session_service<T>(
    f: impl FnOnce(&SessionService<SqliteCredentialRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let db_path = resolve_session_db_path()?;
    let conn = open_db(&db_path).map_err(|err| format!("session store open failed: {err}"))?;
    let service = SessionService::new(SqliteCredentialRepository::new(&conn));
    f(&service)
}
