//! Attendance analytics and view-state core.
//!
//! Normalizes proxy attendance payloads, derives risk tiers and projections,
//! and owns the sync lifecycle plus single-subject drill-down state. UI and
//! transport layers call into this crate; it never renders or performs HTTP.

pub mod analytics;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod selection;
pub mod service;
pub mod sync;

pub use analytics::insights::{RecordInsights, SubjectInsight};
pub use analytics::projection::{
    project, project_with_threshold, Projection, ProjectionError, ProjectionKind,
    DEFAULT_THRESHOLD,
};
pub use analytics::risk::{classify, OverallStanding, RiskTier};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::credentials::Credentials;
pub use model::record::{
    AttendanceRecord, DailyLogEntry, StudentProfile, SubjectAttendance, SubjectKey,
};
pub use repo::credential_repo::{
    CredentialRepository, RepoError, RepoResult, SqliteCredentialRepository,
};
pub use selection::SelectionState;
pub use service::session_service::{SessionError, SessionService};
pub use sync::api::{
    parse_attendance_response, parse_login_response, ApiEndpoints, AttendanceApi,
    AttendanceRequest, HttpResponse, LoginRequest, TransportError, TransportResult,
};
pub use sync::error::{SyncError, SyncResult};
pub use sync::normalizer::normalize;
pub use sync::orchestrator::{SyncOrchestrator, SyncStatus, SyncTicket};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
