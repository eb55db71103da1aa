//! Attendance proxy API contract.
//!
//! # Responsibility
//! - Define the transport SPI hosts implement to reach the proxy.
//! - Define exact wire request bodies and interpret raw responses.
//!
//! # Invariants
//! - Core never performs HTTP itself; implementors own the transport.
//! - A `TransportError` means no server response was received.
//! - Non-2xx responses become `ServerRejected`, carrying the body `error` text.

use crate::model::credentials::Credentials;
use crate::sync::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default proxy base URL used by local development setups.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000/api";
/// Environment override for the proxy base URL.
pub const API_BASE_URL_ENV: &str = "ATTENDANCE_API_BASE_URL";

const LOGIN_PATH: &str = "/login";
const ATTENDANCE_PATH: &str = "/attendance";

/// Proxy endpoint locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base_url: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl ApiEndpoints {
    /// Creates endpoints from a base URL; trailing slashes are dropped.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Reads `ATTENDANCE_API_BASE_URL`, falling back to the default when unset or blank.
    pub fn from_env() -> Self {
        Self::from_override(std::env::var(API_BASE_URL_ENV).ok().as_deref())
    }

    fn from_override(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(url) if !url.is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn login_url(&self) -> String {
        format!("{}{LOGIN_PATH}", self.base_url)
    }

    pub fn attendance_url(&self) -> String {
        format!("{}{ATTENDANCE_PATH}", self.base_url)
    }
}

/// `POST /login` body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `POST /attendance` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRequest {
    pub access_token: String,
    pub user_id: String,
    pub context_id: String,
    pub x_token: String,
    pub session_id: String,
}

impl From<&Credentials> for AttendanceRequest {
    fn from(credentials: &Credentials) -> Self {
        Self {
            access_token: credentials.access_token.clone(),
            user_id: credentials.user_id.clone(),
            context_id: credentials.context_id.clone(),
            x_token: credentials.x_token.clone(),
            session_id: credentials.session_id.clone(),
        }
    }
}

/// Raw HTTP response as received by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Request never produced a server response (DNS, connect, TLS, reset, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub details: String,
}

impl TransportError {
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "transport failure: {}", self.details)
    }
}

impl Error for TransportError {}

impl From<TransportError> for SyncError {
    fn from(value: TransportError) -> Self {
        Self::TransportUnreachable(value.details)
    }
}

pub type TransportResult = Result<HttpResponse, TransportError>;

/// Host-provided transport for the attendance proxy.
///
/// Calls may block; each call is the only suspension point of its flow.
pub trait AttendanceApi {
    fn login(&self, request: &LoginRequest) -> TransportResult;
    fn fetch_attendance(&self, request: &AttendanceRequest) -> TransportResult;
}

/// Interprets a login response into issued credentials.
///
/// Ids may arrive as strings or numbers; every field must be non-blank.
pub fn parse_login_response(outcome: TransportResult) -> SyncResult<Credentials> {
    let body = decode_success_body(outcome?)?;
    let fields = body.as_object().ok_or_else(|| {
        SyncError::MalformedPayload("login response must be an object".to_string())
    })?;

    let field = |name: &str| -> SyncResult<String> {
        let value = match fields.get(name) {
            Some(Value::String(text)) => text.trim().to_string(),
            Some(Value::Number(number)) => number.to_string(),
            _ => String::new(),
        };
        if value.is_empty() {
            return Err(SyncError::MalformedPayload(format!(
                "login response is missing `{name}`"
            )));
        }
        Ok(value)
    };

    Ok(Credentials {
        user_id: field("user_id")?,
        access_token: field("access_token")?,
        context_id: field("context_id")?,
        x_token: field("x_token")?,
        session_id: field("session_id")?,
    })
}

/// Interprets an attendance response into the raw payload for normalization.
pub fn parse_attendance_response(outcome: TransportResult) -> SyncResult<Value> {
    decode_success_body(outcome?)
}

fn decode_success_body(response: HttpResponse) -> SyncResult<Value> {
    let decoded = serde_json::from_str::<Value>(&response.body);

    if !response.is_success() {
        let message = decoded.ok().and_then(|body| {
            body.get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        return Err(SyncError::ServerRejected {
            status: response.status,
            message,
        });
    }

    decoded.map_err(|err| SyncError::MalformedPayload(format!("response is not JSON: {err}")))
}
