//! Sync failure taxonomy.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SyncResult<T> = Result<T, SyncError>;

/// Shown when the request never reached the server.
pub const UNREACHABLE_MESSAGE: &str = "Server unreachable.";
/// Shown when the server rejected a request without its own error text.
pub const REJECTED_FALLBACK_MESSAGE: &str = "Sync failed.";
/// Shown when a payload could not be interpreted.
pub const MALFORMED_MESSAGE: &str = "Received an unreadable attendance payload.";

/// Terminal failure of one sync or login attempt. Never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Payload is not JSON, or its top-level shape cannot be interpreted.
    MalformedPayload(String),
    /// Transport failed before any server response; detail is for logs only.
    TransportUnreachable(String),
    /// Server answered with a non-success status.
    ServerRejected {
        status: u16,
        /// Server-provided `error` text, when present.
        message: Option<String>,
    },
}

impl SyncError {
    /// Human-readable message safe to show in UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedPayload(_) => MALFORMED_MESSAGE.to_string(),
            Self::TransportUnreachable(_) => UNREACHABLE_MESSAGE.to_string(),
            Self::ServerRejected { message, .. } => message
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .unwrap_or(REJECTED_FALLBACK_MESSAGE)
                .to_string(),
        }
    }

    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedPayload(_) => "malformed_payload",
            Self::TransportUnreachable(_) => "transport_unreachable",
            Self::ServerRejected { .. } => "server_rejected",
        }
    }
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedPayload(details) => write!(f, "malformed payload: {details}"),
            Self::TransportUnreachable(details) => write!(f, "server unreachable: {details}"),
            Self::ServerRejected { status, message } => match message {
                Some(message) => write!(f, "server rejected request ({status}): {message}"),
                None => write!(f, "server rejected request ({status})"),
            },
        }
    }
}

impl Error for SyncError {}

#[cfg(test)]
mod tests {
    use super::SyncError;

    #[test]
    fn unreachable_hides_transport_detail_from_users() {
        let err = SyncError::TransportUnreachable("tcp connect refused 127.0.0.1:5000".to_string());
        assert_eq!(err.user_message(), "Server unreachable.");
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn rejected_surfaces_server_text_or_fallback() {
        let with_text = SyncError::ServerRejected {
            status: 401,
            message: Some("Invalid ERP credentials".to_string()),
        };
        assert_eq!(with_text.user_message(), "Invalid ERP credentials");

        let blank = SyncError::ServerRejected {
            status: 500,
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.user_message(), "Sync failed.");

        let missing = SyncError::ServerRejected {
            status: 502,
            message: None,
        };
        assert_eq!(missing.user_message(), "Sync failed.");
    }
}
