//! Session credentials issued by login.
//!
//! # Invariants
//! - All five fields are opaque; core never interprets their structure.
//! - Credentials are immutable once issued.

use serde::{Deserialize, Serialize};

/// Opaque identifiers required by every attendance fetch.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: String,
    pub access_token: String,
    pub context_id: String,
    pub x_token: String,
    pub session_id: String,
}

impl Credentials {
    /// Returns whether every field carries a non-blank value.
    pub fn is_complete(&self) -> bool {
        [
            &self.user_id,
            &self.access_token,
            &self.context_id,
            &self.x_token,
            &self.session_id,
        ]
        .iter()
        .all(|value| !value.trim().is_empty())
    }
}

// Tokens must never reach logs through `{:?}`.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .field("context_id", &self.context_id)
            .field("x_token", &"<redacted>")
            .field("session_id", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Credentials;

    fn sample() -> Credentials {
        Credentials {
            user_id: "42".to_string(),
            access_token: "secret-access".to_string(),
            context_id: "7".to_string(),
            x_token: "secret-x".to_string(),
            session_id: "secret-session".to_string(),
        }
    }

    #[test]
    fn complete_requires_every_field() {
        assert!(sample().is_complete());

        let mut partial = sample();
        partial.x_token = " ".to_string();
        assert!(!partial.is_complete());
    }

    #[test]
    fn debug_output_redacts_tokens() {
        let rendered = format!("{:?}", sample());
        assert!(rendered.contains("42"));
        assert!(!rendered.contains("secret"));
    }
}
