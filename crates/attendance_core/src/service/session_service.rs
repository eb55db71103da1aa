//! Session use-case service.
//!
//! # Responsibility
//! - Log in through the proxy and persist issued credentials.
//! - Restore a persisted session and clear it on logout.
//!
//! # Invariants
//! - Credentials are persisted only after a fully parsed login response.
//! - Logout removes every stored credential key.

use crate::model::credentials::Credentials;
use crate::repo::credential_repo::{CredentialRepository, RepoError, RepoResult};
use crate::sync::api::{parse_login_response, AttendanceApi, LoginRequest};
use crate::sync::error::SyncError;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SessionError {
    /// Login request failed or returned an unusable payload.
    Api(SyncError),
    /// Credential store failure.
    Repo(RepoError),
}

impl SessionError {
    /// Message safe to show in UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Repo(_) => "Could not save the session on this device.".to_string(),
        }
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<SyncError> for SessionError {
    fn from(value: SyncError) -> Self {
        Self::Api(value)
    }
}

impl From<RepoError> for SessionError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Session facade over a credential repository.
pub struct SessionService<R: CredentialRepository> {
    repo: R,
}

impl<R: CredentialRepository> SessionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the persisted session, if all five fields are stored.
    pub fn restore(&self) -> RepoResult<Option<Credentials>> {
        self.repo.load()
    }

    /// Logs in through `api` and persists the issued credentials.
    pub fn login(
        &self,
        api: &dyn AttendanceApi,
        username: &str,
        password: &str,
    ) -> Result<Credentials, SessionError> {
        let request = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        self.complete_login(parse_login_response(api.login(&request)))
    }

    /// Persists the outcome of a login performed by the host.
    pub fn complete_login(
        &self,
        outcome: Result<Credentials, SyncError>,
    ) -> Result<Credentials, SessionError> {
        let credentials = outcome.map_err(|err| {
            error!(
                "event=login module=service status=error error_code={} error={}",
                err.code(),
                err
            );
            err
        })?;
        self.repo.save(&credentials)?;
        info!("event=login module=service status=ok");
        Ok(credentials)
    }

    /// Clears every persisted credential.
    pub fn logout(&self) -> RepoResult<()> {
        self.repo.clear()?;
        info!("event=logout module=service status=ok");
        Ok(())
    }
}
