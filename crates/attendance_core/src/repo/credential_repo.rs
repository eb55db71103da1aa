//! Credential store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the five session credential fields under fixed key names.
//! - Restore a session only when every field is present.
//!
//! # Invariants
//! - `save` replaces all five keys atomically.
//! - `clear` removes every stored key (logout).
//! - `load` never returns partially populated credentials.

use crate::db::DbError;
use crate::model::credentials::Credentials;
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const KEY_ACCESS_TOKEN: &str = "access_token";
pub const KEY_USER_ID: &str = "user_id";
pub const KEY_CONTEXT_ID: &str = "context_id";
pub const KEY_X_TOKEN: &str = "x_token";
pub const KEY_SESSION_ID: &str = "session_id";

/// Every key written by `save`, in write order.
pub const CREDENTIAL_KEYS: [&str; 5] = [
    KEY_ACCESS_TOKEN,
    KEY_USER_ID,
    KEY_CONTEXT_ID,
    KEY_X_TOKEN,
    KEY_SESSION_ID,
];

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Caller tried to persist credentials with blank fields.
    IncompleteCredentials,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::IncompleteCredentials => {
                write!(f, "credentials must carry all five non-empty fields")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::IncompleteCredentials => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Client-local credential persistence.
pub trait CredentialRepository {
    fn save(&self, credentials: &Credentials) -> RepoResult<()>;
    fn load(&self) -> RepoResult<Option<Credentials>>;
    fn clear(&self) -> RepoResult<()>;
}

/// SQLite-backed credential store.
pub struct SqliteCredentialRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCredentialRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn read_key(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM credential_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value.filter(|value| !value.trim().is_empty()))
    }
}

impl CredentialRepository for SqliteCredentialRepository<'_> {
    fn save(&self, credentials: &Credentials) -> RepoResult<()> {
        if !credentials.is_complete() {
            return Err(RepoError::IncompleteCredentials);
        }

        let values = [
            credentials.access_token.as_str(),
            credentials.user_id.as_str(),
            credentials.context_id.as_str(),
            credentials.x_token.as_str(),
            credentials.session_id.as_str(),
        ];

        // Rolls back on drop, including when COMMIT itself fails.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for (key, value) in CREDENTIAL_KEYS.iter().zip(values) {
            tx.execute(
                "INSERT INTO credential_entries (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )?;
        }
        tx.commit().map_err(|err| {
            warn!("event=credentials_save module=repo status=error error_code=commit_failed error={err}");
            err
        })?;

        info!("event=credentials_save module=repo status=ok");
        Ok(())
    }

    fn load(&self) -> RepoResult<Option<Credentials>> {
        let (
            Some(access_token),
            Some(user_id),
            Some(context_id),
            Some(x_token),
            Some(session_id),
        ) = (
            self.read_key(KEY_ACCESS_TOKEN)?,
            self.read_key(KEY_USER_ID)?,
            self.read_key(KEY_CONTEXT_ID)?,
            self.read_key(KEY_X_TOKEN)?,
            self.read_key(KEY_SESSION_ID)?,
        )
        else {
            return Ok(None);
        };

        Ok(Some(Credentials {
            user_id,
            access_token,
            context_id,
            x_token,
            session_id,
        }))
    }

    fn clear(&self) -> RepoResult<()> {
        let removed = self.conn.execute("DELETE FROM credential_entries;", [])?;
        info!("event=credentials_clear module=repo status=ok removed={removed}");
        Ok(())
    }
}
