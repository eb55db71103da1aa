//! SQLite-backed session store.
//!
//! # Responsibility
//! - Resolve where the store lives and open configured connections.
//! - Keep the credential schema current.
//!
//! # Invariants
//! - The store only lives inside a host-provided absolute directory.
//! - Connections are handed out only after migrations succeed.
//! - Deleted rows are zeroed on disk (`secure_delete`).

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// File name of the session store inside the host data directory.
pub const SESSION_DB_FILE_NAME: &str = "attendance_session.sqlite3";

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Store written by a newer build; opening it would risk data loss.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Host handed over an unusable data directory.
    InvalidStoreDir(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "session store error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "session store has schema v{db_version}; this build reads up to v{latest_supported}"
            ),
            Self::InvalidStoreDir(details) => {
                write!(f, "invalid session store directory: {details}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::InvalidStoreDir(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Resolves the store file inside `data_dir`, creating the directory if needed.
///
/// # Errors
/// - `InvalidStoreDir` for blank or relative paths, or when the directory
///   cannot be created.
pub fn session_db_path(data_dir: &str) -> DbResult<PathBuf> {
    let trimmed = data_dir.trim();
    if trimmed.is_empty() {
        return Err(DbError::InvalidStoreDir("path is empty".to_string()));
    }
    let dir = Path::new(trimmed);
    if !dir.is_absolute() {
        return Err(DbError::InvalidStoreDir(format!("`{trimmed}` is not absolute")));
    }
    std::fs::create_dir_all(dir)
        .map_err(|err| DbError::InvalidStoreDir(format!("`{trimmed}`: {err}")))?;
    Ok(dir.join(SESSION_DB_FILE_NAME))
}
