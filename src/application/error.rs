//! Application-level errors (wraps domain and remote errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::traits::RemoteError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Remote(#[from] RemoteError),

    #[error("project {name} was reported as existing but no project of that name was found")]
    MissingAfterConflict { name: String },

    #[error("{count} existing projects are named {name}, refusing to pick one")]
    AmbiguousExists { name: String, count: usize },

    #[error("snapshot {path}: {message}")]
    Snapshot { path: PathBuf, message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("cannot {action} snapshot {path}")]
    SnapshotIo {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
