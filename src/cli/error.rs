//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::traits::RemoteError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        Self::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(InfraError::Io { .. }) => crate::exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) => match e {
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::Snapshot { .. } => crate::exitcode::NOINPUT,
                ApplicationError::SnapshotIo { .. } => crate::exitcode::IOERR,
                ApplicationError::Domain(_)
                | ApplicationError::MissingAfterConflict { .. }
                | ApplicationError::AmbiguousExists { .. } => crate::exitcode::DATAERR,
                ApplicationError::Remote(remote) => match remote {
                    RemoteError::Unauthorized(_) | RemoteError::Forbidden(_) => {
                        crate::exitcode::NOPERM
                    }
                    RemoteError::Transport(_) | RemoteError::RateLimited(_) => {
                        crate::exitcode::UNAVAILABLE
                    }
                    RemoteError::Decode(_) => crate::exitcode::PROTOCOL,
                    RemoteError::AlreadyExists { .. }
                    | RemoteError::NotFound(_)
                    | RemoteError::Api { .. } => crate::exitcode::SOFTWARE,
                },
            },
        }
    }
}
