//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::domain::{ProjectRequest, Record, TargetProject};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file, replacing it atomically.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Failure reported by a remote project service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("project already exists: {name}")]
    AlreadyExists { name: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("server returned {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// A same-named project already exists under the requested parent.
    pub fn is_conflict(&self) -> bool {
        matches!(self, RemoteError::AlreadyExists { .. })
    }
}

/// Source site: full enumeration of its projects.
pub trait ProjectSource {
    /// List all projects; paging is handled by the implementation.
    fn list_all(&self) -> Result<Vec<Record>, RemoteError>;
}

/// Target site: project creation and lookup.
pub trait ProjectTarget {
    /// Create a project. Fails with `RemoteError::AlreadyExists` when a sibling
    /// with the same name exists.
    fn create(&self, request: &ProjectRequest) -> Result<TargetProject, RemoteError>;

    /// All projects whose name equals `name` exactly.
    fn find_by_name(&self, name: &str) -> Result<Vec<TargetProject>, RemoteError>;
}

impl<T: ProjectTarget + ?Sized> ProjectTarget for &T {
    fn create(&self, request: &ProjectRequest) -> Result<TargetProject, RemoteError> {
        (**self).create(request)
    }

    fn find_by_name(&self, name: &str) -> Result<Vec<TargetProject>, RemoteError> {
        (**self).find_by_name(name)
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}
