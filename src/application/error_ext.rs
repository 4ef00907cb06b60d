//! Path context for snapshot I/O errors

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

pub trait SnapshotIoExt<T> {
    /// Attach the failed action and the snapshot path.
    ///
    /// ```ignore
    /// fs.read_to_string(path).snapshot_context("read", path)?;
    /// ```
    fn snapshot_context(self, action: &'static str, path: &Path) -> ApplicationResult<T>;
}

impl<T> SnapshotIoExt<T> for io::Result<T> {
    fn snapshot_context(self, action: &'static str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::SnapshotIo {
            action,
            path: path.to_path_buf(),
            source,
        })
    }
}
