//! Snapshot service
//!
//! Persists the raw project listing and the cleaned forest as JSON files.
//! Records are stored as `[id, name, parent_id]` arrays, forests as nested
//! `{id, name, children}` objects.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, SnapshotIoExt};
use crate::domain::{Forest, Record};
use crate::infrastructure::traits::FileSystem;

pub struct SnapshotService {
    fs: Arc<dyn FileSystem>,
}

impl SnapshotService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    pub fn save_records(&self, path: &Path, records: &[Record]) -> ApplicationResult<()> {
        self.save(path, records)
    }

    pub fn load_records(&self, path: &Path) -> ApplicationResult<Vec<Record>> {
        self.load(path)
    }

    pub fn save_forest(&self, path: &Path, forest: &Forest) -> ApplicationResult<()> {
        self.save(path, forest)
    }

    pub fn load_forest(&self, path: &Path) -> ApplicationResult<Forest> {
        self.load(path)
    }

    fn save<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> ApplicationResult<()> {
        debug!("save snapshot: {}", path.display());
        let json = serde_json::to_string(value).map_err(|e| ApplicationError::Snapshot {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.fs
            .ensure_parent(path)
            .snapshot_context("create directory for", path)?;
        self.fs
            .write(path, &json)
            .snapshot_context("write", path)
    }

    fn load<T: DeserializeOwned>(&self, path: &Path) -> ApplicationResult<T> {
        debug!("load snapshot: {}", path.display());
        if !self.fs.exists(path) {
            return Err(ApplicationError::Snapshot {
                path: path.to_path_buf(),
                message: "not found, run the previous phase first".to_string(),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .snapshot_context("read", path)?;
        parse(&content).map_err(|e| ApplicationError::Snapshot {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Parse without serde_json's nesting limit; a forest nests two levels per project.
fn parse<T: DeserializeOwned>(content: &str) -> serde_json::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(content);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}
