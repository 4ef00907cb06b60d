//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{SnapshotService, SyncService};
use crate::config::{ServerConfig, Settings};
use crate::infrastructure::tableau::TableauClient;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraResult;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
        }
    }

    pub fn snapshot_service(&self) -> SnapshotService {
        SnapshotService::new(Arc::clone(&self.fs))
    }

    pub fn sync_service(&self) -> SyncService {
        SyncService::new(
            self.snapshot_service(),
            self.settings.files.clone(),
            self.settings.sync.clone(),
        )
    }

    /// Unsigned client for the source site.
    pub fn source_client(&self) -> InfraResult<TableauClient> {
        self.client(&self.settings.source, "source")
    }

    /// Unsigned client for the target site.
    pub fn target_client(&self) -> InfraResult<TableauClient> {
        Ok(self
            .client(&self.settings.target, "target")?
            .with_publish_samples(self.settings.sync.publish_samples))
    }

    fn client(&self, server: &ServerConfig, role: &str) -> InfraResult<TableauClient> {
        server.validate(role)?;
        Ok(TableauClient::new(server)?)
    }
}
