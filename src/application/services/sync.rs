//! Sync service
//!
//! The three phases of a migration, each reading the snapshot the previous one
//! wrote: fetch (source listing), clean (hierarchy build and scoping), push
//! (replication onto the target).

use tracing::{debug, info};

use crate::application::services::replicator::{
    plan_with, HierarchyReplicator, ReplicatedProject, ReplicationOptions, ReplicationReport,
};
use crate::application::services::snapshot::SnapshotService;
use crate::application::ApplicationResult;
use crate::config::{FilesConfig, SyncConfig};
use crate::domain::{forest_size, DomainError, Forest, HierarchyBuilder, Record};
use crate::infrastructure::traits::{ProjectSource, ProjectTarget};

pub struct SyncService {
    snapshots: SnapshotService,
    files: FilesConfig,
    sync: SyncConfig,
}

impl SyncService {
    pub fn new(snapshots: SnapshotService, files: FilesConfig, sync: SyncConfig) -> Self {
        Self {
            snapshots,
            files,
            sync,
        }
    }

    /// List all source projects and store them as the raw snapshot.
    pub fn fetch(&self, source: &dyn ProjectSource) -> ApplicationResult<Vec<Record>> {
        let records = source.list_all()?;
        info!("fetched {} projects from source", records.len());
        self.snapshots
            .save_records(&self.files.source_projects, &records)?;
        Ok(records)
    }

    /// Build the forest from the raw snapshot and store it as the cleaned snapshot.
    ///
    /// A non-empty `scope` overrides the configured top-level project id. An
    /// unknown scope gives an empty forest unless `require_scope` is set.
    pub fn clean(&self, scope: Option<&str>, require_scope: bool) -> ApplicationResult<Forest> {
        let records = self.snapshots.load_records(&self.files.source_projects)?;
        let scope = scope
            .filter(|s| !s.is_empty())
            .or(self.sync.top_level_project_id.as_deref())
            .filter(|s| !s.is_empty());
        debug!("clean: {} records, scope={:?}", records.len(), scope);

        if let Some(scope) = scope {
            if require_scope && !records.iter().any(|r| r.id == scope) {
                return Err(DomainError::ScopeNotFound(scope.to_string()).into());
            }
        }

        let forest = HierarchyBuilder::new(self.sync.orphans).build(&records, scope)?;
        info!(
            "built {} root(s) holding {} of {} projects",
            forest.len(),
            forest_size(&forest),
            records.len()
        );
        self.snapshots
            .save_forest(&self.files.cleaned_projects, &forest)?;
        Ok(forest)
    }

    /// The cleaned snapshot.
    pub fn forest(&self) -> ApplicationResult<Forest> {
        self.snapshots.load_forest(&self.files.cleaned_projects)
    }

    /// Replicate the cleaned snapshot onto `target`.
    pub fn push<T, F>(&self, target: T, on_each: F) -> ApplicationResult<ReplicationReport>
    where
        T: ProjectTarget,
        F: FnMut(&ReplicatedProject),
    {
        let forest = self.forest()?;
        let options = ReplicationOptions {
            ambiguity: self.sync.ambiguity,
            match_parent: self.sync.match_parent,
        };
        HierarchyReplicator::new(target, options).replicate_with(&forest, None, on_each)
    }

    /// What `push` would ensure, without contacting a target.
    pub fn plan<F>(&self, on_each: F) -> ApplicationResult<ReplicationReport>
    where
        F: FnMut(&ReplicatedProject),
    {
        let forest = self.forest()?;
        Ok(plan_with(&forest, None, on_each))
    }
}
