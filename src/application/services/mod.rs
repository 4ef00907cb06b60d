//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, ProjectSource, ProjectTarget)
//! but are themselves concrete structs, not traits.

mod replicator;
mod snapshot;
mod sync;

pub use replicator::{
    plan, plan_with, AmbiguityPolicy, Ensured, HierarchyReplicator, Outcome, ReplicatedProject,
    ReplicationOptions, ReplicationReport,
};
pub use snapshot::SnapshotService;
pub use sync::SyncService;
