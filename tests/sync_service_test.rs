//! Tests for SyncService: fetch, clean and push against fakes

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use projsync::application::services::{SnapshotService, SyncService};
use projsync::application::ApplicationError;
use projsync::config::{FilesConfig, SyncConfig};
use projsync::domain::{DomainError, Node, OrphanPolicy, Record};
use projsync::infrastructure::traits::{ProjectSource, RealFileSystem, RemoteError};
use projsync::util::testing::{init_test_setup, InMemoryTarget};

struct FixedSource(Vec<Record>);

impl ProjectSource for FixedSource {
    fn list_all(&self) -> Result<Vec<Record>, RemoteError> {
        Ok(self.0.clone())
    }
}

struct FailingSource;

impl ProjectSource for FailingSource {
    fn list_all(&self) -> Result<Vec<Record>, RemoteError> {
        Err(RemoteError::Unauthorized("token expired".into()))
    }
}

fn source() -> FixedSource {
    FixedSource(vec![
        Record::new("1", "A", None),
        Record::new("2", "B", Some("1")),
        Record::new("3", "C", Some("1")),
        Record::new("4", "D", Some("2")),
        Record::new("9", "Orphan", Some("404")),
    ])
}

fn sync_service(dir: &Path, sync: SyncConfig) -> SyncService {
    let files = FilesConfig {
        source_projects: dir.join("source_projects.json"),
        cleaned_projects: dir.join("cleaned_projects.json"),
    };
    SyncService::new(SnapshotService::new(Arc::new(RealFileSystem)), files, sync)
}

#[test]
fn given_source_when_fetch_then_writes_raw_snapshot() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let service = sync_service(temp.path(), SyncConfig::default());

    let records = service.fetch(&source()).unwrap();

    assert_eq!(records.len(), 5);
    assert!(temp.path().join("source_projects.json").exists());
}

#[test]
fn given_failing_source_when_fetch_then_no_snapshot_written() {
    let temp = TempDir::new().unwrap();
    let service = sync_service(temp.path(), SyncConfig::default());

    let result = service.fetch(&FailingSource);

    assert!(matches!(
        result,
        Err(ApplicationError::Remote(RemoteError::Unauthorized(_)))
    ));
    assert!(!temp.path().join("source_projects.json").exists());
}

#[test]
fn given_fetched_snapshot_when_clean_without_scope_then_full_forest() {
    let temp = TempDir::new().unwrap();
    let service = sync_service(temp.path(), SyncConfig::default());
    service.fetch(&source()).unwrap();

    let forest = service.clean(None, false).unwrap();

    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].count(), 4);
    assert_eq!(service.forest().unwrap(), forest);
}

#[test]
fn given_configured_scope_when_clean_then_forest_rooted_at_scope() {
    let temp = TempDir::new().unwrap();
    let sync = SyncConfig {
        top_level_project_id: Some("2".into()),
        ..SyncConfig::default()
    };
    let service = sync_service(temp.path(), sync);
    service.fetch(&source()).unwrap();

    let forest = service.clean(None, false).unwrap();

    assert_eq!(
        forest,
        vec![Node::new("2", "B").with_children(vec![Node::new("4", "D")])]
    );
}

#[test]
fn given_scope_argument_when_clean_then_overrides_configured_scope() {
    let temp = TempDir::new().unwrap();
    let sync = SyncConfig {
        top_level_project_id: Some("2".into()),
        ..SyncConfig::default()
    };
    let service = sync_service(temp.path(), sync);
    service.fetch(&source()).unwrap();

    let forest = service.clean(Some("3"), false).unwrap();

    assert_eq!(forest, vec![Node::new("3", "C")]);
}

#[test]
fn given_empty_scope_argument_when_clean_then_configured_scope_applies() {
    let temp = TempDir::new().unwrap();
    let sync = SyncConfig {
        top_level_project_id: Some("2".into()),
        ..SyncConfig::default()
    };
    let service = sync_service(temp.path(), sync);
    service.fetch(&source()).unwrap();

    let forest = service.clean(Some(""), false).unwrap();

    assert_eq!(
        forest,
        vec![Node::new("2", "B").with_children(vec![Node::new("4", "D")])]
    );
}

#[test]
fn given_unknown_scope_when_clean_then_empty_unless_required() {
    let temp = TempDir::new().unwrap();
    let service = sync_service(temp.path(), SyncConfig::default());
    service.fetch(&source()).unwrap();

    let lenient = service.clean(Some("77"), false).unwrap();
    let strict = service.clean(Some("77"), true);

    assert!(lenient.is_empty());
    assert!(matches!(
        strict,
        Err(ApplicationError::Domain(DomainError::ScopeNotFound(id))) if id == "77"
    ));
}

#[test]
fn given_reject_policy_when_clean_then_orphan_fails_the_phase() {
    let temp = TempDir::new().unwrap();
    let sync = SyncConfig {
        orphans: OrphanPolicy::Reject,
        ..SyncConfig::default()
    };
    let service = sync_service(temp.path(), sync);
    service.fetch(&source()).unwrap();

    let result = service.clean(None, false);

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::OrphanedRecord { .. }))
    ));
    assert!(!temp.path().join("cleaned_projects.json").exists());
}

#[test]
fn given_no_raw_snapshot_when_clean_then_snapshot_error() {
    let temp = TempDir::new().unwrap();
    let service = sync_service(temp.path(), SyncConfig::default());

    let result = service.clean(None, false);

    assert!(matches!(result, Err(ApplicationError::Snapshot { .. })));
}

#[test]
fn given_cleaned_snapshot_when_push_then_replicates_onto_target() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let service = sync_service(temp.path(), SyncConfig::default());
    service.fetch(&source()).unwrap();
    service.clean(None, false).unwrap();
    let target = InMemoryTarget::new();
    let mut narrated = 0;

    let report = service.push(&target, |_| narrated += 1).unwrap();

    assert_eq!(report.created(), 4);
    assert_eq!(narrated, 4);
    assert_eq!(target.projects().len(), 4);
}

#[test]
fn given_deep_hierarchy_when_clean_then_push_reads_it_back() {
    let temp = TempDir::new().unwrap();
    let service = sync_service(temp.path(), SyncConfig::default());
    let depth: usize = 300;
    let records: Vec<Record> = (0..depth)
        .map(|i| {
            let parent = i.checked_sub(1).map(|p| p.to_string());
            Record::new(i.to_string(), format!("level-{i}"), parent.as_deref())
        })
        .collect();
    service.fetch(&FixedSource(records)).unwrap();
    service.clean(None, false).unwrap();
    let target = InMemoryTarget::new();

    let report = service.push(&target, |_| {}).unwrap();

    assert_eq!(report.created(), depth);
    assert_eq!(report.entries.last().map(|e| e.depth), Some(depth - 1));
}

#[test]
fn given_cleaned_snapshot_when_plan_then_reports_without_target() {
    let temp = TempDir::new().unwrap();
    let service = sync_service(temp.path(), SyncConfig::default());
    service.fetch(&source()).unwrap();
    service.clean(None, false).unwrap();
    let mut narrated = Vec::new();

    let report = service.plan(|entry| narrated.push(entry.name.clone())).unwrap();

    assert_eq!(report.planned(), 4);
    assert_eq!(narrated, vec!["A", "B", "D", "C"]);
}

#[test]
fn given_no_cleaned_snapshot_when_plan_then_snapshot_error() {
    let temp = TempDir::new().unwrap();
    let service = sync_service(temp.path(), SyncConfig::default());

    let result = service.plan(|_| {});

    assert!(matches!(result, Err(ApplicationError::Snapshot { .. })));
}
