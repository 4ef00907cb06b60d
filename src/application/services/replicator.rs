//! Hierarchy replication service
//!
//! Replays a project forest onto a target site, creating each project under
//! the target-side id of its already ensured parent.

use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Node, ProjectRequest, TargetProject};
use crate::infrastructure::traits::ProjectTarget;

/// How to pick among several same-named projects found after a conflict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityPolicy {
    /// Take the first project returned by the lookup.
    #[default]
    First,
    /// Fail with `ApplicationError::AmbiguousExists`.
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplicationOptions {
    pub ambiguity: AmbiguityPolicy,
    /// Only accept lookup candidates whose parent is the requested parent.
    pub match_parent: bool,
}

/// How a project was resolved on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    FoundExisting,
    /// Nothing was sent to the target, see `plan`.
    Planned,
}

/// Result of one `ensure` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ensured {
    pub project: TargetProject,
    pub outcome: Outcome,
}

/// One replicated node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicatedProject {
    pub source_id: String,
    pub name: String,
    pub target_id: String,
    pub parent_target_id: Option<String>,
    /// Level in the forest, roots are 0
    pub depth: usize,
    pub outcome: Outcome,
}

/// Every node of a replication pass, in pre-order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicationReport {
    pub entries: Vec<ReplicatedProject>,
}

impl ReplicationReport {
    pub fn created(&self) -> usize {
        self.count(Outcome::Created)
    }

    pub fn reused(&self) -> usize {
        self.count(Outcome::FoundExisting)
    }

    pub fn planned(&self) -> usize {
        self.count(Outcome::Planned)
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }
}

/// Service for replaying a forest onto a target site.
pub struct HierarchyReplicator<T> {
    target: T,
    options: ReplicationOptions,
}

impl<T: ProjectTarget> HierarchyReplicator<T> {
    pub fn new(target: T, options: ReplicationOptions) -> Self {
        Self { target, options }
    }

    /// Create the requested project, or find the existing one on conflict.
    ///
    /// Any failure other than a conflict is returned unchanged.
    pub fn ensure(&self, request: &ProjectRequest) -> ApplicationResult<Ensured> {
        match self.target.create(request) {
            Ok(project) => {
                info!("created project {} ({})", project.name, project.id);
                Ok(Ensured {
                    project,
                    outcome: Outcome::Created,
                })
            }
            Err(e) if e.is_conflict() => {
                info!("project {} already exists, reusing it", request.name);
                self.resolve_existing(request)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn resolve_existing(&self, request: &ProjectRequest) -> ApplicationResult<Ensured> {
        let mut candidates = self.target.find_by_name(&request.name)?;
        if self.options.match_parent {
            candidates.retain(|c| c.parent_id == request.parent_id);
        }
        debug!("resolve_existing: {} candidates for {}", candidates.len(), request.name);

        if candidates.len() > 1 {
            match self.options.ambiguity {
                AmbiguityPolicy::First => warn!(
                    "{} projects named {}, using the first ({})",
                    candidates.len(),
                    request.name,
                    candidates[0].id
                ),
                AmbiguityPolicy::Reject => {
                    return Err(ApplicationError::AmbiguousExists {
                        name: request.name.clone(),
                        count: candidates.len(),
                    })
                }
            }
        }

        let project = candidates.into_iter().next().ok_or_else(|| {
            ApplicationError::MissingAfterConflict {
                name: request.name.clone(),
            }
        })?;
        Ok(Ensured {
            project,
            outcome: Outcome::FoundExisting,
        })
    }

    /// Ensure every node of `forest` under `parent`, parents before children.
    pub fn replicate(
        &self,
        forest: &[Node],
        parent: Option<&str>,
    ) -> ApplicationResult<ReplicationReport> {
        self.replicate_with(forest, parent, |_| {})
    }

    /// Like `replicate`, calling `on_each` as soon as a node is resolved.
    ///
    /// Traversal is depth-first pre-order with siblings in forest order. The
    /// first error stops the pass; projects ensured before it stay on the target.
    pub fn replicate_with<F>(
        &self,
        forest: &[Node],
        parent: Option<&str>,
        on_each: F,
    ) -> ApplicationResult<ReplicationReport>
    where
        F: FnMut(&ReplicatedProject),
    {
        traverse(forest, parent, |_, request| self.ensure(request), on_each)
    }
}

/// What `replicate` would ensure, without a target.
///
/// Every entry is `Outcome::Planned`; `planned:<source id>` stands in for the
/// target ids children would be created under.
pub fn plan(forest: &[Node], parent: Option<&str>) -> ReplicationReport {
    plan_with(forest, parent, |_| {})
}

pub fn plan_with<F>(forest: &[Node], parent: Option<&str>, on_each: F) -> ReplicationReport
where
    F: FnMut(&ReplicatedProject),
{
    let result = traverse::<Infallible, _, _>(
        forest,
        parent,
        |node, request| Ok(planned(node, request)),
        on_each,
    );
    match result {
        Ok(report) => report,
        Err(never) => match never {},
    }
}

/// Pre-order walk resolving each node before pushing its children.
fn traverse<E, R, F>(
    forest: &[Node],
    parent: Option<&str>,
    mut resolve: R,
    mut on_each: F,
) -> Result<ReplicationReport, E>
where
    R: FnMut(&Node, &ProjectRequest) -> Result<Ensured, E>,
    F: FnMut(&ReplicatedProject),
{
    let mut report = ReplicationReport::default();
    let mut stack: Vec<(usize, &Node, Option<String>)> = forest
        .iter()
        .rev()
        .map(|node| (0, node, parent.map(str::to_string)))
        .collect();

    while let Some((depth, node, parent_id)) = stack.pop() {
        let request = ProjectRequest {
            name: node.name.clone(),
            parent_id,
        };
        let ensured = resolve(node, &request)?;

        for child in node.children.iter().rev() {
            stack.push((depth + 1, child, Some(ensured.project.id.clone())));
        }

        let entry = ReplicatedProject {
            source_id: node.id.clone(),
            name: node.name.clone(),
            target_id: ensured.project.id,
            parent_target_id: request.parent_id,
            depth,
            outcome: ensured.outcome,
        };
        on_each(&entry);
        report.entries.push(entry);
    }

    debug!(
        "traverse: created={} reused={} planned={}",
        report.created(),
        report.reused(),
        report.planned()
    );
    Ok(report)
}

fn planned(node: &Node, request: &ProjectRequest) -> Ensured {
    Ensured {
        project: TargetProject {
            id: format!("planned:{}", node.id),
            name: request.name.clone(),
            parent_id: request.parent_id.clone(),
        },
        outcome: Outcome::Planned,
    }
}
