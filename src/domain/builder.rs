//! Hierarchy builder: flat project records to a forest of nested nodes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::entities::{Forest, Node, Record};
use crate::domain::error::DomainError;

/// Result type for hierarchy operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// What to do with a record whose parent is not part of the listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Keep building; the record and its descendants are not reachable from the forest.
    #[default]
    Drop,
    /// Fail on the first orphan in record order.
    Reject,
}

/// Constructs project hierarchies from flat record listings.
#[derive(Debug, Clone, Default)]
pub struct HierarchyBuilder {
    orphans: OrphanPolicy,
}

impl HierarchyBuilder {
    pub fn new(orphans: OrphanPolicy) -> Self {
        Self { orphans }
    }

    /// Build the forest of `records`, optionally re-rooted at `scope`.
    ///
    /// Without scope every top-level record becomes a root. With scope only the
    /// record whose id equals `scope` becomes a root, whatever its own parent;
    /// an unknown scope yields an empty forest. Children keep record order.
    ///
    /// Each record is exactly one node. Parents are resolved through an id index
    /// local to this call.
    #[instrument(level = "debug", skip(self, records), fields(records = records.len()))]
    pub fn build(&self, records: &[Record], scope: Option<&str>) -> TreeResult<Forest> {
        let scope = scope.filter(|s| !s.is_empty());

        let index: HashMap<&str, usize> = records
            .iter()
            .enumerate()
            .map(|(pos, record)| (record.id.as_str(), pos))
            .collect();

        let mut roots = Vec::new();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];

        for (pos, record) in records.iter().enumerate() {
            match scope {
                Some(scope) if record.id == scope => roots.push(pos),
                None if record.is_top_level() => roots.push(pos),
                _ => {
                    // Top-level records outside the scope end up here with no parent.
                    let Some(parent_id) = record.parent_id.as_deref().filter(|p| !p.is_empty())
                    else {
                        continue;
                    };
                    match index.get(parent_id) {
                        Some(&parent) => children[parent].push(pos),
                        None => self.orphan(record, parent_id)?,
                    }
                }
            }
        }

        debug!("build: {} roots, scope={:?}", roots.len(), scope);
        Ok(materialize(records, &roots, &children))
    }

    fn orphan(&self, record: &Record, parent_id: &str) -> TreeResult<()> {
        match self.orphans {
            OrphanPolicy::Drop => {
                debug!("dropping orphan {} ({}): parent {} unknown", record.name, record.id, parent_id);
                Ok(())
            }
            OrphanPolicy::Reject => Err(DomainError::OrphanedRecord {
                id: record.id.clone(),
                parent_id: parent_id.to_string(),
            }),
        }
    }
}

/// Build nested nodes bottom-up so that hierarchy depth is not bounded by the call stack.
///
/// Only positions reachable from `roots` are materialized.
fn materialize(records: &[Record], roots: &[usize], children: &[Vec<usize>]) -> Forest {
    let mut preorder = Vec::with_capacity(records.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(pos) = stack.pop() {
        preorder.push(pos);
        stack.extend(children[pos].iter().rev());
    }

    // Reverse pre-order visits every node after all of its descendants.
    let mut built: Vec<Option<Node>> = (0..records.len()).map(|_| None).collect();
    for &pos in preorder.iter().rev() {
        let record = &records[pos];
        let kids = children[pos]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[pos] = Some(Node::new(record.id.clone(), record.name.clone()).with_children(kids));
    }

    roots.iter().filter_map(|&root| built[root].take()).collect()
}

/// Build with the permissive default policy, which never fails.
pub fn build_forest(records: &[Record], scope: Option<&str>) -> Forest {
    HierarchyBuilder::new(OrphanPolicy::Drop)
        .build(records, scope)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Record> {
        vec![
            Record::new("1", "A", None),
            Record::new("2", "B", Some("1")),
            Record::new("3", "C", Some("1")),
            Record::new("4", "D", Some("2")),
        ]
    }

    #[test]
    fn given_sample_records_when_building_unscoped_then_nests_children_in_order() {
        let forest = build_forest(&sample(), None);

        let expected = vec![Node::new("1", "A").with_children(vec![
            Node::new("2", "B").with_children(vec![Node::new("4", "D")]),
            Node::new("3", "C"),
        ])];
        assert_eq!(forest, expected);
    }

    #[test]
    fn given_scope_when_building_then_reroots_at_scoped_record() {
        let forest = build_forest(&sample(), Some("2"));

        assert_eq!(
            forest,
            vec![Node::new("2", "B").with_children(vec![Node::new("4", "D")])]
        );
    }

    #[test]
    fn given_empty_scope_string_when_building_then_behaves_unscoped() {
        assert_eq!(build_forest(&sample(), Some("")), build_forest(&sample(), None));
    }

    #[test]
    fn given_child_listed_before_parent_when_building_then_still_attaches() {
        let records = vec![
            Record::new("2", "B", Some("1")),
            Record::new("1", "A", None),
        ];

        let forest = build_forest(&records, None);

        assert_eq!(
            forest,
            vec![Node::new("1", "A").with_children(vec![Node::new("2", "B")])]
        );
    }

    #[test]
    fn given_orphan_when_rejecting_then_errors() {
        let records = vec![
            Record::new("1", "A", None),
            Record::new("2", "B", Some("missing")),
        ];

        let result = HierarchyBuilder::new(OrphanPolicy::Reject).build(&records, None);

        assert_eq!(
            result,
            Err(DomainError::OrphanedRecord {
                id: "2".into(),
                parent_id: "missing".into()
            })
        );
    }

    #[test]
    fn given_scope_when_rejecting_then_top_level_records_outside_scope_are_not_orphans() {
        let result = HierarchyBuilder::new(OrphanPolicy::Reject).build(&sample(), Some("2"));

        assert!(result.is_ok());
    }

    #[test]
    fn given_deep_chain_when_building_then_does_not_overflow() {
        let depth = 100_000;
        let records: Vec<Record> = (0..depth)
            .map(|i| {
                let parent = if i == 0 { None } else { Some((i - 1).to_string()) };
                Record::new(i.to_string(), format!("p{i}"), parent.as_deref())
            })
            .collect();

        let forest = build_forest(&records, None);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].count(), depth);
        assert_eq!(forest[0].depth(), depth);
    }
}
