//! Domain entities: core data structures

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A project as enumerated on the source site.
///
/// Snapshots store records as `[id, name, parent_id]` arrays, `parent_id`
/// being `null` for top-level projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordTuple", into = "RecordTuple")]
pub struct Record {
    /// Source-side project id, unique within one listing
    pub id: String,
    /// Display name of the project
    pub name: String,
    /// Source-side id of the parent project, None for top-level projects
    pub parent_id: Option<String>,
}

type RecordTuple = (String, String, Option<String>);

impl From<RecordTuple> for Record {
    fn from((id, name, parent_id): RecordTuple) -> Self {
        Self {
            id,
            name,
            parent_id,
        }
    }
}

impl From<Record> for RecordTuple {
    fn from(record: Record) -> Self {
        (record.id, record.name, record.parent_id)
    }
}

impl Record {
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent_id: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: parent_id.map(str::to_string),
        }
    }

    /// A record without parent. Empty parent ids count as absent.
    pub fn is_top_level(&self) -> bool {
        self.parent_id.as_deref().map_or(true, str::is_empty)
    }
}

/// Node of a project hierarchy.
///
/// `id` is the source-side id. It is kept for display only and is never sent
/// to the target site.
///
/// Serialized as `{id, name, children}`, `children` omitted for leaves. Serde
/// recursion and drop do not grow with hierarchy depth on the call stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub children: Vec<Node>,
}

// Remaining stack below which serde work moves to a fresh segment.
const RED_ZONE: usize = 64 * 1024;
const STACK_SEGMENT: usize = 1024 * 1024;

#[derive(Serialize)]
struct NodeRef<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "no_children")]
    children: &'a [Node],
}

fn no_children(children: &&[Node]) -> bool {
    children.is_empty()
}

#[derive(Deserialize)]
struct NodeFields {
    id: String,
    name: String,
    #[serde(default)]
    children: Vec<Node>,
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || {
            NodeRef {
                id: &self.id,
                name: &self.name,
                children: &self.children,
            }
            .serialize(serializer)
        })
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || {
            NodeFields::deserialize(deserializer).map(|fields| Node {
                id: fields.id,
                name: fields.name,
                children: fields.children,
            })
        })
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Number of nodes in this subtree, including self.
    pub fn count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Number of levels in this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            max = max.max(level);
            for child in &node.children {
                stack.push((child, level + 1));
            }
        }
        max
    }
}

/// Ordered sequence of independent hierarchy roots.
pub type Forest = Vec<Node>;

/// Request to create a project on the target site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRequest {
    pub name: String,
    /// Target-side id of the parent project, None for top-level
    pub parent_id: Option<String>,
}

impl ProjectRequest {
    pub fn new(name: impl Into<String>, parent_id: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parent_id: parent_id.map(str::to_string),
        }
    }
}

/// A project as known to the target site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProject {
    /// Target-side id, unrelated to any source id
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
}
