//! Canonical tree model and the structural tree builder.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::errors::CanonicalError;
use crate::extract::RawField;
use crate::path::FieldPath;
use crate::schema::{GroupScope, Schema};

/// A value in the canonical tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanonicalNode {
    /// Field value, byte-identical to the input text.
    Scalar(String),
    /// Repeating group entries in input order.
    Group(Vec<CanonicalEntry>),
}

/// Mapping from tag to node. Keys are unique and iterate in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalEntry(BTreeMap<u32, CanonicalNode>);

impl CanonicalEntry {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, returning the node previously stored under `tag`.
    pub fn insert(&mut self, tag: u32, node: CanonicalNode) -> Option<CanonicalNode> {
        self.0.insert(tag, node)
    }

    /// Node stored under `tag`.
    pub fn get(&self, tag: u32) -> Option<&CanonicalNode> {
        self.0.get(&tag)
    }

    /// Entries in ascending tag order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &CanonicalNode)> {
        self.0.iter().map(|(tag, node)| (*tag, node))
    }

    /// Tags in ascending order.
    pub fn tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.keys().copied()
    }

    /// Number of tags in this mapping.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping has no tags.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(u32, CanonicalNode)> for CanonicalEntry {
    fn from_iter<I: IntoIterator<Item = (u32, CanonicalNode)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Root mapping of a canonicalized message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalTree {
    root: CanonicalEntry,
}

impl CanonicalTree {
    /// Wraps a root mapping.
    pub fn new(root: CanonicalEntry) -> Self {
        Self { root }
    }

    /// The root mapping.
    pub fn root(&self) -> &CanonicalEntry {
        &self.root
    }

    /// Whether the tree holds no fields.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Looks up the scalar addressed by `path`.
    pub fn scalar(&self, path: &FieldPath) -> Option<&str> {
        let mut entry = &self.root;
        let mut segments = path.segments().iter();
        loop {
            let tag = u32::try_from(*segments.next()?).ok()?;
            match entry.get(tag)? {
                CanonicalNode::Scalar(value) => {
                    return segments.next().is_none().then_some(value.as_str());
                }
                CanonicalNode::Group(entries) => {
                    let index = usize::try_from(*segments.next()?).ok()?;
                    entry = entries.get(index)?;
                }
            }
        }
    }

    /// Number of scalar fields in the tree, across all group entries.
    pub fn scalar_count(&self) -> usize {
        fn count(entry: &CanonicalEntry) -> usize {
            entry
                .iter()
                .map(|(_, node)| match node {
                    CanonicalNode::Scalar(_) => 1,
                    CanonicalNode::Group(entries) => entries.iter().map(count).sum(),
                })
                .sum()
        }
        count(&self.root)
    }
}

enum StagedNode {
    Scalar(String),
    Group(BTreeMap<usize, StagedEntry>),
}

#[derive(Default)]
struct StagedEntry(BTreeMap<u32, StagedNode>);

impl StagedEntry {
    fn finish(self) -> CanonicalEntry {
        self.0
            .into_iter()
            .map(|(tag, node)| {
                let node = match node {
                    StagedNode::Scalar(value) => CanonicalNode::Scalar(value),
                    // Entry order follows the index; gaps collapse.
                    StagedNode::Group(entries) => CanonicalNode::Group(
                        entries.into_values().map(StagedEntry::finish).collect(),
                    ),
                };
                (tag, node)
            })
            .collect()
    }
}

/// Builds the canonical tree for a set of extracted fields.
///
/// The result depends only on the set of `(scope, tag, value)` triples, not
/// on the order of `fields`. No field values are interpreted.
///
/// # Errors
///
/// - [`CanonicalError::UnknownGroupReference`] when a field's scope names a
///   group the schema does not declare at that depth.
/// - [`CanonicalError::DuplicateField`] when two fields land on the same tag
///   within one mapping.
pub fn build_tree(fields: &[RawField], schema: &Schema) -> Result<CanonicalTree, CanonicalError> {
    let mut root = StagedEntry::default();
    for field in fields {
        schema.check_scope(&field.scope)?;
        let mut entry = &mut root;
        let mut scope = GroupScope::root();
        for frame in field.scope.frames() {
            let node = entry
                .0
                .entry(frame.group_tag)
                .or_insert_with(|| StagedNode::Group(BTreeMap::new()));
            let StagedNode::Group(entries) = node else {
                return Err(CanonicalError::DuplicateField {
                    tag: frame.group_tag,
                    scope,
                });
            };
            scope = scope.enter(frame.group_tag, frame.entry);
            entry = entries.entry(frame.entry).or_default();
        }
        match entry.0.entry(field.tag) {
            Entry::Occupied(_) => {
                return Err(CanonicalError::DuplicateField {
                    tag: field.tag,
                    scope,
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(StagedNode::Scalar(field.value.clone()));
            }
        }
    }
    let tree = CanonicalTree::new(root.finish());
    tracing::trace!(scalars = tree.scalar_count(), "built canonical tree");
    Ok(tree)
}
