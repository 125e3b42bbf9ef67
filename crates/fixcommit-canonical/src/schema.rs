//! Group-membership rules used by the extractor and the tree builder.
//!
//! A [`Schema`] is built and validated once, then passed by reference into
//! every pipeline invocation. It only describes structure: which tags open
//! repeating groups, which field starts each entry, and how groups nest.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::errors::{CanonicalError, SchemaError};

/// Definition of one repeating group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDef {
    /// Tag of the count field (`NoXxx`) that opens the group.
    pub count_tag: u32,
    /// First field of every entry; a repeat of it starts the next entry.
    pub delimiter_tag: u32,
    /// Other tags allowed inside an entry, including nested group count tags.
    #[serde(default)]
    pub members: BTreeSet<u32>,
    /// Enclosing group, or `None` for a top-level group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u32>,
}

impl GroupDef {
    /// Declares a group that appears at the top level of a message.
    pub fn top_level(count_tag: u32, delimiter_tag: u32) -> Self {
        Self {
            count_tag,
            delimiter_tag,
            members: BTreeSet::new(),
            parent: None,
        }
    }

    /// Declares a group nested inside the entries of `parent`.
    pub fn nested(count_tag: u32, delimiter_tag: u32, parent: u32) -> Self {
        Self {
            parent: Some(parent),
            ..Self::top_level(count_tag, delimiter_tag)
        }
    }

    /// Adds entry member tags.
    pub fn with_members(mut self, members: impl IntoIterator<Item = u32>) -> Self {
        self.members.extend(members);
        self
    }

    /// Whether `tag` may appear inside an entry of this group.
    pub fn accepts(&self, tag: u32) -> bool {
        tag == self.delimiter_tag || self.members.contains(&tag)
    }
}

/// Position of a field inside one group entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupPosition {
    /// Group count tag.
    pub group_tag: u32,
    /// Zero-based entry index.
    pub entry: usize,
}

/// Chain of group positions from the outermost group inward.
///
/// An empty scope means the top level of the message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupScope(Vec<GroupPosition>);

impl GroupScope {
    /// Top-level scope.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns a scope one level deeper.
    pub fn enter(&self, group_tag: u32, entry: usize) -> Self {
        let mut frames = self.0.clone();
        frames.push(GroupPosition { group_tag, entry });
        Self(frames)
    }

    /// Innermost group position, if any.
    pub fn innermost(&self) -> Option<GroupPosition> {
        self.0.last().copied()
    }

    /// Frames from the outermost group inward.
    pub fn frames(&self) -> &[GroupPosition] {
        &self.0
    }

    /// Whether this is the top-level scope.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<GroupPosition>> for GroupScope {
    fn from(frames: Vec<GroupPosition>) -> Self {
        Self(frames)
    }
}

impl fmt::Display for GroupScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "root");
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|p| format!("{}[{}]", p.group_tag, p.entry))
            .collect();
        write!(f, "{}", parts.join("/"))
    }
}

/// Validated set of group definitions keyed by count tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaFile", into = "SchemaFile")]
pub struct Schema {
    groups: BTreeMap<u32, GroupDef>,
}

/// On-disk shape of a schema.
#[derive(Serialize, Deserialize)]
struct SchemaFile {
    groups: Vec<GroupDef>,
}

impl TryFrom<SchemaFile> for Schema {
    type Error = SchemaError;

    fn try_from(file: SchemaFile) -> Result<Self, Self::Error> {
        file.groups
            .into_iter()
            .fold(Schema::builder(), SchemaBuilder::group)
            .build()
    }
}

impl From<Schema> for SchemaFile {
    fn from(schema: Schema) -> Self {
        Self {
            groups: schema.groups.into_values().collect(),
        }
    }
}

impl Schema {
    /// Starts a new schema definition.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// A schema with no groups; every field is a top-level scalar.
    pub fn flat() -> Self {
        Self::default()
    }

    /// Groups commonly found in instrument / security descriptors.
    pub fn instrument() -> Self {
        let builder = Schema::builder()
            // SecurityAltID
            .group(GroupDef::top_level(454, 455).with_members([456]))
            // Parties, with PartySubIDs
            .group(GroupDef::top_level(453, 448).with_members([447, 452, 802]))
            .group(GroupDef::nested(802, 523, 453).with_members([803]))
            // Stipulations
            .group(GroupDef::top_level(232, 233).with_members([234]))
            // Events
            .group(GroupDef::top_level(864, 865).with_members([866, 867, 868, 1145]))
            // InstrAttrib
            .group(GroupDef::top_level(870, 871).with_members([872]))
            // Underlyings, with UnderlyingSecurityAltID
            .group(GroupDef::top_level(711, 311).with_members([305, 309, 318, 457, 810, 879]))
            .group(GroupDef::nested(457, 458, 711).with_members([459]))
            // Legs, with LegSecurityAltID
            .group(GroupDef::top_level(555, 600).with_members([556, 602, 603, 604, 623, 624]))
            .group(GroupDef::nested(604, 605, 555).with_members([606]))
            // ComplexEvents
            .group(GroupDef::top_level(1483, 1484).with_members([1485, 1486, 1487, 1489, 1490]));
        builder.build().expect("invalid built-in instrument schema")
    }

    /// Looks up a group by count tag.
    pub fn group(&self, count_tag: u32) -> Option<&GroupDef> {
        self.groups.get(&count_tag)
    }

    /// All group definitions in tag order.
    pub fn groups(&self) -> impl Iterator<Item = &GroupDef> {
        self.groups.values()
    }

    /// Returns the group opened by `tag` when it appears inside `parent`
    /// (`None` for the top level).
    pub fn group_at(&self, tag: u32, parent: Option<u32>) -> Option<&GroupDef> {
        self.groups.get(&tag).filter(|def| def.parent == parent)
    }

    /// Checks that every frame of `scope` names a group declared at that depth.
    pub fn check_scope(&self, scope: &GroupScope) -> Result<(), CanonicalError> {
        let mut parent = None;
        for frame in scope.frames() {
            if self.group_at(frame.group_tag, parent).is_none() {
                return Err(CanonicalError::UnknownGroupReference {
                    group_tag: frame.group_tag,
                    parent,
                });
            }
            parent = Some(frame.group_tag);
        }
        Ok(())
    }
}

/// Accumulates group definitions and validates them on [`SchemaBuilder::build`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    defs: Vec<GroupDef>,
}

impl SchemaBuilder {
    /// Adds one group definition.
    pub fn group(mut self, def: GroupDef) -> Self {
        self.defs.push(def);
        self
    }

    /// Validates the definitions and produces a schema.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut groups = BTreeMap::new();
        for def in self.defs {
            if def.count_tag == 0 {
                return Err(SchemaError::ZeroTag("group count tag"));
            }
            if def.delimiter_tag == 0 || def.members.contains(&0) {
                return Err(SchemaError::ZeroTag("group member tag"));
            }
            if groups.contains_key(&def.count_tag) {
                return Err(SchemaError::DuplicateGroup(def.count_tag));
            }
            groups.insert(def.count_tag, def);
        }

        for def in groups.values() {
            if groups.contains_key(&def.delimiter_tag) {
                return Err(SchemaError::DelimiterIsGroup {
                    group_tag: def.count_tag,
                    delimiter: def.delimiter_tag,
                });
            }
            if let Some(parent) = def.parent {
                if !groups.contains_key(&parent) {
                    return Err(SchemaError::UnknownParent {
                        group_tag: def.count_tag,
                        parent,
                    });
                }
            }
            let mut seen = BTreeSet::new();
            let mut cursor = def.parent;
            while let Some(parent) = cursor {
                if parent == def.count_tag || !seen.insert(parent) {
                    return Err(SchemaError::CyclicNesting(def.count_tag));
                }
                cursor = groups.get(&parent).and_then(|p| p.parent);
            }
        }

        // A nested group's count tag is always a member of its parent.
        let links: Vec<(u32, u32)> = groups
            .values()
            .filter_map(|def| def.parent.map(|parent| (parent, def.count_tag)))
            .collect();
        for (parent, child) in links {
            if let Some(def) = groups.get_mut(&parent) {
                def.members.insert(child);
            }
        }

        Ok(Schema { groups })
    }
}
