//! RAN Parameter Tree
//!
//! E2SM-RC carries structured control and policy payloads as a tree of RAN
//! parameters (O-RAN.WG3.E2SM-RC Section 8.4). Every node has a parameter id
//! and one of three value types:
//!
//! - **ELEMENT**: a leaf holding an integer, octet string or boolean
//! - **STRUCTURE**: an ordered sequence of child parameters
//! - **LIST**: an ordered sequence of entries, each entry itself a sequence
//!   of child parameters with the same id layout
//!
//! Trees are assembled with [`element`], [`structure`] and [`list`], whose
//! nesting mirrors the tables of the standard:
//!
//! ```
//! use nextgric_e2sm::ran_param::{element, structure};
//!
//! let nssai = structure(2, vec![
//!     element(3, "1"),
//!     element(4, "000080"),
//! ]).unwrap();
//! assert_eq!(nssai.children().len(), 2);
//! ```
//!
//! There is no schema check beyond non-empty containers and homogeneous
//! list entries, so builders must hard-code the exact id layout.

use std::fmt;

use nextgric_common::OctetString;
use thiserror::Error;

/// RAN parameter identifier.
pub type RanParamId = u32;

/// Errors raised while assembling a RAN parameter tree.
///
/// These indicate a builder bug: the resulting message would not match the
/// layout mandated by the service model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A STRUCTURE without members
    #[error("STRUCTURE parameter {id} has no members")]
    EmptyStructure {
        /// Parameter id of the structure
        id: RanParamId,
    },

    /// A LIST without entries
    #[error("LIST parameter {id} has no entries")]
    EmptyList {
        /// Parameter id of the list
        id: RanParamId,
    },

    /// A LIST entry without members
    #[error("LIST parameter {id} entry {index} has no members")]
    EmptyListEntry {
        /// Parameter id of the list
        id: RanParamId,
        /// Index of the offending entry
        index: usize,
    },

    /// LIST entries with different id layouts
    #[error("LIST parameter {id} entry {index} has ids {found:?}, expected {expected:?}")]
    HeterogeneousList {
        /// Parameter id of the list
        id: RanParamId,
        /// Index of the offending entry
        index: usize,
        /// Id sequence of the first entry
        expected: Vec<RanParamId>,
        /// Id sequence of the offending entry
        found: Vec<RanParamId>,
    },
}

/// Value carried by an ELEMENT parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    /// INTEGER value
    Integer(i64),
    /// OCTET STRING value
    OctetString(OctetString),
    /// BOOLEAN value
    Boolean(bool),
}

impl From<i64> for ElementValue {
    fn from(value: i64) -> Self {
        ElementValue::Integer(value)
    }
}

impl From<bool> for ElementValue {
    fn from(value: bool) -> Self {
        ElementValue::Boolean(value)
    }
}

impl From<OctetString> for ElementValue {
    fn from(value: OctetString) -> Self {
        ElementValue::OctetString(value)
    }
}

/// Text is carried as the raw bytes of the string, without terminator.
impl From<&str> for ElementValue {
    fn from(value: &str) -> Self {
        ElementValue::OctetString(OctetString::from_ascii(value))
    }
}

impl fmt::Display for ElementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementValue::Integer(v) => write!(f, "INTEGER {v}"),
            ElementValue::Boolean(v) => write!(f, "BOOLEAN {v}"),
            ElementValue::OctetString(os) => match os.as_utf8() {
                Some(text) if text.chars().all(|c| c.is_ascii_graphic()) => {
                    write!(f, "OCTET STRING \"{text}\"")
                }
                _ => write!(f, "OCTET STRING {os}"),
            },
        }
    }
}

/// One entry of a LIST parameter.
pub type ListEntry = Vec<RanParam>;

/// Value of a RAN parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RanParamValue {
    /// Leaf value
    Element(ElementValue),
    /// Ordered members
    Structure(Vec<RanParam>),
    /// Ordered entries with identical id layout
    List(Vec<ListEntry>),
}

/// A node of the RAN parameter tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RanParam {
    /// Parameter id
    pub id: RanParamId,
    /// Parameter value
    pub value: RanParamValue,
}

/// Builds an ELEMENT parameter.
pub fn element(id: RanParamId, value: impl Into<ElementValue>) -> RanParam {
    RanParam {
        id,
        value: RanParamValue::Element(value.into()),
    }
}

/// Builds a STRUCTURE parameter. Fails if `members` is empty.
pub fn structure(id: RanParamId, members: Vec<RanParam>) -> Result<RanParam, TreeError> {
    if members.is_empty() {
        return Err(TreeError::EmptyStructure { id });
    }
    Ok(optional_structure(id, members))
}

/// Builds a STRUCTURE parameter whose members the schema marks optional,
/// so an empty member list is accepted.
pub fn optional_structure(id: RanParamId, members: Vec<RanParam>) -> RanParam {
    RanParam {
        id,
        value: RanParamValue::Structure(members),
    }
}

/// Builds a LIST parameter.
///
/// Fails if there are no entries, if an entry is empty, or if the entries do
/// not share the id sequence of the first entry.
pub fn list(id: RanParamId, entries: Vec<ListEntry>) -> Result<RanParam, TreeError> {
    let first = entries.first().ok_or(TreeError::EmptyList { id })?;
    let expected = id_sequence(first);

    for (index, entry) in entries.iter().enumerate() {
        if entry.is_empty() {
            return Err(TreeError::EmptyListEntry { id, index });
        }
        let found = id_sequence(entry);
        if found != expected {
            return Err(TreeError::HeterogeneousList {
                id,
                index,
                expected,
                found,
            });
        }
    }

    Ok(RanParam {
        id,
        value: RanParamValue::List(entries),
    })
}

/// Ordered ids of a member sequence.
pub fn id_sequence(members: &[RanParam]) -> Vec<RanParamId> {
    members.iter().map(|p| p.id).collect()
}

impl RanParam {
    /// Returns the element value, if this is an ELEMENT.
    pub fn as_element(&self) -> Option<&ElementValue> {
        match &self.value {
            RanParamValue::Element(v) => Some(v),
            _ => None,
        }
    }

    /// Members of a STRUCTURE; empty for other kinds.
    pub fn children(&self) -> &[RanParam] {
        match &self.value {
            RanParamValue::Structure(members) => members,
            _ => &[],
        }
    }

    /// Entries of a LIST; empty for other kinds.
    pub fn entries(&self) -> &[ListEntry] {
        match &self.value {
            RanParamValue::List(entries) => entries,
            _ => &[],
        }
    }

    /// First STRUCTURE member with the given id.
    pub fn child(&self, id: RanParamId) -> Option<&RanParam> {
        self.children().iter().find(|p| p.id == id)
    }

    /// Value kind name as used by the standard.
    pub fn kind(&self) -> &'static str {
        match &self.value {
            RanParamValue::Element(_) => "ELEMENT",
            RanParamValue::Structure(_) => "STRUCTURE",
            RanParamValue::List(_) => "LIST",
        }
    }

    /// Visits every node depth-first in wire order, passing its depth.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(usize, &'a RanParam),
    {
        self.walk_at(0, visit);
    }

    fn walk_at<'a, F>(&'a self, depth: usize, visit: &mut F)
    where
        F: FnMut(usize, &'a RanParam),
    {
        visit(depth, self);
        match &self.value {
            RanParamValue::Element(_) => {}
            RanParamValue::Structure(members) => {
                for member in members {
                    member.walk_at(depth + 1, visit);
                }
            }
            RanParamValue::List(entries) => {
                for member in entries.iter().flatten() {
                    member.walk_at(depth + 1, visit);
                }
            }
        }
    }

    /// Total number of nodes in the tree, including this one.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_, _| count += 1);
        count
    }
}

/// Indented rendering, one node per line.
impl fmt::Display for RanParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = Ok(());
        self.walk(&mut |depth, param| {
            if result.is_err() {
                return;
            }
            let indent = ">".repeat(depth);
            let sep = if depth > 0 { " " } else { "" };
            result = match &param.value {
                RanParamValue::Element(v) => writeln!(f, "{indent}{sep}{} = {v}", param.id),
                RanParamValue::Structure(m) => {
                    writeln!(f, "{indent}{sep}{} STRUCTURE (len {})", param.id, m.len())
                }
                RanParamValue::List(e) => {
                    writeln!(f, "{indent}{sep}{} LIST (len {})", param.id, e.len())
                }
            };
        });
        result
    }
}
