//! Identifier and scoping types used throughout Tandem.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reserved id carried by the synthetic element at the top of every element
/// tree, and used as the parent id of top-level elements.
const ROOT_ELEMENTS_PARENT: &str = "root-elements-parent";

/// Revision used by private spaces, which track a single working revision.
const ZERO: &str = "0";

/// Opaque identifier for items, versions, revisions and elements.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Id(String);

impl Id {
    /// Mint a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The zero id, used as the revision of private working copies.
    pub fn zero() -> Self {
        Self(ZERO.to_string())
    }

    /// The reserved root-of-tree sentinel id.
    pub fn root_elements_parent() -> Self {
        Self(ROOT_ELEMENTS_PARENT.to_string())
    }

    /// Whether this id is the root-of-tree sentinel.
    pub fn is_root_elements_parent(&self) -> bool {
        self.0 == ROOT_ELEMENTS_PARENT
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal action a stage entry applies to its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for StageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "CREATE"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// Scope of one element operation: a revision of a version of an item.
///
/// Threaded through every element store call; not itself persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementContext {
    pub item_id: Id,
    pub version_id: Id,
    pub revision_id: Id,
}

impl ElementContext {
    pub fn new(item_id: Id, version_id: Id, revision_id: Id) -> Self {
        Self {
            item_id,
            version_id,
            revision_id,
        }
    }
}
