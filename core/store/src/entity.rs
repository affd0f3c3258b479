//! Entities handled by the merge core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use tandem_common::Id;

/// One version of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: Id,
    pub modification_time: Option<DateTime<Utc>>,
}

impl Version {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            modification_time: None,
        }
    }

    pub fn with_modification_time(mut self, time: DateTime<Utc>) -> Self {
        self.modification_time = Some(time);
        self
    }
}

/// A node in the element tree of one (item, version, revision) scope.
///
/// Every tree is anchored under a synthetic root element whose id is the
/// reserved [`Id::root_elements_parent`] sentinel; top-level elements carry
/// that sentinel as their parent id. Every other element's parent id must
/// resolve to an existing element in the same space; a dangling parent is a
/// fatal consistency error, never silently repaired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: Id,
    pub parent_id: Id,
    /// Ids of the direct children.
    pub sub_element_ids: BTreeSet<Id>,
    /// Content hash used for conflict detection.
    pub hash: String,
}

impl Element {
    pub fn new(id: Id, parent_id: Id, hash: impl Into<String>) -> Self {
        Self {
            id,
            parent_id,
            sub_element_ids: BTreeSet::new(),
            hash: hash.into(),
        }
    }

    /// The synthetic root element anchoring a scope's element tree.
    pub fn tree_root() -> Self {
        Self::new(Id::root_elements_parent(), Id::root_elements_parent(), "")
    }

    pub fn with_sub_elements(mut self, sub_element_ids: impl IntoIterator<Item = Id>) -> Self {
        self.sub_element_ids = sub_element_ids.into_iter().collect();
        self
    }

    /// Lightweight handle for existence checks.
    pub fn descriptor(&self) -> ElementDescriptor {
        ElementDescriptor {
            id: self.id.clone(),
            parent_id: self.parent_id.clone(),
        }
    }
}

/// Lightweight element handle returned by descriptor lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    pub id: Id,
    pub parent_id: Id,
}

/// Per-entity synchronization record, held independently by each space.
///
/// `publish_time` is `None` while the entity has never been published from
/// this space; `dirty` marks local modifications since the last known
/// publish. The store layer maintains these records whenever content changes
/// or a publish occurs; the sync pass only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynchronizationState {
    pub id: Id,
    pub revision_id: Id,
    pub publish_time: Option<DateTime<Utc>>,
    pub dirty: bool,
}

impl SynchronizationState {
    pub fn published(id: Id, revision_id: Id, publish_time: DateTime<Utc>, dirty: bool) -> Self {
        Self {
            id,
            revision_id,
            publish_time: Some(publish_time),
            dirty,
        }
    }

    /// State of an entity created locally and never published: dirty from
    /// birth, with no publish time.
    pub fn unpublished(id: Id, revision_id: Id) -> Self {
        Self {
            id,
            revision_id,
            publish_time: None,
            dirty: true,
        }
    }
}
