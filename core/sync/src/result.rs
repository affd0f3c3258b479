//! Merge result reported by a sync pass.
//!
//! The result mirrors the stage writes performed during the pass: one change
//! entry per staged entity, plus a conflict entry for every stage write that
//! was flagged conflicted. Like the stage stores themselves, recording an
//! entry for an id replaces any prior entry for that id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use tandem_common::{Id, StageAction};

/// Outcome of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeResult {
    pub change: MergeChange,
    pub conflict: MergeConflict,
}

impl MergeResult {
    /// True when the pass found the private copy already current.
    pub fn is_empty(&self) -> bool {
        self.change.version_action.is_none()
            && self.change.elements.is_empty()
            && self.conflict.elements.is_empty()
    }
}

/// Everything staged by the pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeChange {
    /// Action staged for the version entity itself.
    pub version_action: Option<StageAction>,
    pub elements: Vec<ElementChange>,
}

impl MergeChange {
    pub fn record(&mut self, change: ElementChange) {
        match self
            .elements
            .iter_mut()
            .find(|existing| existing.element_id == change.element_id)
        {
            Some(existing) => *existing = change,
            None => self.elements.push(change),
        }
    }
}

/// One staged element change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementChange {
    pub element_id: Id,
    pub action: StageAction,
}

/// The subset of stage writes that need a conflict decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeConflict {
    pub elements: Vec<ElementConflict>,
}

impl MergeConflict {
    pub fn record(&mut self, conflict: ElementConflict) {
        match self
            .elements
            .iter_mut()
            .find(|existing| existing.element_id == conflict.element_id)
        {
            Some(existing) => *existing = conflict,
            None => self.elements.push(conflict),
        }
    }

    /// Drop the entry for an id whose latest stage write is conflict-free.
    pub fn clear(&mut self, element_id: &Id) {
        self.elements
            .retain(|existing| &existing.element_id != element_id);
    }
}

/// One conflicted stage write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementConflict {
    pub element_id: Id,
    pub action: StageAction,
    /// Ids bundled into this conflict decision at a tree anchor; empty for a
    /// plain content conflict.
    pub dependents: BTreeSet<Id>,
}
