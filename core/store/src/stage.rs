//! Stage envelope for pending changes computed by a sync pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use tandem_common::{Id, StageAction};

/// A pending change to one entity, awaiting a later resolve/apply step.
///
/// Created fresh on every sync pass and never mutated in place: writing a
/// stage entry for an id fully replaces any prior entry for that id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedEntity<T> {
    /// Id of the staged entity.
    pub id: Id,
    /// Full entity payload, when the action needs more than the id.
    pub entity: Option<T>,
    /// Publish time the entry was staged against.
    pub publish_time: Option<DateTime<Utc>>,
    pub action: StageAction,
    pub conflicted: bool,
    /// Ids whose state was bundled into this conflict decision; populated
    /// only on a conflicted tree anchor.
    pub conflict_dependents: BTreeSet<Id>,
}

impl<T> StagedEntity<T> {
    pub fn new(
        id: Id,
        entity: Option<T>,
        publish_time: Option<DateTime<Utc>>,
        action: StageAction,
        conflicted: bool,
    ) -> Self {
        Self {
            id,
            entity,
            publish_time,
            action,
            conflicted,
            conflict_dependents: BTreeSet::new(),
        }
    }

    pub fn with_conflict_dependents(mut self, dependents: BTreeSet<Id>) -> Self {
        self.conflict_dependents = dependents;
        self
    }
}
