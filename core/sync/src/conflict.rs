//! Conflict classification for publicly-changed elements.
//!
//! Pure decision logic: given the private side's sync state and content, how
//! must a publicly-updated element be staged, and when does a whole staged
//! tree count as conflicted.

use std::collections::{HashMap, HashSet};

use tandem_common::Id;
use tandem_store::{Element, SynchronizationState};

/// How a publicly-updated element must be staged, given the private side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicUpdateOutcome {
    /// The element is already known to the private space: stage an update,
    /// conflicted when the content hashes diverged.
    Update { conflicted: bool },
    /// The element is unknown to the private space: stage its whole change
    /// tree, conflicted when any private state inside the tree is dirty.
    CreateTree,
    /// The element was deleted privately: stage its change tree as an
    /// unconditional conflict.
    RecreateDeleted,
}

/// Classify one publicly-updated element against the private space.
///
/// `private_element` only matters when the private state is dirty; callers
/// may pass `None` otherwise without changing the outcome.
pub fn classify_public_update(
    private_state: Option<&SynchronizationState>,
    private_element: Option<&Element>,
    public_element: &Element,
) -> PublicUpdateOutcome {
    match private_state {
        None => PublicUpdateOutcome::CreateTree,
        Some(state) if !state.dirty => PublicUpdateOutcome::Update { conflicted: false },
        Some(_) => match private_element {
            // A stale dirty flag over identical content is not a divergence.
            Some(private) => PublicUpdateOutcome::Update {
                conflicted: private.hash != public_element.hash,
            },
            None => PublicUpdateOutcome::RecreateDeleted,
        },
    }
}

/// True when any of the ids has a dirty sync state in `sync_state_by_id`.
pub fn contains_dirty(
    element_ids: &HashSet<Id>,
    sync_state_by_id: &HashMap<Id, SynchronizationState>,
) -> bool {
    element_ids
        .iter()
        .any(|id| sync_state_by_id.get(id).is_some_and(|state| state.dirty))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: &str, hash: &str) -> Element {
        Element::new(Id::from(id), Id::root_elements_parent(), hash)
    }

    fn state(id: &str, dirty: bool) -> SynchronizationState {
        SynchronizationState {
            id: Id::from(id),
            revision_id: Id::zero(),
            publish_time: None,
            dirty,
        }
    }

    #[test]
    fn test_unknown_on_private_creates_tree() {
        let outcome = classify_public_update(None, None, &element("e1", "h1"));
        assert_eq!(outcome, PublicUpdateOutcome::CreateTree);
    }

    #[test]
    fn test_clean_private_updates_without_conflict() {
        let outcome = classify_public_update(
            Some(&state("e1", false)),
            None,
            &element("e1", "h2"),
        );
        assert_eq!(outcome, PublicUpdateOutcome::Update { conflicted: false });
    }

    #[test]
    fn test_dirty_private_with_same_hash_is_clean() {
        let outcome = classify_public_update(
            Some(&state("e1", true)),
            Some(&element("e1", "h1")),
            &element("e1", "h1"),
        );
        assert_eq!(outcome, PublicUpdateOutcome::Update { conflicted: false });
    }

    #[test]
    fn test_dirty_private_with_different_hash_conflicts() {
        let outcome = classify_public_update(
            Some(&state("e1", true)),
            Some(&element("e1", "local")),
            &element("e1", "published"),
        );
        assert_eq!(outcome, PublicUpdateOutcome::Update { conflicted: true });
    }

    #[test]
    fn test_dirty_private_with_deleted_element_recreates() {
        let outcome = classify_public_update(
            Some(&state("e1", true)),
            None,
            &element("e1", "h1"),
        );
        assert_eq!(outcome, PublicUpdateOutcome::RecreateDeleted);
    }

    #[test]
    fn test_contains_dirty() {
        let states: HashMap<Id, SynchronizationState> = [
            (Id::from("clean"), state("clean", false)),
            (Id::from("dirty"), state("dirty", true)),
        ]
        .into_iter()
        .collect();

        let clean_only: HashSet<Id> = [Id::from("clean"), Id::from("unknown")].into_iter().collect();
        assert!(!contains_dirty(&clean_only, &states));

        let with_dirty: HashSet<Id> = [Id::from("clean"), Id::from("dirty")].into_iter().collect();
        assert!(contains_dirty(&with_dirty, &states));

        assert!(!contains_dirty(&HashSet::new(), &states));
    }
}
