//! Tree walking over storage-backed parent/child links.
//!
//! Elements are owned by their store; the walk only ever holds the element
//! it is currently looking at. The anchor search is an iterative loop and
//! the descendant enumeration uses an explicit work stack, so tree depth is
//! bounded by the heap rather than the call stack.

use async_trait::async_trait;
use std::collections::HashMap;

use tandem_common::{ElementContext, Error, Id, Result, StageAction};
use tandem_store::{Element, ElementStore, SynchronizationState};

/// Existence of an id on the side opposite to the one being walked.
#[async_trait]
pub(crate) trait ExistenceProbe: Send + Sync {
    async fn exists(&self, element_id: &Id) -> Result<bool>;
}

/// Probes an element space through its descriptor lookup.
pub(crate) struct DescriptorProbe<'a> {
    pub store: &'a dyn ElementStore,
    pub context: &'a ElementContext,
}

#[async_trait]
impl ExistenceProbe for DescriptorProbe<'_> {
    async fn exists(&self, element_id: &Id) -> Result<bool> {
        Ok(self
            .store
            .get_descriptor(self.context, element_id)
            .await?
            .is_some())
    }
}

/// Probes a sync-state index: "is this id still published over there".
pub(crate) struct SyncStateProbe<'a> {
    pub states: &'a HashMap<Id, SynchronizationState>,
}

#[async_trait]
impl ExistenceProbe for SyncStateProbe<'_> {
    async fn exists(&self, element_id: &Id) -> Result<bool> {
        Ok(self.states.contains_key(element_id))
    }
}

/// Walk from `start` toward the root and return the anchor of the change:
/// the topmost ancestor that is itself missing on the opposite side. Staging
/// the anchor plus everything below it reconstructs a structurally valid
/// subtree on the target side; a child cannot be staged in isolation while
/// its parent is absent over there.
///
/// The walk stops at the element whose id is the root-of-tree sentinel, or
/// whose parent already exists on the opposite side. A parent that cannot be
/// loaded mid-walk is a fatal consistency error.
pub(crate) async fn find_change_root(
    store: &dyn ElementStore,
    context: &ElementContext,
    opposite: &dyn ExistenceProbe,
    start: Element,
) -> Result<Element> {
    let mut element = start;
    loop {
        if element.id.is_root_elements_parent() || opposite.exists(&element.parent_id).await? {
            return Ok(element);
        }
        let parent_id = element.parent_id.clone();
        element = match store.get(context, &parent_id).await? {
            Some(parent) => parent,
            None => {
                return Err(Error::OrphanedElement {
                    element_id: element.id,
                    parent_id,
                })
            }
        };
    }
}

/// Enumerate every proper descendant of `root`, parents before children.
///
/// `action` is carried for error reporting only: a child listed on a parent
/// but absent from the store aborts the walk.
pub(crate) async fn collect_descendants(
    store: &dyn ElementStore,
    context: &ElementContext,
    root: &Element,
    action: StageAction,
) -> Result<Vec<Element>> {
    let mut pending: Vec<Id> = root.sub_element_ids.iter().cloned().collect();
    let mut descendants = Vec::new();
    while let Some(element_id) = pending.pop() {
        let element = store.get(context, &element_id).await?.ok_or_else(|| {
            Error::ElementToStageNotExist {
                item_id: context.item_id.clone(),
                version_id: context.version_id.clone(),
                element_id: element_id.clone(),
                action,
            }
        })?;
        pending.extend(element.sub_element_ids.iter().cloned());
        descendants.push(element);
    }
    Ok(descendants)
}
