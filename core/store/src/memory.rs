//! In-memory stores for testing and development.
//!
//! All data lives in process memory and is lost on drop. Each space is its
//! own instance: a public/private pair of [`MemoryVersionSpace`] and
//! [`MemoryElementSpace`] plus the two stage stores model a complete
//! deployment. Mutators on the concrete types play the role of the
//! surrounding service that edits and publishes content.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use tandem_common::{ElementContext, Error, Id, Result};

use crate::element::{ElementStageStore, ElementStore};
use crate::entity::{Element, ElementDescriptor, SynchronizationState, Version};
use crate::stage::StagedEntity;
use crate::version::{VersionPrivateStore, VersionPublicStore, VersionStageStore};

type VersionKey = (Id, Id);
type Scope = (Id, Id, Id);

fn scope_of(context: &ElementContext) -> Scope {
    (
        context.item_id.clone(),
        context.version_id.clone(),
        context.revision_id.clone(),
    )
}

/// Versions and their sync states for one space (public or private).
#[derive(Default)]
pub struct MemoryVersionSpace {
    versions: RwLock<HashMap<VersionKey, Version>>,
    sync_states: RwLock<HashMap<VersionKey, SynchronizationState>>,
}

impl MemoryVersionSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_version(&self, item_id: &Id, version: Version) {
        self.versions
            .write()
            .unwrap()
            .insert((item_id.clone(), version.id.clone()), version);
    }

    pub fn set_sync_state(&self, item_id: &Id, state: SynchronizationState) {
        self.sync_states
            .write()
            .unwrap()
            .insert((item_id.clone(), state.id.clone()), state);
    }
}

#[async_trait]
impl VersionPublicStore for MemoryVersionSpace {
    async fn get(&self, item_id: &Id, version_id: &Id) -> Result<Option<Version>> {
        Ok(self
            .versions
            .read()
            .unwrap()
            .get(&(item_id.clone(), version_id.clone()))
            .cloned())
    }

    async fn get_synchronization_state(
        &self,
        item_id: &Id,
        version_id: &Id,
    ) -> Result<Option<SynchronizationState>> {
        Ok(self
            .sync_states
            .read()
            .unwrap()
            .get(&(item_id.clone(), version_id.clone()))
            .cloned())
    }
}

#[async_trait]
impl VersionPrivateStore for MemoryVersionSpace {
    async fn get(&self, item_id: &Id, version_id: &Id) -> Result<Option<Version>> {
        Ok(self
            .versions
            .read()
            .unwrap()
            .get(&(item_id.clone(), version_id.clone()))
            .cloned())
    }

    async fn get_synchronization_state(
        &self,
        item_id: &Id,
        version_id: &Id,
    ) -> Result<Option<SynchronizationState>> {
        Ok(self
            .sync_states
            .read()
            .unwrap()
            .get(&(item_id.clone(), version_id.clone()))
            .cloned())
    }

    async fn create(&self, item_id: &Id, version: Version) -> Result<()> {
        let key = (item_id.clone(), version.id.clone());
        let state = SynchronizationState::unpublished(version.id.clone(), Id::zero());
        self.versions.write().unwrap().insert(key.clone(), version);
        self.sync_states.write().unwrap().insert(key, state);
        Ok(())
    }

    async fn update_modification_time(
        &self,
        item_id: &Id,
        version_id: &Id,
        time: DateTime<Utc>,
    ) -> Result<()> {
        let mut versions = self.versions.write().unwrap();
        let version = versions
            .get_mut(&(item_id.clone(), version_id.clone()))
            .ok_or_else(|| Error::NotFound(format!("version {version_id} of item {item_id}")))?;
        version.modification_time = Some(time);
        Ok(())
    }

    async fn update_publish_state(
        &self,
        item_id: &Id,
        version_id: &Id,
        publish_time: Option<DateTime<Utc>>,
        dirty: bool,
    ) -> Result<()> {
        let mut states = self.sync_states.write().unwrap();
        let state = states
            .get_mut(&(item_id.clone(), version_id.clone()))
            .ok_or_else(|| {
                Error::NotFound(format!("sync state of version {version_id} of item {item_id}"))
            })?;
        state.publish_time = publish_time;
        state.dirty = dirty;
        Ok(())
    }

    async fn delete(&self, item_id: &Id, version_id: &Id) -> Result<()> {
        let key = (item_id.clone(), version_id.clone());
        self.versions.write().unwrap().remove(&key);
        self.sync_states.write().unwrap().remove(&key);
        Ok(())
    }

    async fn mark_as_published(
        &self,
        item_id: &Id,
        version_id: &Id,
        publish_time: DateTime<Utc>,
    ) -> Result<()> {
        self.update_publish_state(item_id, version_id, Some(publish_time), false)
            .await
    }

    async fn commit_staged_create(
        &self,
        item_id: &Id,
        version: Version,
        publish_time: DateTime<Utc>,
    ) -> Result<()> {
        let key = (item_id.clone(), version.id.clone());
        let state =
            SynchronizationState::published(version.id.clone(), Id::zero(), publish_time, false);
        self.versions.write().unwrap().insert(key.clone(), version);
        self.sync_states.write().unwrap().insert(key, state);
        Ok(())
    }

    async fn commit_staged_update(
        &self,
        item_id: &Id,
        version_id: &Id,
        publish_time: DateTime<Utc>,
    ) -> Result<()> {
        self.update_publish_state(item_id, version_id, Some(publish_time), false)
            .await
    }

    async fn commit_staged_ignore(
        &self,
        item_id: &Id,
        version_id: &Id,
        publish_time: DateTime<Utc>,
    ) -> Result<()> {
        self.update_publish_state(item_id, version_id, Some(publish_time), false)
            .await
    }
}

/// Elements and their sync states for one space, keyed by scope.
#[derive(Default)]
pub struct MemoryElementSpace {
    elements: RwLock<HashMap<Scope, HashMap<Id, Element>>>,
    sync_states: RwLock<HashMap<Scope, HashMap<Id, SynchronizationState>>>,
}

impl MemoryElementSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_element(&self, context: &ElementContext, element: Element) {
        self.elements
            .write()
            .unwrap()
            .entry(scope_of(context))
            .or_default()
            .insert(element.id.clone(), element);
    }

    pub fn remove_element(&self, context: &ElementContext, element_id: &Id) -> Option<Element> {
        self.elements
            .write()
            .unwrap()
            .get_mut(&scope_of(context))
            .and_then(|elements| elements.remove(element_id))
    }

    pub fn set_sync_state(&self, context: &ElementContext, state: SynchronizationState) {
        self.sync_states
            .write()
            .unwrap()
            .entry(scope_of(context))
            .or_default()
            .insert(state.id.clone(), state);
    }
}

#[async_trait]
impl ElementStore for MemoryElementSpace {
    async fn get(&self, context: &ElementContext, element_id: &Id) -> Result<Option<Element>> {
        Ok(self
            .elements
            .read()
            .unwrap()
            .get(&scope_of(context))
            .and_then(|elements| elements.get(element_id))
            .cloned())
    }

    async fn get_descriptor(
        &self,
        context: &ElementContext,
        element_id: &Id,
    ) -> Result<Option<ElementDescriptor>> {
        Ok(self
            .elements
            .read()
            .unwrap()
            .get(&scope_of(context))
            .and_then(|elements| elements.get(element_id))
            .map(Element::descriptor))
    }

    async fn list_synchronization_states(
        &self,
        context: &ElementContext,
    ) -> Result<Vec<SynchronizationState>> {
        Ok(self
            .sync_states
            .read()
            .unwrap()
            .get(&scope_of(context))
            .map(|states| states.values().cloned().collect())
            .unwrap_or_default())
    }
}

/// Stage space for pending version changes.
#[derive(Default)]
pub struct MemoryVersionStage {
    entries: RwLock<HashMap<VersionKey, StagedEntity<Version>>>,
}

impl MemoryVersionStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, item_id: &Id, version_id: &Id) -> Option<StagedEntity<Version>> {
        self.entries
            .read()
            .unwrap()
            .get(&(item_id.clone(), version_id.clone()))
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

#[async_trait]
impl VersionStageStore for MemoryVersionStage {
    async fn create(&self, item_id: &Id, staged: StagedEntity<Version>) -> Result<()> {
        self.entries
            .write()
            .unwrap()
            .insert((item_id.clone(), staged.id.clone()), staged);
        Ok(())
    }
}

/// Stage space for pending element changes.
#[derive(Default)]
pub struct MemoryElementStage {
    entries: RwLock<HashMap<Scope, HashMap<Id, StagedEntity<Element>>>>,
}

impl MemoryElementStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, context: &ElementContext, element_id: &Id) -> Option<StagedEntity<Element>> {
        self.entries
            .read()
            .unwrap()
            .get(&scope_of(context))
            .and_then(|entries| entries.get(element_id))
            .cloned()
    }

    pub fn len(&self, context: &ElementContext) -> usize {
        self.entries
            .read()
            .unwrap()
            .get(&scope_of(context))
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, context: &ElementContext) -> bool {
        self.len(context) == 0
    }
}

#[async_trait]
impl ElementStageStore for MemoryElementStage {
    async fn create(&self, context: &ElementContext, staged: StagedEntity<Element>) -> Result<()> {
        self.entries
            .write()
            .unwrap()
            .entry(scope_of(context))
            .or_default()
            .insert(staged.id.clone(), staged);
        Ok(())
    }
}
