//! Version store surfaces.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tandem_common::{Id, Result};

use crate::entity::{SynchronizationState, Version};
use crate::stage::StagedEntity;

/// Read surface of the shared, published version space.
///
/// The public space is read-only from the merge core's perspective.
#[async_trait]
pub trait VersionPublicStore: Send + Sync {
    async fn get(&self, item_id: &Id, version_id: &Id) -> Result<Option<Version>>;

    async fn get_synchronization_state(
        &self,
        item_id: &Id,
        version_id: &Id,
    ) -> Result<Option<SynchronizationState>>;
}

/// A user's private version space.
///
/// Beyond the reads the sync pass needs, this exposes the mutations and the
/// publish-commit operations consumed by the downstream resolution step that
/// turns staged entries into new private-space state.
#[async_trait]
pub trait VersionPrivateStore: Send + Sync {
    async fn get(&self, item_id: &Id, version_id: &Id) -> Result<Option<Version>>;

    async fn get_synchronization_state(
        &self,
        item_id: &Id,
        version_id: &Id,
    ) -> Result<Option<SynchronizationState>>;

    /// Create a version in the private space; its sync state starts
    /// unpublished and dirty.
    async fn create(&self, item_id: &Id, version: Version) -> Result<()>;

    /// Record a content modification without touching publish state.
    async fn update_modification_time(
        &self,
        item_id: &Id,
        version_id: &Id,
        time: DateTime<Utc>,
    ) -> Result<()>;

    /// Overwrite the recorded publish time and dirty flag.
    async fn update_publish_state(
        &self,
        item_id: &Id,
        version_id: &Id,
        publish_time: Option<DateTime<Utc>>,
        dirty: bool,
    ) -> Result<()>;

    async fn delete(&self, item_id: &Id, version_id: &Id) -> Result<()>;

    /// Reset the sync state after the version was published from this space.
    async fn mark_as_published(
        &self,
        item_id: &Id,
        version_id: &Id,
        publish_time: DateTime<Utc>,
    ) -> Result<()>;

    /// Apply a staged CREATE: materialize the version with a clean sync state.
    async fn commit_staged_create(
        &self,
        item_id: &Id,
        version: Version,
        publish_time: DateTime<Utc>,
    ) -> Result<()>;

    /// Apply a staged UPDATE: advance the recorded publish time, clear dirty.
    async fn commit_staged_update(
        &self,
        item_id: &Id,
        version_id: &Id,
        publish_time: DateTime<Utc>,
    ) -> Result<()>;

    /// Discard a staged entry while still advancing the publish watermark.
    async fn commit_staged_ignore(
        &self,
        item_id: &Id,
        version_id: &Id,
        publish_time: DateTime<Utc>,
    ) -> Result<()>;
}

/// Stage space for pending version changes.
#[async_trait]
pub trait VersionStageStore: Send + Sync {
    /// Write a stage entry, replacing any prior entry for the same version.
    async fn create(&self, item_id: &Id, staged: StagedEntity<Version>) -> Result<()>;
}
