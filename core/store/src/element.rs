//! Element store surfaces.

use async_trait::async_trait;

use tandem_common::{ElementContext, Id, Result};

use crate::entity::{Element, ElementDescriptor, SynchronizationState};
use crate::stage::StagedEntity;

/// One element space. Public and private spaces are two instances of this
/// capability; the sync pass is parameterized over which side it walks.
#[async_trait]
pub trait ElementStore: Send + Sync {
    async fn get(&self, context: &ElementContext, element_id: &Id) -> Result<Option<Element>>;

    /// Cheap existence check that avoids loading the full element.
    async fn get_descriptor(
        &self,
        context: &ElementContext,
        element_id: &Id,
    ) -> Result<Option<ElementDescriptor>>;

    /// All element sync states recorded for the scope, in no particular order.
    async fn list_synchronization_states(
        &self,
        context: &ElementContext,
    ) -> Result<Vec<SynchronizationState>>;
}

/// Stage space for pending element changes.
#[async_trait]
pub trait ElementStageStore: Send + Sync {
    /// Write a stage entry, replacing any prior entry for the same element.
    async fn create(&self, context: &ElementContext, staged: StagedEntity<Element>) -> Result<()>;
}
