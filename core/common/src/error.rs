//! Error types for the Tandem merge core.

use thiserror::Error;

use crate::types::{Id, StageAction};

/// Top-level error type for merge-core operations.
///
/// Every variant is fatal for the sync pass it occurs in: the pass aborts on
/// the first error, and is safe to re-run once the underlying data is fixed,
/// since stage writes are upserts keyed by id.
#[derive(Debug, Error)]
pub enum Error {
    /// A pull was attempted for a version that was never published.
    #[error("item {item_id}, version {version_id}: non existing version cannot be synced")]
    NonExistingVersion { item_id: Id, version_id: Id },

    /// A sync state exists in the public space while its element does not.
    #[error(
        "item {item_id}, version {version_id}: sync state of element {element_id} \
         exists in public space while the element does not"
    )]
    SyncStateWithoutElement {
        item_id: Id,
        version_id: Id,
        element_id: Id,
    },

    /// An element's parent id did not resolve during a tree walk.
    #[error("element {element_id} exists while its parent element {parent_id} does not")]
    OrphanedElement { element_id: Id, parent_id: Id },

    /// A child listed on a staged parent could not be loaded.
    #[error(
        "item {item_id}, version {version_id}: element {element_id} which should be \
         staged with action {action} does not exist"
    )]
    ElementToStageNotExist {
        item_id: Id,
        version_id: Id,
        element_id: Id,
        action: StageAction,
    },

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
