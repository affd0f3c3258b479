//! Store surfaces for the Tandem merge core.
//!
//! Each space a sync pass touches (public, private and stage) is reached
//! through a small async trait, abstract over the actual persistence
//! mechanism. The in-memory implementations in [`memory`] back the test
//! suites and are suitable for embedding hosts that keep state in process.

pub mod element;
pub mod entity;
pub mod memory;
pub mod stage;
pub mod version;

pub use element::{ElementStageStore, ElementStore};
pub use entity::{Element, ElementDescriptor, SynchronizationState, Version};
pub use memory::{
    MemoryElementSpace, MemoryElementStage, MemoryVersionSpace, MemoryVersionStage,
};
pub use stage::StagedEntity;
pub use version::{VersionPrivateStore, VersionPublicStore, VersionStageStore};
