//! Tandem sync engine.
//!
//! Synchronizes a user's private copy of a versioned item with the public
//! space: detects what was published since the copy's last sync, walks the
//! element tree to find the right granularity for each change, and stages
//! every change, flagged as a conflict where local edits would otherwise be
//! lost. The staged output is consumed by a later resolve/apply step.

mod tree;

pub mod conflict;
pub mod engine;
pub mod result;

pub use conflict::{classify_public_update, contains_dirty, PublicUpdateOutcome};
pub use engine::SyncEngine;
pub use result::{ElementChange, ElementConflict, MergeChange, MergeConflict, MergeResult};
