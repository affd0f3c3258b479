//! Common types shared across the Tandem merge core.
//!
//! This crate provides the identifier, scoping and error vocabulary used by
//! every other crate in the workspace.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ElementContext, Id, StageAction};
