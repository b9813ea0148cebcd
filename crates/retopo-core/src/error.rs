//! Core error types.

use thiserror::Error;

/// Errors produced by group and object operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A group index was out of range for the registry.
    #[error("group index {index} out of range (registry has {len} groups)")]
    InvalidIndex { index: usize, len: usize },

    /// Edit mode could not be entered (the mesh has no faces).
    #[error("cannot enter edit mode: mesh has no editable faces")]
    ModeSwitch,
}
