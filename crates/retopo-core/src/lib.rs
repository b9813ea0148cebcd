//! Core data model for face-group overlays.
//!
//! This crate is host-independent: it owns the group registry, the per-face
//! tag layer, mesh topology queries and the per-object display settings.
//! Rendering lives in `retopo-renderer`.
//!
//! # Architecture
//!
//! - [`group::GroupRegistry`] - Named, colored face groups per object
//! - [`mesh::TopoMesh`] - Polygon mesh with an attached face tag layer
//! - [`object::MeshObject`] - Per-object state bundle and user operations

pub mod color;
pub mod error;
pub mod group;
pub mod mesh;
pub mod object;

pub use color::Rgb;
pub use error::CoreError;
pub use group::{Group, GroupId, GroupRegistry, MoveDirection};
pub use mesh::{Face, LoopTriangle, MeshVertex, MirrorAxis, TopoMesh, UNGROUPED_TAG};
pub use object::{DisplaySettings, MeshObject, ObjectMode};
