//! Face-group overlay renderer.
//!
//! WGPU-based rendering of colored face-group fills, group-restricted
//! wireframes and topology pole markers on top of mesh objects.
//!
//! # Architecture
//!
//! - [`batch`] - Derives CPU-side draw batches from an object each redraw
//! - [`session::OverlaySession`] - Running/stopped draw-loop lifecycle
//! - [`hooks::RedrawHooks`] - Registry of per-redraw callbacks
//! - [`context::RenderContext`] - GPU context abstraction
//! - [`scene::Scene`] - Mesh objects addressable by id
//!
//! # Example
//!
//! ```ignore
//! use retopo_renderer::{RedrawHooks, Scene, session};
//!
//! let mut hooks = RedrawHooks::new();
//! let mut scene = Scene::new();
//! let id = scene.add_object(object);
//!
//! // adding the first group enabled the object's overlay
//! session::start_session(&mut hooks, &ctx, id);
//!
//! // every viewport redraw:
//! hooks.prepare_all(&ctx, &scene);
//! hooks.render_all(&mut render_pass);
//! ```

pub mod batch;
pub mod camera;
pub mod constants;
pub mod context;
pub mod hooks;
pub mod pipeline;
pub mod scene;
pub mod session;
pub mod vertex;

pub use batch::{OverlayBatch, OverlayBatches, build_overlay_batches};
pub use camera::CameraUniform;
pub use context::{RenderContext, ViewportShading};
pub use hooks::{HookAction, RedrawHook, RedrawHooks};
pub use scene::Scene;
pub use session::{OverlaySession, SessionState, SessionTick, evaluate, start_session};
pub use vertex::OverlayVertex;
