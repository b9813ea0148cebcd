//! Overlay render session.
//!
//! One session shadows one mesh object: registered as a redraw hook when the
//! user enables the overlay, it rebuilds and draws the object's batches every
//! redraw until a stop condition holds. Stop conditions are level-triggered
//! and checked at the top of every `prepare`, so a session winds down on the
//! first redraw after its object disappears, gets disabled, or loses its
//! last group.

use bytemuck::{Pod, Zeroable};
use uuid::Uuid;

use crate::batch::{OverlayBatch, build_overlay_batches};
use crate::context::{RenderContext, ViewportShading};
use crate::hooks::{HookAction, RedrawHook, RedrawHooks};
use crate::pipeline::PipelineConfig;
use crate::scene::Scene;
use crate::vertex::OverlayVertex;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Stopped,
    Running,
}

/// Outcome of evaluating the stop conditions for one redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTick {
    /// A stop condition holds; the session unregisters.
    Stop,
    /// The target object is drawable this redraw.
    Draw,
}

/// Checks the stop conditions for `target` against the current scene.
pub fn evaluate(scene: &Scene, target: Uuid) -> SessionTick {
    match scene.get_object(&target) {
        None => SessionTick::Stop,
        Some(object) if !object.display.enabled => SessionTick::Stop,
        Some(object) if object.groups.is_empty() => SessionTick::Stop,
        Some(_) => SessionTick::Draw,
    }
}

/// Hook name for the session targeting `target`.
pub fn session_name(target: Uuid) -> String {
    format!("overlay:{target}")
}

/// Per-object uniform: world transform plus an alpha factor multiplied onto
/// vertex alpha in the shader. Padded to WGSL uniform alignment.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct OverlayUniform {
    world: [[f32; 4]; 4],
    alpha: f32,
    _padding: [f32; 3],
}

impl OverlayUniform {
    fn new(world: glam::Mat4, alpha: f32) -> Self {
        Self {
            world: world.to_cols_array_2d(),
            alpha,
            _padding: [0.0; 3],
        }
    }
}

/// An uploaded batch ready to draw.
struct GpuBatch {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

fn upload_batch(ctx: &RenderContext, label: &str, batch: &OverlayBatch) -> Option<GpuBatch> {
    if batch.is_empty() {
        return None;
    }

    let vertex_buffer = ctx.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Vertex Buffer")),
        contents: bytemuck::cast_slice(&batch.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = ctx.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Index Buffer")),
        contents: bytemuck::cast_slice(&batch.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    Some(GpuBatch {
        vertex_buffer,
        index_buffer,
        index_count: batch.indices.len() as u32,
    })
}

/// Depth comparison for the fill pass. Draw-on-top bypasses the depth test
/// for fills only; line batches always depth-test at LessEqual.
fn fill_depth_compare(draw_on_top: bool) -> wgpu::CompareFunction {
    if draw_on_top {
        wgpu::CompareFunction::Always
    } else {
        wgpu::CompareFunction::LessEqual
    }
}

/// All pipeline variants a session can need, compiled once at start.
///
/// Depth comparison and cull mode are baked into a pipeline, so the
/// draw-on-top and culling display toggles select between prebuilt
/// variants instead of reconfiguring state mid-pass.
struct OverlayPipelines {
    fill: wgpu::RenderPipeline,
    fill_culled: wgpu::RenderPipeline,
    fill_front: wgpu::RenderPipeline,
    fill_front_culled: wgpu::RenderPipeline,
    lines: wgpu::RenderPipeline,
}

impl OverlayPipelines {
    fn new(ctx: &RenderContext) -> Self {
        let device = ctx.device();
        let shader = include_str!("shaders/overlay.wgsl");
        let layouts = [ctx.camera_bind_group_layout(), ctx.object_bind_group_layout()];

        let fill_config = |label, cull_mode, draw_on_top| {
            PipelineConfig::new(
                label,
                shader,
                ctx.surface_format(),
                ctx.depth_format(),
                &layouts,
            )
            .with_vertex_layouts(vec![OverlayVertex::layout()])
            .with_cull_mode(cull_mode)
            .with_depth_compare(fill_depth_compare(draw_on_top))
            .build(device)
        };

        // lines keep the LessEqual default: the depth override never
        // applies to the wire and pole passes
        let lines = PipelineConfig::new(
            "Overlay Lines",
            shader,
            ctx.surface_format(),
            ctx.depth_format(),
            &layouts,
        )
        .with_vertex_layouts(vec![OverlayVertex::layout()])
        .with_topology(wgpu::PrimitiveTopology::LineList)
        .build(device);

        let back = Some(wgpu::Face::Back);
        Self {
            fill: fill_config("Overlay Fill", None, false),
            fill_culled: fill_config("Overlay Fill Culled", back, false),
            fill_front: fill_config("Overlay Fill Front", None, true),
            fill_front_culled: fill_config("Overlay Fill Front Culled", back, true),
            lines,
        }
    }

    fn fill_for(&self, culled: bool, front: bool) -> &wgpu::RenderPipeline {
        match (culled, front) {
            (false, false) => &self.fill,
            (true, false) => &self.fill_culled,
            (false, true) => &self.fill_front,
            (true, true) => &self.fill_front_culled,
        }
    }
}

/// Redraw hook drawing the overlay for one mesh object.
pub struct OverlaySession {
    name: String,
    target: Uuid,
    state: SessionState,
    pipelines: OverlayPipelines,
    camera_bind_group: wgpu::BindGroup,
    fill_uniform_buffer: wgpu::Buffer,
    fill_bind_group: wgpu::BindGroup,
    line_uniform_buffer: wgpu::Buffer,
    line_bind_group: wgpu::BindGroup,
    fill: Option<GpuBatch>,
    wire: Option<GpuBatch>,
    poles: Option<GpuBatch>,
    draw_on_top: bool,
    culled: bool,
}

impl OverlaySession {
    pub fn new(ctx: &RenderContext, target: Uuid) -> Self {
        let pipelines = OverlayPipelines::new(ctx);

        // session-local bind group over the shared camera buffer
        let camera_bind_group = ctx.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Camera Bind Group"),
            layout: ctx.camera_bind_group_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ctx.camera_buffer().as_entire_binding(),
            }],
        });

        // fill and line passes want different alpha factors within one
        // redraw, hence two uniform buffers instead of one rewrite
        let (fill_uniform_buffer, fill_bind_group) =
            create_object_uniform(ctx, "Overlay Fill Uniform");
        let (line_uniform_buffer, line_bind_group) =
            create_object_uniform(ctx, "Overlay Line Uniform");

        Self {
            name: session_name(target),
            target,
            state: SessionState::Running,
            pipelines,
            camera_bind_group,
            fill_uniform_buffer,
            fill_bind_group,
            line_uniform_buffer,
            line_bind_group,
            fill: None,
            wire: None,
            poles: None,
            draw_on_top: false,
            culled: false,
        }
    }

    pub fn target(&self) -> Uuid {
        self.target
    }

    pub fn state(&self) -> SessionState {
        self.state
    }
}

impl RedrawHook for OverlaySession {
    fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&mut self, ctx: &RenderContext, scene: &Scene) -> HookAction {
        if evaluate(scene, self.target) == SessionTick::Stop {
            tracing::debug!("Overlay session stopping: {}", self.name);
            self.state = SessionState::Stopped;
            return HookAction::Unregister;
        }

        // evaluate() returned Draw, so the object exists
        let Some(object) = scene.get_object(&self.target) else {
            self.state = SessionState::Stopped;
            return HookAction::Unregister;
        };

        let batches = build_overlay_batches(object);
        self.fill = upload_batch(ctx, "Overlay Fill", &batches.fill);
        self.wire = batches
            .wire
            .as_ref()
            .and_then(|b| upload_batch(ctx, "Overlay Wire", b));
        self.poles = batches
            .poles
            .as_ref()
            .and_then(|b| upload_batch(ctx, "Overlay Poles", b));

        let display = &object.display;
        let fill_uniform = OverlayUniform::new(object.transform, display.overlay_alpha);
        let line_uniform = OverlayUniform::new(object.transform, 1.0);
        ctx.write_buffer(
            &self.fill_uniform_buffer,
            0,
            bytemuck::cast_slice(&[fill_uniform]),
        );
        ctx.write_buffer(
            &self.line_uniform_buffer,
            0,
            bytemuck::cast_slice(&[line_uniform]),
        );

        // wireframe-shaded viewports leave no depth worth testing against
        self.draw_on_top =
            display.draw_in_front || ctx.shading() == ViewportShading::Wireframe;
        self.culled = display.backface_culling || display.draw_in_front;

        self.state = SessionState::Running;
        HookAction::Continue
    }

    fn render(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.state != SessionState::Running {
            return;
        }

        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

        if let Some(fill) = &self.fill {
            render_pass.set_pipeline(self.pipelines.fill_for(self.culled, self.draw_on_top));
            render_pass.set_bind_group(1, &self.fill_bind_group, &[]);
            render_pass.set_vertex_buffer(0, fill.vertex_buffer.slice(..));
            render_pass.set_index_buffer(fill.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..fill.index_count, 0, 0..1);
        }

        // line batches depth-test normally even when the fill drew on top
        if self.wire.is_some() || self.poles.is_some() {
            render_pass.set_pipeline(&self.pipelines.lines);
            render_pass.set_bind_group(1, &self.line_bind_group, &[]);

            for batch in [&self.wire, &self.poles].into_iter().flatten() {
                render_pass.set_vertex_buffer(0, batch.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(batch.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..batch.index_count, 0, 0..1);
            }
        }
    }
}

fn create_object_uniform(ctx: &RenderContext, label: &str) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = ctx.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&[OverlayUniform::new(glam::Mat4::IDENTITY, 1.0)]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = ctx.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: ctx.object_bind_group_layout(),
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    (buffer, bind_group)
}

/// Starts an overlay session for `target` unless one is already registered.
///
/// Returns `true` when a new session was registered.
pub fn start_session(hooks: &mut RedrawHooks, ctx: &RenderContext, target: Uuid) -> bool {
    if hooks.contains(&session_name(target)) {
        return false;
    }
    let session = OverlaySession::new(ctx, target);
    tracing::info!("Starting overlay session: {}", session.name);
    hooks.register(Box::new(session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use retopo_core::{MeshObject, Rgb, TopoMesh};

    fn drawable_object() -> MeshObject {
        let mut mesh = TopoMesh::new();
        for i in 0..4 {
            mesh.add_vertex(Vec3::new((i % 2) as f32, (i / 2) as f32, 0.0), Vec3::Z);
        }
        mesh.add_face(&[0, 1, 3, 2]);

        let mut object = MeshObject::new("plane", mesh);
        object.add_group("Group", Rgb::WHITE);
        object
    }

    #[test]
    fn test_evaluate_missing_object_stops() {
        let scene = Scene::new();
        assert_eq!(evaluate(&scene, Uuid::new_v4()), SessionTick::Stop);
    }

    #[test]
    fn test_evaluate_disabled_overlay_stops() {
        let mut scene = Scene::new();
        let mut object = drawable_object();
        object.display.enabled = false;
        let id = scene.add_object(object);
        assert_eq!(evaluate(&scene, id), SessionTick::Stop);
    }

    #[test]
    fn test_evaluate_no_groups_stops() {
        let mut scene = Scene::new();
        let mut object = drawable_object();
        object.remove_group(0).unwrap();
        object.display.enabled = true;
        let id = scene.add_object(object);
        assert_eq!(evaluate(&scene, id), SessionTick::Stop);
    }

    #[test]
    fn test_evaluate_drawable_object_draws() {
        let mut scene = Scene::new();
        let id = scene.add_object(drawable_object());
        assert_eq!(evaluate(&scene, id), SessionTick::Draw);
    }

    #[test]
    fn test_stop_applies_on_redraw_after_disable() {
        let mut scene = Scene::new();
        let id = scene.add_object(drawable_object());
        assert_eq!(evaluate(&scene, id), SessionTick::Draw);

        scene.get_object_mut(&id).unwrap().display.enabled = false;
        assert_eq!(evaluate(&scene, id), SessionTick::Stop);
    }

    #[test]
    fn test_session_name_unique_per_target() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ne!(session_name(a), session_name(b));
        assert_eq!(session_name(a), format!("overlay:{a}"));
    }

    #[test]
    fn test_uniform_matches_wgsl_alignment() {
        assert_eq!(std::mem::size_of::<OverlayUniform>(), 80);
    }

    #[test]
    fn test_depth_override_applies_to_fill_only() {
        assert_eq!(fill_depth_compare(true), wgpu::CompareFunction::Always);
        assert_eq!(fill_depth_compare(false), wgpu::CompareFunction::LessEqual);
        // no draw-on-top variant exists for lines: OverlayPipelines builds a
        // single line pipeline on the LessEqual builder default
    }
}
