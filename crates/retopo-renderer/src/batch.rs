//! Overlay batch builder.
//!
//! Derives the three draw batches (group fills, group-restricted wireframe,
//! pole markers) from an object's current mesh, tags and groups. Batches are
//! rebuilt from scratch on every redraw: topology, tags and colors can all
//! change between redraws and no reliable dirty signal exists across
//! arbitrary edits.

use std::collections::HashSet;

use retopo_core::{MeshObject, ObjectMode, UNGROUPED_TAG};

use crate::constants::overlay;
use crate::vertex::OverlayVertex;

/// A GPU-submittable bundle of vertices and index topology for one draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayBatch {
    pub vertices: Vec<OverlayVertex>,
    pub indices: Vec<u32>,
}

impl OverlayBatch {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// The per-redraw output of the batch builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayBatches {
    /// Triangle fills, colored per triangle by group.
    pub fill: OverlayBatch,
    /// Line segments of grouped faces' edges; present when wireframe
    /// display is on.
    pub wire: Option<OverlayBatch>,
    /// Pole marker line segments; present when pole display is on.
    pub poles: Option<OverlayBatch>,
}

/// Builds all overlay batches for one object.
pub fn build_overlay_batches(object: &MeshObject) -> OverlayBatches {
    let mesh = &object.mesh;
    let display = &object.display;
    let in_edit_mode = object.mode == ObjectMode::Edit;

    let mut fill = OverlayBatch::default();
    let mut wire_indices: Vec<u32> = Vec::new();
    let mut grouped_verts: HashSet<u32> = HashSet::new();

    for triangle in mesh.loop_triangles() {
        // hidden faces must not obscure edit feedback
        if in_edit_mode && mesh.faces[triangle.polygon].hidden {
            continue;
        }

        let tag = mesh.face_tag(triangle.polygon);
        let mut color = overlay::TRANSPARENT_FILL;

        if tag != UNGROUPED_TAG {
            if let Some(group) = object.groups.find_by_tag(tag) {
                color = group.color.with_alpha(overlay::FILL_ALPHA);

                if display.show_wireframe {
                    for (a, b) in mesh.face_edge_keys(triangle.polygon) {
                        wire_indices.push(a);
                        wire_indices.push(b);
                    }
                    for v in triangle.vertices {
                        grouped_verts.insert(v);
                    }
                }
            }
        }

        // three fresh vertices per triangle: color varies per triangle,
        // not per mesh vertex
        let base = fill.vertices.len() as u32;
        for v in triangle.vertices {
            let position = mesh.vertices[v as usize].position;
            fill.vertices.push(OverlayVertex::new(position, color));
        }
        fill.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    let wire = display
        .show_wireframe
        .then(|| build_wire_batch(object, &grouped_verts, wire_indices));

    let poles = display.show_poles.then(|| build_pole_batch(object));

    OverlayBatches { fill, wire, poles }
}

/// One vertex per mesh vertex, offset along the normal against z-fighting;
/// vertices outside the grouped set are invisible filler so the edge index
/// list can reference mesh vertex indices directly.
fn build_wire_batch(
    object: &MeshObject,
    grouped_verts: &HashSet<u32>,
    indices: Vec<u32>,
) -> OverlayBatch {
    let alpha = object.display.overlay_alpha;
    let [r, g, b] = overlay::WIRE_COLOR;

    let vertices = object
        .mesh
        .vertices
        .iter()
        .enumerate()
        .map(|(i, vertex)| {
            let position = vertex.position + vertex.normal * overlay::WIRE_NORMAL_OFFSET;
            let a = if grouped_verts.contains(&(i as u32)) {
                alpha
            } else {
                0.0
            };
            OverlayVertex::new(position, [r, g, b, a])
        })
        .collect();

    OverlayBatch { vertices, indices }
}

/// A line segment per pole vertex, spiking along the normal with a length
/// proportional to the object's smallest bounding-box dimension.
fn build_pole_batch(object: &MeshObject) -> OverlayBatch {
    let mesh = &object.mesh;
    let length = mesh.min_dimension() * overlay::POLE_LENGTH_FACTOR * object.display.pole_size;
    let color = object.display.pole_color.with_alpha(1.0);

    let mut batch = OverlayBatch::default();
    for (vertex, valence) in mesh.vertices.iter().zip(mesh.vertex_valences()) {
        if valence <= overlay::POLE_VALENCE_LIMIT {
            continue;
        }
        let base = batch.vertices.len() as u32;
        batch
            .vertices
            .push(OverlayVertex::new(vertex.position, color));
        batch.vertices.push(OverlayVertex::new(
            vertex.position + vertex.normal * length,
            color,
        ));
        batch.indices.extend_from_slice(&[base, base + 1]);
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use retopo_core::{MeshObject, Rgb, TopoMesh};

    /// 2x1 grid of unit quads in the XY plane, z-up normals.
    fn test_object() -> MeshObject {
        let mut mesh = TopoMesh::new();
        for y in 0..2 {
            for x in 0..3 {
                mesh.add_vertex(Vec3::new(x as f32, y as f32, 0.0), Vec3::Z);
            }
        }
        mesh.add_face(&[0, 1, 4, 3]);
        mesh.add_face(&[1, 2, 5, 4]);
        MeshObject::new("test", mesh)
    }

    #[test]
    fn test_fill_three_vertices_per_triangle() {
        let obj = test_object();
        let batches = build_overlay_batches(&obj);
        // two quads fan into four triangles, no vertex sharing
        assert_eq!(batches.fill.vertices.len(), 12);
        assert_eq!(batches.fill.indices.len(), 12);
        assert_eq!(&batches.fill.indices[..6], &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_tagged_face_gets_group_color() {
        let mut obj = test_object();
        let id = obj.add_group("Group", Rgb::new(0.2, 0.4, 0.6));
        obj.mesh.set_face_tag(0, id.raw());

        let batches = build_overlay_batches(&obj);
        let expected = [0.2, 0.4, 0.6, 0.5];
        for v in &batches.fill.vertices[..6] {
            assert_eq!(v.color, expected);
        }
        // the untagged quad stays transparent
        for v in &batches.fill.vertices[6..] {
            assert_eq!(v.color, [1.0, 1.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn test_stale_tag_renders_transparent() {
        let mut obj = test_object();
        let id = obj.add_group("Group", Rgb::new(1.0, 0.0, 0.0));
        obj.mesh.set_face_tag(0, id.raw());
        obj.remove_group(0).unwrap();

        // removal cleared the tag; simulate external tooling leaving one
        let mut stale = test_object();
        stale.add_group("Keep", Rgb::WHITE);
        stale.mesh.set_face_tag(0, 42);

        for object in [&obj, &stale] {
            let batches = build_overlay_batches(object);
            assert!(
                batches
                    .fill
                    .vertices
                    .iter()
                    .all(|v| v.color == [1.0, 1.0, 1.0, 0.0])
            );
        }
    }

    #[test]
    fn test_hidden_faces_skipped_only_in_edit_mode() {
        let mut obj = test_object();
        obj.mesh.faces[0].hidden = true;

        let batches = build_overlay_batches(&obj);
        assert_eq!(batches.fill.vertices.len(), 12);

        obj.mode = retopo_core::ObjectMode::Edit;
        let batches = build_overlay_batches(&obj);
        assert_eq!(batches.fill.vertices.len(), 6);
    }

    #[test]
    fn test_wire_batch_restricted_to_grouped_faces() {
        let mut obj = test_object();
        let id = obj.add_group("Group", Rgb::WHITE);
        obj.mesh.set_face_tag(0, id.raw());
        obj.display.show_wireframe = true;
        obj.display.set_overlay_alpha(0.7);

        let batches = build_overlay_batches(&obj);
        let wire = batches.wire.expect("wireframe batch requested");

        // one entry per mesh vertex, offset along the +Z normal
        assert_eq!(wire.vertices.len(), obj.mesh.vertices.len());
        assert_eq!(wire.vertices[0].position[2], 0.0035);

        // quad 0 spans vertices 0,1,3,4; vertex 2 and 5 belong only to the
        // untagged quad and stay invisible
        assert_eq!(wire.vertices[0].color, [0.0, 0.0, 0.0, 0.7]);
        assert_eq!(wire.vertices[4].color, [0.0, 0.0, 0.0, 0.7]);
        assert_eq!(wire.vertices[2].color, [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(wire.vertices[5].color, [0.0, 0.0, 0.0, 0.0]);

        // edge keys collected once per triangle of the grouped quad
        assert_eq!(wire.indices.len(), 2 * 4 * 2);
    }

    #[test]
    fn test_no_wire_batch_when_disabled() {
        let obj = test_object();
        let batches = build_overlay_batches(&obj);
        assert!(batches.wire.is_none());
        assert!(batches.poles.is_none());
    }

    #[test]
    fn test_pole_spike_length() {
        // pyramid fan: apex joined to a 5-cycle gives the apex valence 5
        let mut mesh = TopoMesh::new();
        let apex = mesh.add_vertex(Vec3::ZERO, Vec3::Z);
        let ring: Vec<u32> = (0..5)
            .map(|i| {
                let angle = i as f32 / 5.0 * std::f32::consts::TAU;
                mesh.add_vertex(Vec3::new(2.0 * angle.cos(), 2.0 * angle.sin(), 2.0), Vec3::Z)
            })
            .collect();
        for i in 0..5 {
            mesh.add_face(&[apex, ring[i], ring[(i + 1) % 5]]);
        }

        let mut obj = MeshObject::new("pyramid", mesh);
        obj.display.show_poles = true;
        obj.display.pole_size = 1.0;
        obj.display.pole_color = Rgb::new(1.0, 0.0, 1.0);

        let smallest = obj.mesh.min_dimension();
        assert_eq!(smallest, 2.0);

        let batches = build_overlay_batches(&obj);
        let poles = batches.poles.expect("pole batch requested");

        // only the apex exceeds valence 4
        assert_eq!(poles.vertices.len(), 2);
        assert_eq!(poles.indices, vec![0, 1]);
        assert_eq!(poles.vertices[0].position, [0.0, 0.0, 0.0]);
        // spike length = 2.0 * 0.5 * 1.0 = 1.0 along the +Z normal
        assert_eq!(poles.vertices[1].position, [0.0, 0.0, 1.0]);
        assert_eq!(poles.vertices[0].color, [1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_batches_deterministic() {
        let mut obj = test_object();
        let id = obj.add_group("Group", Rgb::new(0.1, 0.9, 0.3));
        obj.mesh.set_face_tag(1, id.raw());
        obj.display.show_wireframe = true;
        obj.display.show_poles = true;

        let first = build_overlay_batches(&obj);
        let second = build_overlay_batches(&obj);
        assert_eq!(first, second);
    }
}
