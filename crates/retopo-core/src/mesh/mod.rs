//! Polygon mesh with face flags and derived topology queries.
//!
//! The mesh stores polygon loops rather than triangles so that overlay
//! coloring and wireframes can operate on the faces the user actually
//! modelled; triangulation is derived on demand.

mod tags;

pub use tags::{FaceTagLayer, UNGROUPED_TAG};

use std::collections::HashSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A mesh vertex with position and normal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

/// A polygon face: an ordered loop of vertex indices plus edit-state flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    pub vertices: Vec<u32>,
    pub hidden: bool,
    pub selected: bool,
}

impl Face {
    pub fn new(vertices: Vec<u32>) -> Self {
        Self {
            vertices,
            hidden: false,
            selected: false,
        }
    }
}

/// One triangle of a face's fan triangulation, keeping a reference to the
/// parent polygon for attribute lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTriangle {
    pub polygon: usize,
    pub vertices: [u32; 3],
}

/// Mirror plane axis for symmetric selection extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MirrorAxis {
    X,
    Y,
    Z,
}

impl MirrorAxis {
    /// Mirrors a point across the plane through the origin.
    pub fn mirror(&self, p: Vec3) -> Vec3 {
        match self {
            MirrorAxis::X => Vec3::new(-p.x, p.y, p.z),
            MirrorAxis::Y => Vec3::new(p.x, -p.y, p.z),
            MirrorAxis::Z => Vec3::new(p.x, p.y, -p.z),
        }
    }
}

/// A polygon mesh with an optional face tag layer attached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopoMesh {
    pub vertices: Vec<MeshVertex>,
    pub faces: Vec<Face>,
    pub(crate) tags: Option<FaceTagLayer>,
}

impl TopoMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a vertex and returns its index.
    pub fn add_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        self.vertices.push(MeshVertex { position, normal });
        (self.vertices.len() - 1) as u32
    }

    /// Appends a polygon face and returns its index.
    ///
    /// The face starts untagged when a tag layer is attached.
    pub fn add_face(&mut self, vertices: &[u32]) -> usize {
        debug_assert!(vertices.len() >= 3, "a face needs at least 3 vertices");
        self.faces.push(Face::new(vertices.to_vec()));
        if let Some(tags) = &mut self.tags {
            tags.resize(self.faces.len());
        }
        self.faces.len() - 1
    }

    /// Fan-triangulates every face, in face then loop order.
    pub fn loop_triangles(&self) -> Vec<LoopTriangle> {
        let mut triangles = Vec::new();
        for (polygon, face) in self.faces.iter().enumerate() {
            let loop_verts = &face.vertices;
            for i in 1..loop_verts.len().saturating_sub(1) {
                triangles.push(LoopTriangle {
                    polygon,
                    vertices: [loop_verts[0], loop_verts[i], loop_verts[i + 1]],
                });
            }
        }
        triangles
    }

    /// The edges of one face as normalized `(low, high)` vertex-index pairs.
    pub fn face_edge_keys(&self, face: usize) -> Vec<(u32, u32)> {
        let loop_verts = &self.faces[face].vertices;
        let n = loop_verts.len();
        (0..n)
            .map(|i| {
                let a = loop_verts[i];
                let b = loop_verts[(i + 1) % n];
                (a.min(b), a.max(b))
            })
            .collect()
    }

    /// Per-vertex incident-edge counts, with edges derived from face loops.
    pub fn vertex_valences(&self) -> Vec<u32> {
        let mut edges = HashSet::new();
        for face in 0..self.faces.len() {
            for key in self.face_edge_keys(face) {
                edges.insert(key);
            }
        }

        let mut valences = vec![0u32; self.vertices.len()];
        for (a, b) in edges {
            valences[a as usize] += 1;
            valences[b as usize] += 1;
        }
        valences
    }

    /// Axis-aligned bounding box size; zero for an empty mesh.
    pub fn dimensions(&self) -> Vec3 {
        let mut iter = self.vertices.iter().map(|v| v.position);
        let Some(first) = iter.next() else {
            return Vec3::ZERO;
        };

        let mut min = first;
        let mut max = first;
        for p in iter {
            min = min.min(p);
            max = max.max(p);
        }
        max - min
    }

    /// The smallest bounding-box dimension, used to scale pole markers.
    pub fn min_dimension(&self) -> f32 {
        self.dimensions().min_element()
    }

    /// Average of a face's loop vertex positions.
    pub fn face_center(&self, face: usize) -> Vec3 {
        let loop_verts = &self.faces[face].vertices;
        let sum: Vec3 = loop_verts
            .iter()
            .map(|&v| self.vertices[v as usize].position)
            .sum();
        sum / loop_verts.len() as f32
    }
}

#[cfg(test)]
pub(crate) fn quad_grid(cols: u32, rows: u32) -> TopoMesh {
    // flat grid in the XY plane, +Z normals
    let mut mesh = TopoMesh::new();
    for y in 0..=rows {
        for x in 0..=cols {
            mesh.add_vertex(Vec3::new(x as f32, y as f32, 0.0), Vec3::Z);
        }
    }
    for y in 0..rows {
        for x in 0..cols {
            let base = y * (cols + 1) + x;
            mesh.add_face(&[base, base + 1, base + cols + 2, base + cols + 1]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_triangles_fan_order() {
        let mut mesh = TopoMesh::new();
        for i in 0..4 {
            mesh.add_vertex(Vec3::new(i as f32, 0.0, 0.0), Vec3::Z);
        }
        mesh.add_face(&[0, 1, 2, 3]);

        let tris = mesh.loop_triangles();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[0].vertices, [0, 1, 2]);
        assert_eq!(tris[1].vertices, [0, 2, 3]);
        assert_eq!(tris[0].polygon, 0);
    }

    #[test]
    fn test_face_edge_keys_normalized() {
        let mut mesh = TopoMesh::new();
        for i in 0..3 {
            mesh.add_vertex(Vec3::new(i as f32, 0.0, 0.0), Vec3::Z);
        }
        mesh.add_face(&[2, 0, 1]);
        assert_eq!(mesh.face_edge_keys(0), vec![(0, 2), (0, 1), (1, 2)]);
    }

    #[test]
    fn test_vertex_valences_shared_edges_counted_once() {
        // 2x2 quad grid: center vertex touches 4 edges
        let mesh = quad_grid(2, 2);
        let valences = mesh.vertex_valences();
        assert_eq!(valences[4], 4);
        // corner vertices touch 2 edges
        assert_eq!(valences[0], 2);
    }

    #[test]
    fn test_dimensions() {
        let mut mesh = TopoMesh::new();
        mesh.add_vertex(Vec3::new(-1.0, 0.0, 2.0), Vec3::Z);
        mesh.add_vertex(Vec3::new(3.0, 2.0, 4.0), Vec3::Z);
        assert_eq!(mesh.dimensions(), Vec3::new(4.0, 2.0, 2.0));
        assert_eq!(mesh.min_dimension(), 2.0);
        assert_eq!(TopoMesh::new().dimensions(), Vec3::ZERO);
    }
}
