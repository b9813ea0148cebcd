//! Camera uniform data.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// View-projection matrix uploaded once per viewport redraw.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn from_matrix(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::from_matrix(Mat4::IDENTITY)
    }
}
