//! Vertex data structures for terrain rendering.
//!
//! This module defines the interleaved vertex format produced by the mesh
//! builder and consumed by a [`SurfaceShader`](super::SurfaceShader).

use bytemuck::{Pod, Zeroable};

/// A vertex in the terrain rendering pipeline.
///
/// Every attribute is a four-component float vector so the stream can be
/// uploaded as a flat `vec4` array.
///
/// # Memory Layout
/// - Position: [f32; 4] (16 bytes), chunk-local, `w = 1`
/// - Normal: [f32; 4] (16 bytes), `w = 1`
/// - UV: [f32; 4] (16 bytes), `(u, v, animation flag, 1)`
///
/// Total size: 48 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position relative to the chunk origin
    pub position: [f32; 4],
    /// Outward normal of the face this vertex belongs to
    pub normal: [f32; 4],
    /// Atlas coordinates; `uv[2]` is `+1` for animated blocks and `-1` otherwise
    pub uv: [f32; 4],
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - Chunk-local position
    /// * `normal` - Face normal
    /// * `uv` - Atlas coordinates and animation flag
    ///
    /// # Returns
    /// A new `Vertex` with `w = 1` on every attribute
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 3]) -> Self {
        Vertex {
            position: [position[0], position[1], position[2], 1.0],
            normal: [normal[0], normal[1], normal[2], 1.0],
            uv: [uv[0], uv[1], uv[2], 1.0],
        }
    }

    /// Views a vertex slice as the raw interleaved `f32` stream a GPU buffer expects.
    pub fn as_floats(vertices: &[Vertex]) -> &[f32] {
        bytemuck::cast_slice(vertices)
    }
}
