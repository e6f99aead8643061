//! Rendering side of the terrain.
//!
//! This module turns block data into drawable buffers and defines the seam to
//! the graphics backend. The backend itself (shader compilation, uniform
//! upload, draw-call issuance) lives outside this crate; it plugs in by
//! implementing [`SurfaceShader`].

use cgmath::Matrix4;

pub mod meshing;
pub mod tasks;
pub mod vertex;

// Re-export commonly used types
pub use meshing::{build_chunk_mesh, ChunkMeshData};
pub use vertex::Vertex;

use super::voxels::chunk::MeshBuffers;

/// A shader program capable of drawing terrain buffers.
///
/// [`Terrain::draw`](crate::Terrain::draw) calls `set_model_matrix` with the
/// chunk's translation, then `draw_interleaved` with one pass's buffers.
pub trait SurfaceShader {
    /// Sets the model matrix for the next draw.
    fn set_model_matrix(&mut self, model: Matrix4<f32>);

    /// Draws an interleaved position/normal/uv stream as an indexed triangle list.
    fn draw_interleaved(&mut self, buffers: &MeshBuffers);
}
