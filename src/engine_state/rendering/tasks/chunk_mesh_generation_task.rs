//! Task for generating mesh data for chunks in a background thread.
//!
//! Meshing reads the chunk and its linked neighbors without locks and hands
//! the buffers back to the main thread, which owns uploading.

use std::sync::Arc;

use log::trace;

use crate::engine_state::{
    rendering::meshing::build_chunk_mesh, task_management::task::TaskResult,
    voxels::chunk::Chunk,
};

/// Builds the opaque and transparent meshes of `chunk`.
///
/// # Arguments
/// * `chunk` - A chunk whose blocks are populated
///
/// # Returns
/// `TaskResult::MeshReady` carrying the buffers to upload
pub fn generate_chunk_mesh(chunk: Arc<Chunk>) -> TaskResult {
    let mesh = build_chunk_mesh(&chunk);
    trace!(
        "Built mesh for chunk at {:?}: {} opaque, {} transparent indices",
        chunk.origin(),
        mesh.opaque.index_count(),
        mesh.transparent.index_count()
    );
    TaskResult::MeshReady(mesh)
}
