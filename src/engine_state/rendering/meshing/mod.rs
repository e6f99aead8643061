//! Mesh generation for terrain rendering.
//!
//! This module converts a chunk's block data into two interleaved vertex and
//! index streams, one for the opaque pass and one for the transparent pass.
//!
//! # Face Culling
//! - An opaque block emits a face wherever its neighbor is not opaque.
//! - A translucent block emits a face only where its neighbor is `Empty`, so
//!   the inside of a lake produces no geometry.
//! - Faces across a lateral chunk border look at the linked neighbor chunk; a
//!   missing neighbor counts as `Empty`.
//! - Faces pointing out of the top or bottom of the world are never emitted.
//!
//! # Performance Considerations
//! - Every visible face is its own quad; no merging is done
//! - Meshing reads blocks through relaxed atomics and takes no locks, so it
//!   runs entirely on a worker thread

mod face;

use std::sync::Arc;

pub use face::{Face, QUAD_INDICES};

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::{Chunk, MeshBuffers, CHUNK_HEIGHT, CHUNK_WIDTH},
};

/// Mesh data built on a worker, waiting to be uploaded on the main thread.
#[derive(Debug)]
pub struct ChunkMeshData {
    /// The chunk this mesh was built from
    pub chunk: Arc<Chunk>,
    /// Block revision the mesh reflects
    pub revision: u32,
    /// Opaque-pass geometry
    pub opaque: MeshBuffers,
    /// Transparent-pass geometry
    pub transparent: MeshBuffers,
}

impl ChunkMeshData {
    /// Moves the buffers into the chunk.
    ///
    /// # Returns
    /// `false` if the chunk already holds a mesh built from newer block data.
    pub fn upload(self) -> bool {
        self.chunk
            .upload_mesh(self.revision, self.opaque, self.transparent)
    }
}

/// Builds both passes for `chunk`.
///
/// # Arguments
/// * `chunk` - The chunk to mesh; its lateral neighbors are read through its links
///
/// # Returns
/// A `ChunkMeshData` carrying the chunk handle and its opaque and transparent buffers.
pub fn build_chunk_mesh(chunk: &Arc<Chunk>) -> ChunkMeshData {
    let revision = chunk.revision();
    let mut opaque = MeshBuffers::default();
    let mut transparent = MeshBuffers::default();

    for x in 0..CHUNK_WIDTH {
        for y in 0..CHUNK_HEIGHT {
            for z in 0..CHUNK_WIDTH {
                let block_type = chunk.get_block_at(x, y, z).unwrap_or(BlockType::Empty);
                if block_type == BlockType::Empty {
                    continue;
                }

                let opaque_block = block_type.is_opaque();
                for side in BlockSide::all() {
                    let Some(adjacent) = chunk.get_adjacent_block_at(side, x, y, z) else {
                        continue;
                    };

                    if opaque_block && !adjacent.is_opaque() {
                        Face::new(x, y, z, block_type, side).append_to(&mut opaque);
                    } else if !opaque_block && adjacent == BlockType::Empty {
                        Face::new(x, y, z, block_type, side).append_to(&mut transparent);
                    }
                }
            }
        }
    }

    ChunkMeshData {
        chunk: chunk.clone(),
        revision,
        opaque,
        transparent,
    }
}
