//! # Chunk Module
//!
//! This module provides the `Chunk` struct, a 16 x 256 x 16 column of blocks,
//! together with its lifecycle state, its links to lateral neighbors and the
//! mesh buffers uploaded for it.
//!
//! ## Memory Layout
//!
//! Blocks are stored densely, one byte per block, at index
//! `x + 16 * y + 16 * 256 * z`. Each byte is an `AtomicU8` so a worker can fill
//! a chunk while other threads read it without any per-chunk lock. Relaxed
//! ordering is enough for the blocks themselves; the hand-off between the
//! generation worker, the main thread and the meshing worker goes through the
//! completion-list mutexes, which publish the writes.
//!
//! ## Lifecycle
//!
//! ```text
//! AllocatedEmpty -> BlockDataPopulated -> MeshBuilding -> MeshReady
//!                          ^                                 |
//!                          +------------ eviction -----------+
//! ```
//!
//! ## Neighbors
//!
//! Each chunk knows its four lateral neighbors through `Weak` links that are
//! set once when the neighbor is instantiated and never cleared. The terrain
//! store owns every chunk; a link is a relation, not ownership.

use std::sync::{
    atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering},
    Arc, OnceLock, Weak,
};

use cgmath::Point2;
use num_derive::FromPrimitive;
use parking_lot::{Mutex, MutexGuard};

use super::block::{block_side::BlockSide, block_type::BlockType};
use crate::{
    engine_state::rendering::vertex::Vertex,
    error::{Result, TerrainError},
};

/// Width and depth of a chunk in blocks.
pub const CHUNK_WIDTH: i32 = 16;
/// Height of a chunk (and of the world) in blocks.
pub const CHUNK_HEIGHT: i32 = 256;
/// Number of blocks in a horizontal slice of a chunk.
pub const CHUNK_PLANE_SIZE: usize = (CHUNK_WIDTH * CHUNK_WIDTH) as usize;
/// Total number of blocks in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_PLANE_SIZE * CHUNK_HEIGHT as usize;

/// Where a chunk is in its generate-then-mesh pipeline.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum ChunkState {
    /// Registered in the store, every block still `Empty`.
    AllocatedEmpty = 0,
    /// Blocks generated; no mesh, or the mesh was evicted.
    BlockDataPopulated,
    /// A mesh build has been queued or is running.
    MeshBuilding,
    /// Mesh buffers are uploaded and drawable.
    MeshReady,
}

/// A vertex and index stream ready to be drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    /// Interleaved vertices
    pub vertices: Vec<Vertex>,
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Number of indices, which is what a draw call consumes.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// True when the stream contains no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Companion drawable holding a chunk's transparent-pass buffers.
///
/// Kept separate from the opaque buffers so the two passes can be drawn in
/// sequence over all chunks.
#[derive(Debug, Default)]
pub struct TransparentChunk {
    buffers: Mutex<Option<MeshBuffers>>,
}

impl TransparentChunk {
    /// Locks and returns the transparent buffers, `None` when nothing is uploaded.
    pub fn buffers(&self) -> MutexGuard<'_, Option<MeshBuffers>> {
        self.buffers.lock()
    }
}

/// A 16 x 256 x 16 column of blocks at a 16-aligned world origin.
pub struct Chunk {
    origin: Point2<i32>,
    blocks: Box<[AtomicU8]>,
    neighbors: [OnceLock<Weak<Chunk>>; 4],
    state: AtomicU8,
    /// Bumped on every block write; lets the upload step reject stale meshes.
    revision: AtomicU32,
    uploaded_revision: AtomicU32,
    /// Set when a neighbor's blocks landed while this chunk's mesh was in flight.
    remesh_pending: AtomicBool,
    opaque: Mutex<Option<MeshBuffers>>,
    /// Buffers for the transparent pass
    pub transparent: TransparentChunk,
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("origin", &self.origin)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Chunk {
    /// Creates a chunk with every block `Empty` and no neighbors.
    ///
    /// # Arguments
    /// * `x` - World x of the chunk origin; must be a multiple of 16
    /// * `z` - World z of the chunk origin; must be a multiple of 16
    pub fn new(x: i32, z: i32) -> Self {
        debug_assert!(x.rem_euclid(CHUNK_WIDTH) == 0 && z.rem_euclid(CHUNK_WIDTH) == 0);

        let blocks = (0..CHUNK_VOLUME)
            .map(|_| AtomicU8::new(BlockType::Empty.as_int()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Chunk {
            origin: Point2::new(x, z),
            blocks,
            neighbors: Default::default(),
            state: AtomicU8::new(ChunkState::AllocatedEmpty as u8),
            revision: AtomicU32::new(0),
            uploaded_revision: AtomicU32::new(0),
            remesh_pending: AtomicBool::new(false),
            opaque: Mutex::new(None),
            transparent: TransparentChunk::default(),
        }
    }

    /// World-space `(x, z)` of the chunk's minimum corner.
    #[inline]
    pub fn origin(&self) -> Point2<i32> {
        self.origin
    }

    #[inline]
    fn index(x: i32, y: i32, z: i32) -> Option<usize> {
        if (0..CHUNK_WIDTH).contains(&x)
            && (0..CHUNK_HEIGHT).contains(&y)
            && (0..CHUNK_WIDTH).contains(&z)
        {
            Some((x + CHUNK_WIDTH * y + CHUNK_WIDTH * CHUNK_HEIGHT * z) as usize)
        } else {
            None
        }
    }

    #[inline]
    fn load(&self, index: usize) -> BlockType {
        BlockType::get_block_type_from_int(self.blocks[index].load(Ordering::Relaxed))
    }

    /// Reads a block by chunk-local coordinates.
    ///
    /// # Returns
    /// The block kind, or `LocalOutOfRange` if any coordinate is outside the grid.
    pub fn get_block_at(&self, x: i32, y: i32, z: i32) -> Result<BlockType> {
        Self::index(x, y, z)
            .map(|index| self.load(index))
            .ok_or(TerrainError::LocalOutOfRange { x, y, z })
    }

    /// Writes a block by chunk-local coordinates.
    ///
    /// # Returns
    /// `LocalOutOfRange` if any coordinate is outside the grid.
    pub fn set_block_at(&self, x: i32, y: i32, z: i32, block_type: BlockType) -> Result<()> {
        let index = Self::index(x, y, z).ok_or(TerrainError::LocalOutOfRange { x, y, z })?;
        self.blocks[index].store(block_type.as_int(), Ordering::Relaxed);
        self.revision.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Reads the block next to `(x, y, z)` on the given side.
    ///
    /// Crossing a lateral border follows the neighbor link; a missing neighbor
    /// reads as `Empty`. Stepping above or below the world volume returns `None`
    /// rather than `Empty`, so the mesher emits no face there: the bottom of
    /// the y = 0 layer is never drawn, and a chunk boxed in by opaque neighbors
    /// meshes to nothing. World-level reads outside `[0, 256)` still return `Empty`.
    ///
    /// # Arguments
    /// * `side` - Which neighbor to read
    /// * `x`, `y`, `z` - Chunk-local coordinates of the source block
    pub fn get_adjacent_block_at(&self, side: BlockSide, x: i32, y: i32, z: i32) -> Option<BlockType> {
        let offset = side.offset();
        let (nx, ny, nz) = (x + offset.x, y + offset.y, z + offset.z);

        if !(0..CHUNK_HEIGHT).contains(&ny) {
            return None;
        }

        if let Some(index) = Self::index(nx, ny, nz) {
            return Some(self.load(index));
        }

        let block = self
            .neighbor(side)
            .and_then(|neighbor| {
                neighbor
                    .get_block_at(nx.rem_euclid(CHUNK_WIDTH), ny, nz.rem_euclid(CHUNK_WIDTH))
                    .ok()
            })
            .unwrap_or(BlockType::Empty);
        Some(block)
    }

    /// Links `self` and `other` as neighbors in both directions.
    ///
    /// `side` is the side of `self` on which `other` lies. Vertical sides are
    /// ignored. Links are set once; relinking an already-linked slot is a no-op.
    pub fn link_neighbor(self: &Arc<Self>, other: &Arc<Chunk>, side: BlockSide) {
        let (Some(slot), Some(opposite_slot)) = (side.lateral_slot(), side.opposite().lateral_slot())
        else {
            return;
        };
        let _ = self.neighbors[slot].set(Arc::downgrade(other));
        let _ = other.neighbors[opposite_slot].set(Arc::downgrade(self));
    }

    /// The neighbor on a lateral side, if it has been linked and is still alive.
    pub fn neighbor(&self, side: BlockSide) -> Option<Arc<Chunk>> {
        side.lateral_slot()
            .and_then(|slot| self.neighbors[slot].get())
            .and_then(Weak::upgrade)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChunkState {
        num::FromPrimitive::from_u8(self.state.load(Ordering::Acquire))
            .unwrap_or(ChunkState::AllocatedEmpty)
    }

    /// Unconditionally moves the chunk to `state`.
    pub fn set_state(&self, state: ChunkState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Moves the chunk from `from` to `to` if it is currently in `from`.
    ///
    /// # Returns
    /// `true` if this call performed the transition.
    pub fn transition(&self, from: ChunkState, to: ChunkState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Block revision counter; compare with the value a mesh was built from.
    pub fn revision(&self) -> u32 {
        self.revision.load(Ordering::Acquire)
    }

    /// Marks the mesh currently being built as stale, so the upload step
    /// queues another build once it lands.
    pub fn request_remesh(&self) {
        self.remesh_pending.store(true, Ordering::Release);
    }

    /// Clears and returns the flag set by [`Chunk::request_remesh`].
    pub fn take_remesh_request(&self) -> bool {
        self.remesh_pending.swap(false, Ordering::AcqRel)
    }

    /// True once buffers are uploaded for this chunk.
    pub fn has_mesh_data(&self) -> bool {
        self.opaque.lock().is_some()
    }

    /// Locks and returns the opaque-pass buffers, `None` when nothing is uploaded.
    pub fn opaque_buffers(&self) -> MutexGuard<'_, Option<MeshBuffers>> {
        self.opaque.lock()
    }

    /// Installs freshly built buffers and marks the chunk `MeshReady`.
    ///
    /// A mesh built from an older revision than the one already uploaded is dropped.
    ///
    /// # Returns
    /// `true` if the buffers were installed.
    pub fn upload_mesh(&self, revision: u32, opaque: MeshBuffers, transparent: MeshBuffers) -> bool {
        let mut opaque_slot = self.opaque.lock();
        if opaque_slot.is_some() && revision < self.uploaded_revision.load(Ordering::Acquire) {
            return false;
        }
        *opaque_slot = Some(opaque);
        *self.transparent.buffers() = Some(transparent);
        self.uploaded_revision.store(revision, Ordering::Release);
        self.set_state(ChunkState::MeshReady);
        true
    }

    /// Drops both passes' buffers. Block data is kept.
    ///
    /// A `MeshReady` chunk goes back to `BlockDataPopulated`; a chunk whose mesh
    /// is still being built keeps its state.
    pub fn release_mesh(&self) {
        *self.opaque.lock() = None;
        *self.transparent.buffers() = None;
        self.transition(ChunkState::MeshReady, ChunkState::BlockDataPopulated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_is_empty() {
        let chunk = Chunk::new(-16, 32);
        assert_eq!(chunk.origin(), Point2::new(-16, 32));
        assert_eq!(chunk.state(), ChunkState::AllocatedEmpty);
        assert_eq!(chunk.get_block_at(0, 0, 0), Ok(BlockType::Empty));
        assert_eq!(chunk.get_block_at(15, 255, 15), Ok(BlockType::Empty));
        assert!(!chunk.has_mesh_data());
    }

    #[test]
    fn local_get_set_round_trip() {
        let chunk = Chunk::new(0, 0);
        chunk.set_block_at(3, 200, 9, BlockType::Leaf).unwrap();
        assert_eq!(chunk.get_block_at(3, 200, 9), Ok(BlockType::Leaf));
        assert_eq!(chunk.get_block_at(9, 200, 3), Ok(BlockType::Empty));
    }

    #[test]
    fn local_accessors_reject_out_of_range() {
        let chunk = Chunk::new(0, 0);
        assert_eq!(
            chunk.get_block_at(16, 0, 0),
            Err(TerrainError::LocalOutOfRange { x: 16, y: 0, z: 0 })
        );
        assert!(chunk.set_block_at(0, 256, 0, BlockType::Stone).is_err());
        assert!(chunk.set_block_at(0, 0, -1, BlockType::Stone).is_err());
    }

    #[test]
    fn adjacent_lookup_follows_links() {
        let west = Arc::new(Chunk::new(0, 0));
        let east = Arc::new(Chunk::new(16, 0));
        west.link_neighbor(&east, BlockSide::XPos);

        east.set_block_at(0, 10, 4, BlockType::Stone).unwrap();
        west.set_block_at(15, 10, 4, BlockType::Dirt).unwrap();

        assert_eq!(
            west.get_adjacent_block_at(BlockSide::XPos, 15, 10, 4),
            Some(BlockType::Stone)
        );
        assert_eq!(
            east.get_adjacent_block_at(BlockSide::XNeg, 0, 10, 4),
            Some(BlockType::Dirt)
        );
        assert_eq!(
            west.get_adjacent_block_at(BlockSide::ZNeg, 15, 10, 0),
            Some(BlockType::Empty)
        );
    }

    #[test]
    fn remesh_requests_are_taken_once() {
        let chunk = Chunk::new(0, 0);
        assert!(!chunk.take_remesh_request());
        chunk.request_remesh();
        chunk.request_remesh();
        assert!(chunk.take_remesh_request());
        assert!(!chunk.take_remesh_request());
    }

    #[test]
    fn adjacent_lookup_stops_at_the_vertical_bounds() {
        let chunk = Chunk::new(0, 0);
        assert_eq!(chunk.get_adjacent_block_at(BlockSide::YNeg, 0, 0, 0), None);
        assert_eq!(chunk.get_adjacent_block_at(BlockSide::YPos, 0, 255, 0), None);
        assert_eq!(
            chunk.get_adjacent_block_at(BlockSide::YPos, 0, 254, 0),
            Some(BlockType::Empty)
        );
    }

    #[test]
    fn links_are_bidirectional() {
        let a = Arc::new(Chunk::new(0, 0));
        let b = Arc::new(Chunk::new(0, 16));
        a.link_neighbor(&b, BlockSide::ZPos);

        assert!(Arc::ptr_eq(&a.neighbor(BlockSide::ZPos).unwrap(), &b));
        assert!(Arc::ptr_eq(&b.neighbor(BlockSide::ZNeg).unwrap(), &a));
        assert!(a.neighbor(BlockSide::XPos).is_none());
        assert!(a.neighbor(BlockSide::YPos).is_none());
    }

    #[test]
    fn upload_and_release_drive_the_state() {
        let chunk = Chunk::new(0, 0);
        chunk.set_state(ChunkState::BlockDataPopulated);
        assert!(chunk.transition(ChunkState::BlockDataPopulated, ChunkState::MeshBuilding));
        assert!(!chunk.transition(ChunkState::BlockDataPopulated, ChunkState::MeshBuilding));

        assert!(chunk.upload_mesh(chunk.revision(), MeshBuffers::default(), MeshBuffers::default()));
        assert_eq!(chunk.state(), ChunkState::MeshReady);
        assert!(chunk.has_mesh_data());
        assert!(chunk.transparent.buffers().is_some());

        chunk.release_mesh();
        assert_eq!(chunk.state(), ChunkState::BlockDataPopulated);
        assert!(!chunk.has_mesh_data());
        assert!(chunk.transparent.buffers().is_none());
    }

    #[test]
    fn stale_meshes_are_rejected() {
        let chunk = Chunk::new(0, 0);
        chunk.set_block_at(0, 0, 0, BlockType::Stone).unwrap();
        let fresh = chunk.revision();

        assert!(chunk.upload_mesh(fresh, MeshBuffers::default(), MeshBuffers::default()));
        assert!(!chunk.upload_mesh(fresh - 1, MeshBuffers::default(), MeshBuffers::default()));
    }
}
