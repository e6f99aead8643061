//! # Terrain Store
//!
//! This module provides the `TerrainStore`, the authoritative map from chunk
//! origins to chunks, together with the set of zones that have been generated.
//!
//! ## Architecture
//!
//! The world is unbounded in x and z. Chunks are kept in a hash map keyed by
//! their packed world-space origin (see [`to_key`]), so only chunks that have
//! been instantiated use memory. Chunks are grouped into 4 x 4 zones (64 x 64
//! blocks) for streaming; a zone is recorded in `generated_zones` once all of
//! its chunks exist and their generation has been queued.
//!
//! ## Thread Safety
//!
//! The map and the zone set sit behind one reader-writer lock owned by the
//! store. Inserting a chunk takes the exclusive side; lookups and the
//! per-column guard held by generation workers take the shared side. Reading
//! or writing individual blocks needs no lock at all once a chunk handle is
//! held (see [`Chunk`]).
//!
//! ## Coordinates
//!
//! World coordinates map to chunk and zone origins with floor division, so
//! `-1` belongs to the chunk at `-16` and the zone at `-64`.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use cgmath::Point2;
use parking_lot::RwLockReadGuard;

use super::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::{Chunk, CHUNK_HEIGHT, CHUNK_WIDTH},
};
use crate::{
    core::MtResource,
    error::{Result, TerrainError},
};

/// Width and depth of a zone in blocks.
pub const ZONE_WIDTH: i32 = 64;
/// Number of chunks along one side of a zone.
pub const CHUNKS_PER_ZONE_SIDE: i32 = ZONE_WIDTH / CHUNK_WIDTH;

/// Packs a pair of world coordinates into one 64-bit key.
///
/// `x` occupies the high 32 bits and `z` the low 32 bits.
#[inline]
pub fn to_key(x: i32, z: i32) -> i64 {
    ((x as i64) << 32) | (z as u32 as i64)
}

/// Unpacks a key produced by [`to_key`].
#[inline]
pub fn to_coords(key: i64) -> Point2<i32> {
    Point2::new((key >> 32) as i32, key as i32)
}

/// Origin of the chunk containing world column `(x, z)`.
#[inline]
pub fn chunk_origin(x: i32, z: i32) -> Point2<i32> {
    Point2::new(
        x.div_euclid(CHUNK_WIDTH) * CHUNK_WIDTH,
        z.div_euclid(CHUNK_WIDTH) * CHUNK_WIDTH,
    )
}

/// Origin of the zone containing world column `(x, z)`.
#[inline]
pub fn zone_origin(x: i32, z: i32) -> Point2<i32> {
    Point2::new(
        x.div_euclid(ZONE_WIDTH) * ZONE_WIDTH,
        z.div_euclid(ZONE_WIDTH) * ZONE_WIDTH,
    )
}

/// The data guarded by the store lock.
#[derive(Default)]
pub struct ChunkMap {
    chunks: HashMap<i64, Arc<Chunk>>,
    generated_zones: HashSet<i64>,
}

impl ChunkMap {
    /// The chunk covering world column `(x, z)`, if any.
    pub fn chunk_at(&self, x: i32, z: i32) -> Option<&Arc<Chunk>> {
        let origin = chunk_origin(x, z);
        self.chunks.get(&to_key(origin.x, origin.y))
    }

    fn get_block_at(&self, x: i32, y: i32, z: i32) -> Result<BlockType> {
        let chunk = self
            .chunk_at(x, z)
            .ok_or(TerrainError::OutOfRange { x, y, z })?;
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return Ok(BlockType::Empty);
        }
        let origin = chunk.origin();
        chunk.get_block_at(x - origin.x, y, z - origin.y)
    }

    fn set_block_at(&self, x: i32, y: i32, z: i32, block_type: BlockType) -> Result<()> {
        let chunk = self
            .chunk_at(x, z)
            .ok_or(TerrainError::OutOfRange { x, y, z })?;
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return Ok(());
        }
        let origin = chunk.origin();
        chunk.set_block_at(x - origin.x, y, z - origin.y, block_type)
    }
}

/// Shared handle to every chunk in the world.
///
/// Cloning a `TerrainStore` yields another handle to the same map, which is how
/// worker threads reach it.
#[derive(Clone, Default)]
pub struct TerrainStore {
    map: MtResource<ChunkMap>,
}

impl TerrainStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a shared guard on the store that nests with other shared guards
    /// held by the same thread.
    ///
    /// Generation workers hold one of these per column so the map cannot be
    /// restructured underneath them.
    pub fn read_guard(&self) -> RwLockReadGuard<'_, ChunkMap> {
        self.map.get_recursive()
    }

    /// True if a chunk covers world column `(x, z)`.
    pub fn has_chunk_at(&self, x: i32, z: i32) -> bool {
        self.map.get().chunk_at(x, z).is_some()
    }

    /// True if the zone containing `(x, z)` has been generated.
    pub fn has_zone_at(&self, x: i32, z: i32) -> bool {
        let origin = zone_origin(x, z);
        self.map
            .get()
            .generated_zones
            .contains(&to_key(origin.x, origin.y))
    }

    /// Handle to the chunk covering world column `(x, z)`.
    pub fn chunk_at(&self, x: i32, z: i32) -> Option<Arc<Chunk>> {
        self.map.get().chunk_at(x, z).cloned()
    }

    /// Reads the block at world coordinates.
    ///
    /// # Returns
    /// - `Err(OutOfRange)` if no chunk covers `(x, z)`
    /// - `Ok(Empty)` if `y` is outside `[0, 256)`
    /// - otherwise the stored block kind
    pub fn get_block_at(&self, x: i32, y: i32, z: i32) -> Result<BlockType> {
        self.map.get().get_block_at(x, y, z)
    }

    /// Writes the block at world coordinates.
    ///
    /// Writes with `y` outside `[0, 256)` are ignored.
    ///
    /// # Returns
    /// `Err(OutOfRange)` if no chunk covers `(x, z)`.
    pub fn set_block_at(&self, x: i32, y: i32, z: i32, block_type: BlockType) -> Result<()> {
        self.map.get().set_block_at(x, y, z, block_type)
    }

    /// Creates the chunk covering `(x, z)` and links it to its existing lateral neighbors.
    ///
    /// If a chunk is already registered there it is returned unchanged.
    ///
    /// # Returns
    /// The chunk at the 16-aligned origin of `(x, z)`.
    pub fn instantiate_chunk_at(&self, x: i32, z: i32) -> Arc<Chunk> {
        let origin = chunk_origin(x, z);
        let key = to_key(origin.x, origin.y);

        let mut map = self.map.get_mut();
        if let Some(existing) = map.chunks.get(&key) {
            return existing.clone();
        }

        let chunk = Arc::new(Chunk::new(origin.x, origin.y));
        for side in BlockSide::lateral() {
            let offset = side.offset();
            let neighbor_key = to_key(
                origin.x + offset.x * CHUNK_WIDTH,
                origin.y + offset.z * CHUNK_WIDTH,
            );
            if let Some(neighbor) = map.chunks.get(&neighbor_key) {
                chunk.link_neighbor(neighbor, side);
            }
        }
        map.chunks.insert(key, chunk.clone());
        chunk
    }

    /// Records the zone containing `(x, z)` as generated.
    pub fn mark_zone_generated(&self, x: i32, z: i32) {
        let origin = zone_origin(x, z);
        self.map
            .get_mut()
            .generated_zones
            .insert(to_key(origin.x, origin.y));
    }

    /// The existing chunks of the zone containing `(x, z)`.
    pub fn zone_chunks(&self, x: i32, z: i32) -> Vec<Arc<Chunk>> {
        let origin = zone_origin(x, z);
        self.chunks_in_range(
            origin.x,
            origin.x + ZONE_WIDTH,
            origin.y,
            origin.y + ZONE_WIDTH,
        )
    }

    /// The existing chunks covering the columns `(min_x + 16i, min_z + 16k)`
    /// that fall in `[min_x, max_x) x [min_z, max_z)`, in x-major order.
    ///
    /// With 16-aligned bounds this is every chunk whose origin lies in the
    /// rectangle. Unaligned bounds pick the chunk covering `min_x` and may
    /// miss the last origin before `max_x`; align them with [`chunk_origin`]
    /// first when that matters.
    pub fn chunks_in_range(&self, min_x: i32, max_x: i32, min_z: i32, max_z: i32) -> Vec<Arc<Chunk>> {
        let map = self.map.get();
        let mut chunks = Vec::new();
        for x in (min_x..max_x).step_by(CHUNK_WIDTH as usize) {
            for z in (min_z..max_z).step_by(CHUNK_WIDTH as usize) {
                if let Some(chunk) = map.chunk_at(x, z) {
                    chunks.push(chunk.clone());
                }
            }
        }
        chunks
    }

    /// Number of instantiated chunks.
    pub fn chunk_count(&self) -> usize {
        self.map.get().chunks.len()
    }

    /// Number of generated zones.
    pub fn zone_count(&self) -> usize {
        self.map.get().generated_zones.len()
    }
}
