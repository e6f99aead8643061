//! # Procedural Generation
//!
//! Fills a freshly instantiated chunk with terrain. Generation runs column by
//! column; each 1 x 256 column is independent of its neighbors, which lets a
//! worker hold the store's shared guard for one column at a time.
//!
//! ## Column Pipeline
//!
//! 1. Sample climate (temperature, humidity) and the blended surface height
//! 2. Fill the water band `128..=138`, freezing its top when cold
//! 3. Write the biome strata `128..=height` and any decoration on top
//! 4. Force bedrock at `y = 0`
//! 5. Carve caves through `1..=130` with 3D gradient noise, flooding the
//!    deepest ones with lava
//!
//! ## Determinism
//!
//! Output depends only on the chunk origin and the generator seed. Two
//! generators built from the same seed produce identical chunks.

pub mod biome;
pub mod decoration;
pub mod noise;

use cgmath::Vector3;

use self::{
    biome::{surface_height, Biome, Climate, SEA_FLOOR, SEA_LEVEL},
    noise::{perlin_3d, LatticeNoise},
};
use super::{
    block::block_type::BlockType,
    chunk::{Chunk, CHUNK_WIDTH},
};

/// Highest y touched by the cave pass.
pub const CAVE_CEILING: i32 = 130;
/// Caves below this y fill with lava.
pub const LAVA_LEVEL: i32 = 50;
const CAVE_FREQUENCY: f32 = 0.05;

/// Stateless terrain generator; safe to share between workers.
#[derive(Debug, Clone, Copy)]
pub struct ChunkGenerator {
    lattice: LatticeNoise,
}

impl ChunkGenerator {
    /// Creates a generator whose lattice noise uses `seed`.
    pub fn new(seed: u32) -> Self {
        ChunkGenerator {
            lattice: LatticeNoise::new(seed),
        }
    }

    /// Climate of world column `(x, z)`.
    pub fn climate_at(&self, x: i32, z: i32) -> Climate {
        Climate::sample(&self.lattice, x, z)
    }

    /// Surface height of world column `(x, z)`.
    pub fn surface_height_at(&self, x: i32, z: i32) -> i32 {
        surface_height(&self.lattice, x, z, &self.climate_at(x, z))
    }

    /// Generates every column of `chunk`.
    pub fn generate(&self, chunk: &Chunk) {
        for lx in 0..CHUNK_WIDTH {
            for lz in 0..CHUNK_WIDTH {
                self.generate_column(chunk, lx, lz);
            }
        }
    }

    /// Generates the single column at chunk-local `(lx, lz)`.
    pub fn generate_column(&self, chunk: &Chunk, lx: i32, lz: i32) {
        let origin = chunk.origin();
        let (x, z) = (origin.x + lx, origin.y + lz);

        let climate = self.climate_at(x, z);
        let height = surface_height(&self.lattice, x, z, &climate);

        for y in SEA_FLOOR..=SEA_LEVEL {
            let block = if y == SEA_LEVEL && climate.temperature < 0.5 {
                BlockType::Ice
            } else {
                BlockType::Water
            };
            put(chunk, lx, y, lz, block);
        }

        Biome::classify(&climate).fill_column(chunk, lx, lz, height);

        put(chunk, lx, 0, lz, BlockType::Bedrock);

        self.carve_caves(chunk, lx, lz);
    }

    fn carve_caves(&self, chunk: &Chunk, lx: i32, lz: i32) {
        let origin = chunk.origin();
        let (x, z) = ((origin.x + lx) as f32, (origin.y + lz) as f32);

        for y in 1..=CAVE_CEILING {
            let density = perlin_3d(Vector3::new(x, y as f32, z) * CAVE_FREQUENCY);
            let block = if density >= 0.0 {
                BlockType::Stone
            } else if y < LAVA_LEVEL {
                BlockType::Lava
            } else if chunk.get_block_at(lx, y + 1, lz) != Ok(BlockType::Water) {
                BlockType::Empty
            } else {
                continue;
            };
            put(chunk, lx, y, lz, block);
        }
    }
}

/// Writes a block at a chunk-local position the generator computed itself.
///
/// Strata, water band, bedrock and caves never leave the grid, so a failed
/// write here is a generator bug.
fn put(chunk: &Chunk, lx: i32, y: i32, lz: i32, block_type: BlockType) {
    let written = chunk.set_block_at(lx, y, lz, block_type);
    debug_assert!(written.is_ok(), "generator wrote outside the chunk: {:?}", written);
}

impl Default for ChunkGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}
