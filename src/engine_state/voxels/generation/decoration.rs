//! # Decorations
//!
//! Multi-block structures placed on top of a column after its strata are
//! written. Every decoration is sized from a hash of its world position, so
//! the same column always grows the same structure.
//!
//! Decorations only ever write into the chunk they are placed in; blocks that
//! would fall outside it are clipped. Biomes only place a decoration where its
//! footprint fits.

use cgmath::Vector2;

use super::noise::{random1, remap};
use crate::engine_state::voxels::{block::block_type::BlockType, chunk::Chunk};

/// The structures a biome can grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    /// Wood trunk with alternating wide and narrow rings of leaves.
    SnowTree,
    /// A single column of cactus blocks, 3 to 7 tall.
    Cactus,
    /// Giant mushroom: a tall stem under a wide square cap.
    Mushroom,
}

impl Decoration {
    /// Places the decoration with its base at chunk-local `(lx, y, lz)`.
    pub fn place(self, chunk: &Chunk, lx: i32, y: i32, lz: i32) {
        let origin = chunk.origin();
        let seed = random1(Vector2::new((origin.x + lx) as f32, y as f32));

        match self {
            Decoration::SnowTree => place_snow_tree(chunk, lx, y, lz, seed),
            Decoration::Cactus => {
                let height = remap(seed, 0.0, 1.0, 3.0, 8.0) as i32;
                for i in 0..height {
                    put(chunk, lx, y + i, lz, BlockType::Cactus);
                }
            }
            Decoration::Mushroom => place_mushroom(chunk, lx, y, lz, seed),
        }
    }
}

#[inline]
fn put(chunk: &Chunk, x: i32, y: i32, z: i32, block_type: BlockType) {
    let _ = chunk.set_block_at(x, y, z, block_type);
}

fn fill_square(chunk: &Chunk, cx: i32, y: i32, cz: i32, radius: i32, block_type: BlockType) {
    for dx in -radius..=radius {
        for dz in -radius..=radius {
            put(chunk, cx + dx, y, cz + dz, block_type);
        }
    }
}

fn place_snow_tree(chunk: &Chunk, lx: i32, y: i32, lz: i32, seed: f32) {
    const LEVELS: i32 = 10;
    const WIDE: i32 = 3;
    const NARROW: i32 = 2;
    const SHRINK: i32 = 6;

    let first_ring = remap(seed, 0.0, 1.0, 1.0, 7.0) as i32;

    for i in 0..LEVELS {
        if i > first_ring {
            let radius = if i % 2 == 0 { WIDE } else { NARROW } - i / SHRINK;
            fill_square(chunk, lx, y + i, lz, radius, BlockType::Leaf);
        }
        if i < LEVELS - 1 {
            put(chunk, lx, y + i, lz, BlockType::Wood);
        }
    }
}

fn place_mushroom(chunk: &Chunk, lx: i32, y: i32, lz: i32, seed: f32) {
    let radius = remap(seed, 0.0, 1.0, 3.0, 6.0) as i32;
    let cap_height = (radius as f32 * 2.5) as i32;
    let height = remap(seed, 0.0, 1.0, 15.0, 35.0) as i32;
    let cap_base = y + height - cap_height;

    // Wide part of the cap, corners rounded off.
    for i in 0..cap_height - 2 {
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                if dx.abs() == radius && dz.abs() == radius {
                    continue;
                }
                put(chunk, lx + dx, cap_base + i, lz + dz, BlockType::MushroomCap);
            }
        }
    }
    for i in cap_height - 2..cap_height {
        fill_square(chunk, lx, cap_base + i, lz, radius - 1, BlockType::MushroomCap);
    }

    for i in 0..=height - 2 {
        put(chunk, lx, y + i, lz, BlockType::MushroomStem);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(chunk: &Chunk, block_type: BlockType) -> usize {
        let mut total = 0;
        for x in 0..16 {
            for y in 0..256 {
                for z in 0..16 {
                    if chunk.get_block_at(x, y, z) == Ok(block_type) {
                        total += 1;
                    }
                }
            }
        }
        total
    }

    #[test]
    fn cactus_is_a_single_column() {
        let chunk = Chunk::new(0, 0);
        Decoration::Cactus.place(&chunk, 5, 150, 5);

        let cactus = count(&chunk, BlockType::Cactus);
        assert!((3..=8).contains(&cactus), "cactus height {}", cactus);
        assert_eq!(chunk.get_block_at(5, 150, 5), Ok(BlockType::Cactus));
        assert_eq!(chunk.get_block_at(6, 150, 5), Ok(BlockType::Empty));
    }

    #[test]
    fn snow_tree_has_trunk_and_leaves() {
        let chunk = Chunk::new(0, 0);
        Decoration::SnowTree.place(&chunk, 8, 140, 8);

        assert_eq!(chunk.get_block_at(8, 140, 8), Ok(BlockType::Wood));
        assert!(count(&chunk, BlockType::Wood) >= 1);
        assert!(count(&chunk, BlockType::Leaf) > 0);
        assert_eq!(chunk.get_block_at(8, 150, 8), Ok(BlockType::Empty));
    }

    #[test]
    fn mushroom_grows_stem_and_cap() {
        let chunk = Chunk::new(0, 0);
        Decoration::Mushroom.place(&chunk, 8, 130, 8);

        assert_eq!(chunk.get_block_at(8, 130, 8), Ok(BlockType::MushroomStem));
        assert!(count(&chunk, BlockType::MushroomStem) >= 14);
        assert!(count(&chunk, BlockType::MushroomCap) > 0);
    }

    #[test]
    fn decorations_clip_at_chunk_edges() {
        let chunk = Chunk::new(0, 0);
        Decoration::SnowTree.place(&chunk, 0, 250, 15);
        Decoration::Mushroom.place(&chunk, 15, 240, 0);
        assert_eq!(chunk.get_block_at(0, 250, 15), Ok(BlockType::Wood));
    }
}
