//! # Block Module
//!
//! This module provides the core block-related functionality for the terrain.
//! It includes block type definitions, block face handling, and the texture
//! atlas lookup used by the mesh builder.
//!
//! ## Texture Atlas
//!
//! Block textures live in a single 16 x 16 tile atlas. Each block face maps to
//! one tile, addressed by its lower-left corner in atlas units (`1 / 16`).
//! The third UV component is an animation flag: `+1` for fluids whose texture
//! the surface shader scrolls, `-1` for everything else.

use block_side::BlockSide;
use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Size of one atlas tile in texture coordinates.
pub const ATLAS_TILE: f32 = 1.0 / 16.0;

/// Per-corner offsets inside a tile, matching the corner order of the face templates.
pub const UV_CORNER_OFFSETS: [[f32; 2]; 4] = [
    [0.0, 0.0],
    [ATLAS_TILE, 0.0],
    [ATLAS_TILE, ATLAS_TILE],
    [0.0, ATLAS_TILE],
];

/// Tile of the atlas used by each block type and face, in tile units.
fn atlas_tile(block_type: BlockType, side: BlockSide) -> (f32, f32) {
    match block_type {
        BlockType::Stone => (1.0, 15.0),
        BlockType::Dirt => (2.0, 15.0),
        BlockType::Grass => match side {
            BlockSide::YPos => (8.0, 13.0),
            BlockSide::YNeg => (2.0, 15.0),
            _ => (3.0, 15.0),
        },
        BlockType::Water => (14.0, 2.0),
        BlockType::Lava => (13.0, 1.0),
        BlockType::Snow => (2.0, 11.0),
        BlockType::Bedrock => (1.0, 14.0),
        BlockType::Desert => (0.0, 3.0),
        BlockType::Ice => (3.0, 11.0),
        BlockType::Wood => (4.0, 14.0),
        BlockType::Leaf => match side {
            BlockSide::YPos => (2.0, 11.0),
            _ => (5.0, 12.0),
        },
        BlockType::Cactus => match side {
            BlockSide::YPos | BlockSide::YNeg => (5.0, 11.0),
            _ => (6.0, 11.0),
        },
        BlockType::MushroomStem => (13.0, 7.0),
        BlockType::MushroomCap => match side {
            BlockSide::YNeg => (14.0, 7.0),
            _ => (13.0, 8.0),
        },
        BlockType::Empty => (0.0, 0.0),
    }
}

/// Gets the atlas coordinates for one face of a block.
///
/// # Arguments
/// * `block_type` - The block being meshed
/// * `side` - Which face of the block
///
/// # Returns
/// `[u, v, flag]` where `(u, v)` is the lower-left corner of the tile in
/// texture coordinates and `flag` is `+1` for animated blocks, `-1` otherwise.
pub fn atlas_uv(block_type: BlockType, side: BlockSide) -> [f32; 3] {
    let (u, v) = atlas_tile(block_type, side);
    let flag = if block_type.is_animated() { 1.0 } else { -1.0 };
    [u * ATLAS_TILE, v * ATLAS_TILE, flag]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grass_uses_distinct_top_and_bottom_tiles() {
        let top = atlas_uv(BlockType::Grass, BlockSide::YPos);
        let bottom = atlas_uv(BlockType::Grass, BlockSide::YNeg);
        let side = atlas_uv(BlockType::Grass, BlockSide::XPos);

        assert_eq!(top, [8.0 / 16.0, 13.0 / 16.0, -1.0]);
        assert_eq!(bottom, atlas_uv(BlockType::Dirt, BlockSide::YPos));
        assert_ne!(side, top);
    }

    #[test]
    fn only_fluids_are_flagged_animated() {
        for block_type in BlockType::ALL {
            let flag = atlas_uv(block_type, BlockSide::XPos)[2];
            let expected = matches!(block_type, BlockType::Water | BlockType::Lava);
            assert_eq!(flag > 0.0, expected, "{:?}", block_type);
        }
    }
}
