//! # Block Type Module
//!
//! This module defines the different kinds of blocks in the voxel world.
//! It provides functionality for block type identification, conversion, and
//! the opacity classification the mesh builder and physics code rely on.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant is the value stored in a chunk's block array, so the enum
/// is `#[repr(u8)]` and converts back through `FromPrimitive`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Nothing. The value every chunk starts filled with.
    #[default]
    Empty = 0,
    /// Grass-topped dirt.
    Grass,
    /// Plain dirt.
    Dirt,
    /// Stone, the bulk of mountains and the cave walls.
    Stone,
    /// Water, translucent and animated.
    Water,
    /// Snow caps.
    Snow,
    /// Lava, translucent and animated.
    Lava,
    /// Indestructible floor of the world.
    Bedrock,
    /// Desert sand.
    Desert,
    /// Frozen water surface.
    Ice,
    /// Tree trunks.
    Wood,
    /// Tree foliage.
    Leaf,
    /// Cactus, drawn in the transparent pass.
    Cactus,
    /// Giant mushroom stem.
    MushroomStem,
    /// Giant mushroom cap.
    MushroomCap,
}

impl BlockType {
    /// Every block type, in discriminant order.
    pub const ALL: [BlockType; 15] = [
        BlockType::Empty,
        BlockType::Grass,
        BlockType::Dirt,
        BlockType::Stone,
        BlockType::Water,
        BlockType::Snow,
        BlockType::Lava,
        BlockType::Bedrock,
        BlockType::Desert,
        BlockType::Ice,
        BlockType::Wood,
        BlockType::Leaf,
        BlockType::Cactus,
        BlockType::MushroomStem,
        BlockType::MushroomCap,
    ];

    /// Converts a stored `BlockTypeSize` back into a `BlockType`.
    ///
    /// Values that do not name a block type decode as `Empty`; chunk storage
    /// only ever holds values written from a `BlockType`.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        num::FromPrimitive::from_u8(btype).unwrap_or(BlockType::Empty)
    }

    /// The compact representation stored in chunk memory.
    #[inline]
    pub fn as_int(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// True for block types that fully occlude the faces of their neighbors.
    #[inline]
    pub fn is_opaque(self) -> bool {
        !matches!(
            self,
            BlockType::Empty
                | BlockType::Water
                | BlockType::Lava
                | BlockType::Ice
                | BlockType::Cactus
        )
    }

    /// True for visible block types that only partially occlude their neighbors.
    ///
    /// Translucent blocks are meshed into the transparent pass.
    #[inline]
    pub fn is_translucent(self) -> bool {
        matches!(
            self,
            BlockType::Water | BlockType::Lava | BlockType::Ice | BlockType::Cactus
        )
    }

    /// True for fluids whose texture is scrolled by the surface shader.
    #[inline]
    pub fn is_animated(self) -> bool {
        matches!(self, BlockType::Water | BlockType::Lava)
    }
}
