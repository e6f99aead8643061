//! # Block Side Module
//!
//! This module defines the six faces of a voxel block and the per-face
//! geometry templates used when building chunk meshes.
//!
//! All per-direction data lives in fixed arrays indexed by
//! [`BlockSide::ordinal`].

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The order is: [XPos, XNeg, YPos, YNeg, ZPos, ZNeg]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// Facing positive X (east)
    XPos = 0,
    /// Facing negative X (west)
    XNeg = 1,
    /// Facing positive Y (up)
    YPos = 2,
    /// Facing negative Y (down)
    YNeg = 3,
    /// Facing positive Z (north)
    ZPos = 4,
    /// Facing negative Z (south)
    ZNeg = 5,
}

/// Opposite of each side, indexed by ordinal.
const OPPOSITES: [BlockSide; 6] = [
    BlockSide::XNeg,
    BlockSide::XPos,
    BlockSide::YNeg,
    BlockSide::YPos,
    BlockSide::ZNeg,
    BlockSide::ZPos,
];

/// Unit step towards the neighbor on each side, indexed by ordinal.
const OFFSETS: [[i32; 3]; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

/// Geometry template for one block face in block-local space.
///
/// `corners` are listed counter-clockwise when viewed from outside the block,
/// so indices `[0, 1, 2, 0, 2, 3]` give two front-facing triangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceTemplate {
    /// Which side this template belongs to
    pub side: BlockSide,
    /// Outward normal
    pub normal: [f32; 3],
    /// The four corners of the unit quad
    pub corners: [[f32; 3]; 4],
}

/// Face templates, indexed by ordinal.
pub const FACE_TEMPLATES: [FaceTemplate; 6] = [
    FaceTemplate {
        side: BlockSide::XPos,
        normal: [1.0, 0.0, 0.0],
        corners: [
            [1.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 1.0, 1.0],
        ],
    },
    FaceTemplate {
        side: BlockSide::XNeg,
        normal: [-1.0, 0.0, 0.0],
        corners: [
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
            [0.0, 1.0, 0.0],
        ],
    },
    FaceTemplate {
        side: BlockSide::YPos,
        normal: [0.0, 1.0, 0.0],
        corners: [
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, 0.0],
        ],
    },
    FaceTemplate {
        side: BlockSide::YNeg,
        normal: [0.0, -1.0, 0.0],
        corners: [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
        ],
    },
    FaceTemplate {
        side: BlockSide::ZPos,
        normal: [0.0, 0.0, 1.0],
        corners: [
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ],
    },
    FaceTemplate {
        side: BlockSide::ZNeg,
        normal: [0.0, 0.0, -1.0],
        corners: [
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
        ],
    },
];

impl BlockSide {
    /// Returns an array containing all six block faces in ordinal order.
    pub const fn all() -> [BlockSide; 6] {
        [
            BlockSide::XPos,
            BlockSide::XNeg,
            BlockSide::YPos,
            BlockSide::YNeg,
            BlockSide::ZPos,
            BlockSide::ZNeg,
        ]
    }

    /// The four horizontal sides, which are also the chunk neighbor slots.
    pub const fn lateral() -> [BlockSide; 4] {
        [
            BlockSide::XPos,
            BlockSide::XNeg,
            BlockSide::ZPos,
            BlockSide::ZNeg,
        ]
    }

    /// Index of this side into the per-direction tables.
    #[inline]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// The side facing the other way.
    #[inline]
    pub fn opposite(self) -> BlockSide {
        OPPOSITES[self.ordinal()]
    }

    /// Integer step from a block to its neighbor on this side.
    #[inline]
    pub fn offset(self) -> Vector3<i32> {
        let [x, y, z] = OFFSETS[self.ordinal()];
        Vector3::new(x, y, z)
    }

    /// Geometry template for this side.
    #[inline]
    pub fn face(self) -> &'static FaceTemplate {
        &FACE_TEMPLATES[self.ordinal()]
    }

    /// Slot of a lateral side in a chunk's neighbor array.
    ///
    /// Returns `None` for `YPos` and `YNeg`; chunks span the full world height.
    #[inline]
    pub fn lateral_slot(self) -> Option<usize> {
        match self {
            BlockSide::XPos => Some(0),
            BlockSide::XNeg => Some(1),
            BlockSide::ZPos => Some(2),
            BlockSide::ZNeg => Some(3),
            BlockSide::YPos | BlockSide::YNeg => None,
        }
    }

    /// Axis index (0 = x, 1 = y, 2 = z) this side is perpendicular to.
    #[inline]
    pub fn axis(self) -> usize {
        match self {
            BlockSide::XPos | BlockSide::XNeg => 0,
            BlockSide::YPos | BlockSide::YNeg => 1,
            BlockSide::ZPos | BlockSide::ZNeg => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_indexed_by_ordinal() {
        for side in BlockSide::all() {
            assert_eq!(side.face().side, side);
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.offset() + side.opposite().offset(), Vector3::new(0, 0, 0));
        }
    }

    #[test]
    fn normals_match_offsets() {
        for side in BlockSide::all() {
            let offset = side.offset();
            let normal = side.face().normal;
            assert_eq!(
                [offset.x as f32, offset.y as f32, offset.z as f32],
                normal
            );
        }
    }

    #[test]
    fn face_corners_lie_on_their_plane() {
        for side in BlockSide::all() {
            let face = side.face();
            let axis = side.axis();
            let plane = if face.normal[axis] > 0.0 { 1.0 } else { 0.0 };
            for corner in face.corners {
                assert_eq!(corner[axis], plane, "{:?}", side);
            }
        }
    }
}
