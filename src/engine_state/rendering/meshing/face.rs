use crate::engine_state::{
    rendering::vertex::Vertex,
    voxels::{
        block::{atlas_uv, block_side::BlockSide, block_type::BlockType, UV_CORNER_OFFSETS},
        chunk::MeshBuffers,
    },
};

/// Triangle list for one quad, relative to its first vertex.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Represents a single visible quad face of a block in the mesh.
///
/// The four corners come from the side's face template, offset by the block's
/// position in the chunk, so they are listed counter-clockwise as seen from
/// outside the block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Chunk-local corners: lower-left, lower-right, upper-right, upper-left
    pub corners: [[f32; 3]; 4],
    /// The block this face belongs to, used for texture lookup
    pub block_type: BlockType,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates a new face for a block at the given coordinates.
    ///
    /// # Arguments
    /// * `i`, `j`, `k` - The coordinates of the block in chunk space
    /// * `block_type` - The block being meshed
    /// * `block_side` - Which side of the block this face represents
    ///
    /// # Returns
    /// A new `Face` with its corners placed on the block's `block_side`.
    pub fn new(i: i32, j: i32, k: i32, block_type: BlockType, block_side: BlockSide) -> Self {
        let template = block_side.face();
        let offset = [i as f32, j as f32, k as f32];
        let corners = template.corners.map(|corner| {
            [
                corner[0] + offset[0],
                corner[1] + offset[1],
                corner[2] + offset[2],
            ]
        });

        Face {
            corners,
            block_type,
            block_side,
        }
    }

    /// Appends this face's four vertices and six indices to `buffers`.
    ///
    /// Indices continue from the number of vertices already in `buffers`, so
    /// each pass keeps its own counter.
    pub fn append_to(&self, buffers: &mut MeshBuffers) {
        let base = buffers.vertices.len() as u32;
        let normal = self.block_side.face().normal;
        let [u, v, flag] = atlas_uv(self.block_type, self.block_side);

        for (corner, uv_offset) in self.corners.iter().zip(UV_CORNER_OFFSETS) {
            buffers.vertices.push(Vertex::new(
                *corner,
                normal,
                [u + uv_offset[0], v + uv_offset[1], flag],
            ));
        }
        buffers
            .indices
            .extend(QUAD_INDICES.iter().map(|index| base + index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_is_offset_by_block_position() {
        let face = Face::new(2, 3, 4, BlockType::Stone, BlockSide::YPos);
        assert_eq!(face.corners[0], [2.0, 4.0, 4.0]);
        assert_eq!(face.corners[2], [3.0, 4.0, 5.0]);
    }

    #[test]
    fn indices_continue_from_existing_vertices() {
        let mut buffers = MeshBuffers::default();
        Face::new(0, 0, 0, BlockType::Dirt, BlockSide::XPos).append_to(&mut buffers);
        Face::new(0, 0, 0, BlockType::Dirt, BlockSide::XNeg).append_to(&mut buffers);

        assert_eq!(buffers.vertices.len(), 8);
        assert_eq!(buffers.indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn vertices_carry_normal_and_atlas_uv() {
        let mut buffers = MeshBuffers::default();
        Face::new(0, 0, 0, BlockType::Water, BlockSide::ZNeg).append_to(&mut buffers);

        let [u, v, flag] = atlas_uv(BlockType::Water, BlockSide::ZNeg);
        assert_eq!(buffers.vertices[0].normal, [0.0, 0.0, -1.0, 1.0]);
        assert_eq!(buffers.vertices[0].uv, [u, v, flag, 1.0]);
        assert_eq!(
            buffers.vertices[2].uv,
            [u + 1.0 / 16.0, v + 1.0 / 16.0, flag, 1.0]
        );
        assert_eq!(flag, 1.0);
    }
}
