//! # Grid Traversal
//!
//! Walks a ray through the block grid one cell boundary at a time and reports
//! the first non-empty block it enters. Player collision and block picking
//! are built on top of this.

use cgmath::{InnerSpace, Point3, Vector3};

use super::{block::block_type::BlockType, world::TerrainStore};
use crate::error::Result;

/// Outcome of a [`grid_march`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayMarch {
    /// Distance travelled, never more than the ray length
    pub distance: f32,
    /// The first non-empty block entered, if any
    pub hit: Option<Point3<i32>>,
}

/// Marches from `origin` along `direction` for `|direction|` units.
///
/// # Arguments
/// * `store` - Terrain to test cells against
/// * `origin` - World-space start point
/// * `direction` - Ray direction; its length is the maximum search distance
///
/// # Returns
/// - `Ok(RayMarch)` with `hit` set to the first non-empty cell, or `None` if the
///   ray ran its full length through empty cells
/// - `Err(OutOfRange)` if the ray enters a column with no chunk
///
/// # Panics
/// Panics if `direction` is zero or not finite; a degenerate ray has no axis to step along.
pub fn grid_march(
    store: &TerrainStore,
    mut origin: Point3<f32>,
    direction: Vector3<f32>,
) -> Result<RayMarch> {
    let max_len = direction.magnitude();
    assert!(
        max_len > 0.0 && max_len.is_finite(),
        "grid_march needs a non-zero, finite direction"
    );
    let direction = direction / max_len;

    let mut cell = Point3::new(
        origin.x.floor() as i32,
        origin.y.floor() as i32,
        origin.z.floor() as i32,
    );
    let mut travelled = 0.0_f32;

    while travelled < max_len {
        let mut min_t = f32::INFINITY;
        let mut interface_axis = None;

        for axis in 0..3 {
            if direction[axis] == 0.0 {
                continue;
            }
            let mut offset = if direction[axis] > 0.0 { 1.0 } else { 0.0 };
            // Sitting exactly on a boundary while heading negative must still move.
            if cell[axis] as f32 == origin[axis] && offset == 0.0 {
                offset = -1.0;
            }
            let next_intercept = cell[axis] as f32 + offset;
            let axis_t = ((next_intercept - origin[axis]) / direction[axis]).min(max_len);
            if axis_t < min_t {
                min_t = axis_t;
                interface_axis = Some(axis);
            }
        }

        let Some(axis) = interface_axis else {
            unreachable!("a normalized direction has a non-zero component");
        };

        travelled += min_t;
        origin += direction * min_t;

        cell = Point3::new(
            origin.x.floor() as i32,
            origin.y.floor() as i32,
            origin.z.floor() as i32,
        );
        if direction[axis] < 0.0 {
            cell[axis] -= 1;
        }

        if store.get_block_at(cell.x, cell.y, cell.z)? != BlockType::Empty {
            return Ok(RayMarch {
                distance: travelled.min(max_len),
                hit: Some(cell),
            });
        }
    }

    Ok(RayMarch {
        distance: travelled.min(max_len),
        hit: None,
    })
}
