//! # Biomes
//!
//! Climate sampling, per-biome height fields and the strata each biome lays
//! down in a column.
//!
//! Climate is two large-scale fields, temperature and humidity, each pushed
//! through a narrow smoothstep so most of the world sits near 0 or 1 with
//! thin transition bands. The four height fields are blended by climate:
//!
//! ```text
//! height = mix(mix(mountain, grassland, humidity),
//!              mix(desert,   island,    humidity), temperature)
//! ```
//!
//! and the biome whose strata are written is picked from the same two values.

use cgmath::Vector2;

use super::{
    decoration::Decoration,
    noise::{fbm_2d, mix, random1, random2, remap, smoothstep, worley, LatticeNoise},
    put,
};
use crate::engine_state::voxels::{block::block_type::BlockType, chunk::Chunk};

/// Lowest block of the biome strata and of the water band.
pub const SEA_FLOOR: i32 = 128;
/// Top of the water band.
pub const SEA_LEVEL: i32 = 138;
/// Highest surface a column may have.
pub const MAX_SURFACE: i32 = 254;

const HEIGHT_GRID: f32 = 100.0;
const CLIMATE_GRID: f32 = 500.0;
const TEMPERATURE_OFFSET: f32 = 1746.5;

/// Temperature and humidity of one column, both in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Climate {
    /// 0 is cold, 1 is hot
    pub temperature: f32,
    /// 0 is dry, 1 is wet
    pub humidity: f32,
}

impl Climate {
    /// Samples the climate at world column `(x, z)`.
    pub fn sample(lattice: &LatticeNoise, x: i32, z: i32) -> Self {
        let p = Vector2::new(x as f32, z as f32);
        Climate {
            temperature: climate_field(lattice, p + Vector2::new(TEMPERATURE_OFFSET, TEMPERATURE_OFFSET)),
            humidity: climate_field(lattice, p),
        }
    }
}

fn climate_field(lattice: &LatticeNoise, p: Vector2<f32>) -> f32 {
    let jittered = (p + random2(p)) / CLIMATE_GRID;
    smoothstep(0.45, 0.55, lattice.sample(jittered))
}

/// Rolling grassland: fbm plus Worley noise over a domain warped by fbm.
pub fn grassland_height(x: i32, z: i32) -> i32 {
    let p = Vector2::new(x as f32, z as f32) / HEIGHT_GRID;
    let offset = Vector2::new(
        fbm_2d(p + Vector2::new(9.5, 2.6), 3),
        fbm_2d(p + Vector2::new(5.2, 1.3), 3),
    );

    let warped = p + offset;
    let height = fbm_2d(warped, 3) * (2.0 / 3.0) + worley(warped) * (2.0 / 3.0);
    remap(height * height, 0.0, 1.0, 135.0, 160.0) as i32
}

/// Dunes: fbm over the magnitude of two lattice-noise samples.
pub fn desert_height(lattice: &LatticeNoise, x: i32, z: i32) -> i32 {
    let p = Vector2::new(x as f32, z as f32) / HEIGHT_GRID;
    let sample = Vector2::new(
        lattice.sample(p + Vector2::new(3.5, 1.7)).abs(),
        lattice.sample(p + Vector2::new(9.3, 0.0)).abs(),
    );
    remap(fbm_2d(sample, 3), 0.2, 0.6, 131.0, 180.0) as i32
}

fn ridged_octaves(lattice: &LatticeNoise, x: i32, z: i32) -> f32 {
    let p = Vector2::new(x as f32, z as f32);
    let p = (p + random2(p)) / HEIGHT_GRID;
    let height = (lattice.sample(p) + 0.5 * lattice.sample(p * 2.0) + 0.25 * lattice.sample(p * 4.0)) / 1.75;
    height.powi(3)
}

/// Mountains: three octaves of lattice noise, cubed to sharpen the peaks.
pub fn mountain_height(lattice: &LatticeNoise, x: i32, z: i32) -> i32 {
    remap(ridged_octaves(lattice, x, z), 0.0, 0.3, 131.0, 244.0) as i32
}

/// Islands: the mountain field squashed to just above the water.
pub fn island_height(lattice: &LatticeNoise, x: i32, z: i32) -> i32 {
    remap(ridged_octaves(lattice, x, z), 0.0, 0.3, 131.0, 135.0) as i32
}

/// Surface height of column `(x, z)`: the climate-weighted blend of the four
/// height fields, capped at 254 and snapped to 1% steps of 254.
pub fn surface_height(lattice: &LatticeNoise, x: i32, z: i32, climate: &Climate) -> i32 {
    let mountain = mountain_height(lattice, x, z) as f32;
    let grassland = grassland_height(x, z) as f32;
    let desert = desert_height(lattice, x, z) as f32;
    let island = island_height(lattice, x, z) as f32;

    let cold = mix(mountain, grassland, climate.humidity);
    let hot = mix(desert, island, climate.humidity);
    let height = (mix(cold, hot, climate.temperature).floor() as i32).min(MAX_SURFACE);

    let stepped = (height as f32 / MAX_SURFACE as f32 * 100.0).round() / 100.0;
    (stepped * MAX_SURFACE as f32) as i32
}

/// The four biomes, one per climate quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Biome {
    /// Cold and wet: dirt under snow, snow trees.
    Ice,
    /// Hot and dry: sand, cacti.
    Desert,
    /// Cold and dry: stone under snow.
    Mountain,
    /// Hot and wet: dirt under grass, giant mushrooms near the water.
    Lake,
}

impl Biome {
    /// Picks the biome for a climate.
    pub fn classify(climate: &Climate) -> Self {
        let cold = climate.temperature < 0.5;
        let wet = climate.humidity >= 0.5;
        match (cold, wet) {
            (true, true) => Biome::Ice,
            (false, false) => Biome::Desert,
            (true, false) => Biome::Mountain,
            (false, true) => Biome::Lake,
        }
    }

    /// Writes this biome's strata into `y` in `[SEA_FLOOR, height]` of local
    /// column `(lx, lz)`, placing a decoration on top when the column's hash
    /// and height allow it.
    pub fn fill_column(self, chunk: &Chunk, lx: i32, lz: i32, height: i32) {
        let origin = chunk.origin();
        let column_hash = random1(Vector2::new((origin.x + lx) as f32, (origin.y + lz) as f32));

        let (body, top) = match self {
            Biome::Ice => (BlockType::Dirt, BlockType::Snow),
            Biome::Desert => (BlockType::Desert, BlockType::Desert),
            Biome::Mountain => (BlockType::Stone, BlockType::Snow),
            Biome::Lake => (BlockType::Dirt, BlockType::Grass),
        };

        for y in SEA_FLOOR..=height {
            let block = if y == height { top } else { body };
            put(chunk, lx, y, lz, block);
        }

        if height < SEA_FLOOR {
            return;
        }

        match self {
            Biome::Ice
                if column_hash < 0.02
                    && height > SEA_LEVEL
                    && height < 160
                    && fits_horizontally(lx, lz, 3) =>
            {
                Decoration::SnowTree.place(chunk, lx, height, lz);
            }
            Biome::Desert if column_hash < 0.00125 && height > SEA_LEVEL && height < 230 => {
                Decoration::Cactus.place(chunk, lx, height + 1, lz);
            }
            Biome::Lake
                if column_hash < 0.01 && height < SEA_LEVEL && fits_horizontally(lx, lz, 6) =>
            {
                Decoration::Mushroom.place(chunk, lx, height, lz);
                put(chunk, lx, height, lz, BlockType::Grass);
            }
            _ => {}
        }
    }
}

/// True if a decoration of the given horizontal reach centered on `(lx, lz)`
/// stays strictly inside the chunk.
fn fits_horizontally(lx: i32, lz: i32, reach: i32) -> bool {
    lx - reach > 0 && lx + reach < 16 && lz - reach > 0 && lz + reach < 16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn climate_quadrants_map_to_biomes() {
        let at = |temperature, humidity| Biome::classify(&Climate { temperature, humidity });
        assert_eq!(at(0.0, 1.0), Biome::Ice);
        assert_eq!(at(1.0, 0.0), Biome::Desert);
        assert_eq!(at(0.0, 0.0), Biome::Mountain);
        assert_eq!(at(1.0, 1.0), Biome::Lake);
        assert_eq!(at(0.5, 0.5), Biome::Lake);
    }

    #[test]
    fn climate_stays_in_unit_range() {
        let lattice = LatticeNoise::new(0);
        for i in 0..50 {
            let climate = Climate::sample(&lattice, i * 97 - 2000, i * -53 + 700);
            assert!((0.0..=1.0).contains(&climate.temperature));
            assert!((0.0..=1.0).contains(&climate.humidity));
        }
    }

    #[test]
    fn surface_heights_are_capped_and_stepped() {
        let lattice = LatticeNoise::new(3);
        for i in 0..50 {
            let (x, z) = (i * 131 - 3000, i * 17 + 40);
            let climate = Climate::sample(&lattice, x, z);
            let height = surface_height(&lattice, x, z, &climate);
            assert!(height <= MAX_SURFACE);
            assert!(height >= 100, "height {} at {} {}", height, x, z);
        }
    }

    #[test]
    fn mountain_strata_are_stone_under_snow() {
        let chunk = Chunk::new(0, 0);
        Biome::Mountain.fill_column(&chunk, 4, 4, 150);

        assert_eq!(chunk.get_block_at(4, SEA_FLOOR, 4), Ok(BlockType::Stone));
        assert_eq!(chunk.get_block_at(4, 149, 4), Ok(BlockType::Stone));
        assert_eq!(chunk.get_block_at(4, 150, 4), Ok(BlockType::Snow));
        assert_eq!(chunk.get_block_at(4, 151, 4), Ok(BlockType::Empty));
        assert_eq!(chunk.get_block_at(4, SEA_FLOOR - 1, 4), Ok(BlockType::Empty));
    }

    #[test]
    fn horizontal_fit_keeps_a_margin() {
        assert!(fits_horizontally(7, 8, 6));
        assert!(!fits_horizontally(6, 8, 6));
        assert!(!fits_horizontally(8, 10, 6));
        assert!(fits_horizontally(4, 12, 3));
    }
}
