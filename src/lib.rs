#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Terrain
//!
//! Procedural, streamed voxel terrain: an effectively infinite block world
//! split into 16 x 256 x 16 chunks, generated from noise-driven biomes and
//! meshed into interleaved vertex buffers on a pool of worker threads while an
//! observer moves through it.
//!
//! ## Key Modules
//!
//! * `core` - Shared-resource wrapper used by the terrain store
//! * `engine_state` - The [`Terrain`] facade, voxels, meshing and task management
//! * `config` - [`TerrainConfig`], loadable from JSON
//! * `error` - [`TerrainError`]
//!
//! ## Architecture
//!
//! The crate owns no window and no GPU. A host drives it once per frame with
//! [`Terrain::multithreaded_work`], queries or edits blocks through the
//! terrain, and draws through its own implementation of [`SurfaceShader`].
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     voxel_terrain::run();
//! }
//! ```
//!
//! ## Performance Considerations
//!
//! * Chunks are stored sparsely, keyed by their packed origin
//! * Generation and meshing run on worker threads; the host thread only
//!   dispatches and uploads
//! * Faces between two opaque blocks are never emitted

use std::time::Duration;

use cgmath::{Matrix4, Point3, Vector3};
use log::{error, info};
use web_time::Instant;

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

pub use config::TerrainConfig;
pub use engine_state::{
    rendering::{SurfaceShader, Vertex},
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::MeshBuffers,
        raycast::{grid_march, RayMarch},
        world::{chunk_origin, to_coords, to_key},
    },
    Terrain,
};
pub use error::TerrainError;

/// How long the headless driver walks before exiting.
pub const DEMO_DURATION: Duration = Duration::from_secs(20);

const FRAME_TIME: Duration = Duration::from_millis(16);
const WALK_SPEED: f32 = 24.0;

/// Counts what a frame would submit to the GPU.
#[derive(Debug, Default)]
struct CountingShader {
    draw_calls: usize,
    indices: usize,
}

impl SurfaceShader for CountingShader {
    fn set_model_matrix(&mut self, _model: Matrix4<f32>) {}

    fn draw_interleaved(&mut self, buffers: &MeshBuffers) {
        self.draw_calls += 1;
        self.indices += buffers.index_count();
    }
}

/// Headless driver: walks an observer across the terrain and logs what would be drawn.
///
/// The first command-line argument, if present, is a JSON configuration file.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => match TerrainConfig::from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}; falling back to defaults", e);
                TerrainConfig::default()
            }
        },
        None => TerrainConfig::default(),
    };

    let mut rng = fastrand::Rng::with_seed(u64::from(config.seed));
    let mut terrain = Terrain::new(config);

    let mut observer = Point3::new(0.0_f32, 160.0, 0.0);
    let mut previous = observer;
    let mut heading = Vector3::new(1.0_f32, 0.0, 0.0);

    let start = Instant::now();
    let mut last_frame = start;
    let mut next_report = Duration::from_secs(1);
    let mut since_pass = 0.0_f32;

    while start.elapsed() < DEMO_DURATION {
        let now = Instant::now();
        let delta_time = (now - last_frame).as_secs_f32();
        last_frame = now;

        if rng.u8(..) < 4 {
            let angle = rng.f32() * std::f32::consts::TAU;
            heading = Vector3::new(angle.cos(), 0.0, angle.sin());
        }
        observer += heading * WALK_SPEED * delta_time;

        // `previous` must be the position seen by the last control-loop pass.
        terrain.multithreaded_work(observer, previous, delta_time);
        since_pass += delta_time;
        if since_pass >= terrain.config().expansion_interval {
            previous = observer;
            since_pass = 0.0;
        }

        let reach = (terrain.config().render_radius_zones + 1) * 64;
        let (ox, oz) = (observer.x.floor() as i32, observer.z.floor() as i32);
        let min = chunk_origin(ox - reach, oz - reach);
        let max = chunk_origin(ox + reach, oz + reach);
        let mut shader = CountingShader::default();
        terrain.draw(min.x, max.x + 16, min.y, max.y + 16, &mut shader);

        if start.elapsed() >= next_report {
            next_report += Duration::from_secs(1);
            let ground = grid_march(
                terrain.store(),
                observer,
                Vector3::new(0.0, -f32::from(u8::MAX), 0.0),
            )
            .ok()
            .and_then(|march| march.hit)
            .map(|hit| hit.y);
            info!(
                "observer ({:.0}, {:.0}): {} chunks, {} draw calls, {} indices, ground {:?}",
                observer.x,
                observer.z,
                terrain.store().chunk_count(),
                shader.draw_calls,
                shader.indices,
                ground
            );
        }

        std::thread::sleep(FRAME_TIME);
    }

    info!("Done after {:.1}s", start.elapsed().as_secs_f32());
}
