//! # Voxel Terrain Headless Driver
//!
//! Walks an observer across procedurally generated terrain and logs what a
//! renderer would draw. Everything lives in the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- terrain.json
//! ```

fn main() {
    voxel_terrain::run();
}
