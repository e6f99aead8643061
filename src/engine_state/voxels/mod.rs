//! # Voxel Terrain Core
//!
//! Block data and everything that reads or writes it.
//!
//! ## Architecture
//!
//! * **Block**: Block kinds, their opacity and their atlas tiles
//! * **Chunk**: A 16 x 256 x 16 column of blocks with links to its lateral neighbors
//! * **World**: The sparse map of chunks and generated zones, addressed in world space
//! * **Generation**: Noise, biomes and decorations that fill a chunk column by column
//! * **Raycast**: Grid traversal against the loaded terrain
//! * **Tasks**: Entry points that run generation on worker threads
//!
//! ## Data Flow
//!
//! 1. The control loop instantiates chunks in the world map
//! 2. Workers fill them through the generator
//! 3. Filled chunks are handed to the mesher
//! 4. Edits go through the world map and queue the affected chunks for re-meshing
//!
//! ## Thread Safety
//!
//! * Blocks are stored as atomics, so readers never see a torn value
//! * The chunk map sits behind a reader-writer lock; only the control loop
//!   takes it for writing
//! * Workers read neighbor chunks only through the links set at instantiation

pub mod block;
pub mod chunk;
pub mod generation;
pub mod raycast;
pub mod tasks;
pub mod world;
