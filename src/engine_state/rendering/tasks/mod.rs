//! Background tasks for the rendering system.
//!
//! # Available Tasks
//! - `chunk_mesh_generation_task`: Generates mesh data for chunks in the background

pub mod chunk_mesh_generation_task;
