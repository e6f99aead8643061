//! # Voxel Task System
//!
//! This module contains tasks related to terrain generation. They run on
//! worker threads to keep the control loop responsive.

pub mod chunk_generation_task;
