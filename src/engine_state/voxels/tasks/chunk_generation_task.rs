//! # Chunk Generation Task
//!
//! This module runs the procedural generator over one chunk on a worker
//! thread. It is scheduled for every chunk of a newly instantiated zone.

use std::sync::Arc;

use log::trace;

use crate::engine_state::{
    task_management::task::{TaskResult, WorkerContext},
    voxels::chunk::{Chunk, ChunkState, CHUNK_WIDTH},
};

/// Generates the blocks of `chunk`.
///
/// The store's shared guard is held for one column at a time, so the main
/// thread can still insert chunks between columns.
///
/// # Arguments
/// * `chunk` - A chunk in the `AllocatedEmpty` state
/// * `context` - Worker handles to the store and the generator
///
/// # Returns
/// `TaskResult::BlocksReady` with the now populated chunk
pub fn generate_chunk_blocks(chunk: Arc<Chunk>, context: &WorkerContext) -> TaskResult {
    for lx in 0..CHUNK_WIDTH {
        for lz in 0..CHUNK_WIDTH {
            let _guard = context.store.read_guard();
            context.generator.generate_column(&chunk, lx, lz);
        }
    }

    chunk.set_state(ChunkState::BlockDataPopulated);
    trace!("Generated blocks for chunk at {:?}", chunk.origin());

    TaskResult::BlocksReady(chunk)
}
