//! # Terrain Tasks
//!
//! This module defines the units of work the terrain hands to its workers and
//! the results they hand back.
//!
//! ## Task Lifecycle
//! 1. A `TerrainTask` is created on the main thread and published via
//!    `TaskManager::publish_task()`
//! 2. A worker calls `process()`, which returns a `TaskResult`
//! 3. The worker hands the result to `handle_result()`, which appends it to
//!    the matching completion list
//! 4. The main thread drains the completion lists once per control-loop pass
//!
//! ## Thread Safety
//! - Tasks and results only carry `Arc` handles and owned buffers, so both
//!   are `Send`
//! - Each completion list has its own mutex; a worker holds it only long
//!   enough to push one entry

use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine_state::{
    rendering::{meshing::ChunkMeshData, tasks::chunk_mesh_generation_task},
    voxels::{
        chunk::Chunk, generation::ChunkGenerator, tasks::chunk_generation_task,
        world::TerrainStore,
    },
};

/// A unit of work for a terrain worker.
#[derive(Debug)]
pub enum TerrainTask {
    /// Run the procedural generator over the chunk.
    GenerateBlocks(Arc<Chunk>),
    /// Build the chunk's opaque and transparent meshes.
    BuildMesh(Arc<Chunk>),
}

impl TerrainTask {
    /// Executes the task on the calling (worker) thread.
    ///
    /// # Arguments
    /// * `context` - Shared state every worker holds a handle to
    ///
    /// # Returns
    /// The result to deposit in a completion list.
    pub fn process(self, context: &WorkerContext) -> TaskResult {
        match self {
            TerrainTask::GenerateBlocks(chunk) => {
                chunk_generation_task::generate_chunk_blocks(chunk, context)
            }
            TerrainTask::BuildMesh(chunk) => chunk_mesh_generation_task::generate_chunk_mesh(chunk),
        }
    }
}

/// The outcome of processing a `TerrainTask`.
#[derive(Debug)]
pub enum TaskResult {
    /// The chunk's blocks are generated and it is ready to be meshed.
    BlocksReady(Arc<Chunk>),
    /// Mesh buffers waiting to be uploaded.
    MeshReady(ChunkMeshData),
}

impl TaskResult {
    /// Appends the result to the completion list the main thread drains for it.
    pub fn handle_result(self, completions: &CompletionLists) {
        match self {
            TaskResult::BlocksReady(chunk) => completions.blocks_ready.lock().push(chunk),
            TaskResult::MeshReady(mesh) => completions.meshes_ready.lock().push(mesh),
        }
    }
}

/// Results published by workers and drained by the control loop.
#[derive(Debug, Default)]
pub struct CompletionLists {
    blocks_ready: Mutex<Vec<Arc<Chunk>>>,
    meshes_ready: Mutex<Vec<ChunkMeshData>>,
}

impl CompletionLists {
    /// Takes every chunk whose blocks finished generating since the last call.
    pub fn take_blocks_ready(&self) -> Vec<Arc<Chunk>> {
        std::mem::take(&mut *self.blocks_ready.lock())
    }

    /// Takes every mesh finished since the last call.
    pub fn take_meshes_ready(&self) -> Vec<ChunkMeshData> {
        std::mem::take(&mut *self.meshes_ready.lock())
    }

    /// True when both lists are empty.
    pub fn is_empty(&self) -> bool {
        self.blocks_ready.lock().is_empty() && self.meshes_ready.lock().is_empty()
    }
}

/// Handles a worker needs to process any task.
#[derive(Clone)]
pub struct WorkerContext {
    /// The terrain store, for the per-column shared guard during generation
    pub store: TerrainStore,
    /// The procedural generator
    pub generator: ChunkGenerator,
    /// Where finished work is deposited
    pub completions: Arc<CompletionLists>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::block_type::BlockType, chunk::ChunkState};

    fn context() -> WorkerContext {
        WorkerContext {
            store: TerrainStore::new(),
            generator: ChunkGenerator::new(0),
            completions: Arc::new(CompletionLists::default()),
        }
    }

    #[test]
    fn generation_lands_in_blocks_ready() {
        let context = context();
        let chunk = context.store.instantiate_chunk_at(0, 0);

        TerrainTask::GenerateBlocks(chunk.clone())
            .process(&context)
            .handle_result(&context.completions);

        assert_eq!(chunk.state(), ChunkState::BlockDataPopulated);
        assert_eq!(chunk.get_block_at(0, 0, 0), Ok(BlockType::Bedrock));

        let ready = context.completions.take_blocks_ready();
        assert_eq!(ready.len(), 1);
        assert!(Arc::ptr_eq(&ready[0], &chunk));
        assert!(context.completions.is_empty());
    }

    #[test]
    fn meshing_lands_in_meshes_ready() {
        let context = context();
        let chunk = context.store.instantiate_chunk_at(16, 16);
        chunk.set_block_at(1, 1, 1, BlockType::Stone).unwrap();

        TerrainTask::BuildMesh(chunk)
            .process(&context)
            .handle_result(&context.completions);

        let meshes = context.completions.take_meshes_ready();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].opaque.index_count(), 36);
        assert!(context.completions.take_meshes_ready().is_empty());
    }
}
