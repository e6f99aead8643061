//! # Engine State Module
//!
//! The streaming terrain: the [`Terrain`] facade and the subsystems behind it.
//!
//! ## Key Components
//!
//! * `Terrain` - Owns the store, the worker pool and the control-loop timer
//! * `voxels` - Blocks, chunks, the terrain store, generation and ray marching
//! * `rendering` - Mesh building, the vertex format and the shader seam
//! * `task_management` - Worker threads, tasks and completion lists
//!
//! ## Architecture
//!
//! The world is streamed in 64 x 64 zones around an observer. The main thread
//! calls [`Terrain::multithreaded_work`] every frame; every half second it
//!
//! 1. evicts the mesh buffers of zones that left the observer's neighborhood,
//! 2. instantiates zones that entered it, queueing block generation for each
//!    of their chunks, and queues meshing for generated chunks that lack a mesh,
//! 3. turns chunks whose blocks finished generating into meshing tasks, and
//! 4. uploads finished meshes into their chunks.
//!
//! Only the main thread mutates the map of chunks or uploads buffers; workers
//! only write blocks of chunks handed to them and read their neighbors.
//!
//! ## Performance Considerations
//!
//! * Generation and meshing never run on the main thread
//! * Evicted zones keep their block data, so coming back only re-meshes
//! * The transparent pass is not depth-sorted; overlapping translucent
//!   surfaces may blend in the wrong order

use std::sync::Arc;

use cgmath::{Matrix4, Point3, Vector3};
use log::{debug, info};

use rendering::SurfaceShader;
use task_management::{
    task::{CompletionLists, TerrainTask, WorkerContext},
    TaskManager,
};
use voxels::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::{Chunk, ChunkState, CHUNK_WIDTH},
    generation::ChunkGenerator,
    world::{zone_origin, TerrainStore, ZONE_WIDTH},
};

use crate::{config::TerrainConfig, error::Result};

pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The streaming terrain.
///
/// # Examples
///
/// ```no_run
/// use cgmath::Point3;
/// use voxel_terrain::{Terrain, TerrainConfig};
///
/// let mut terrain = Terrain::new(TerrainConfig::default());
/// let observer = Point3::new(0.0, 160.0, 0.0);
///
/// // Main loop
/// loop {
///     terrain.multithreaded_work(observer, observer, 1.0 / 60.0);
///     // terrain.draw(min_x, max_x, min_z, max_z, &mut shader);
/// }
/// ```
pub struct Terrain {
    config: TerrainConfig,
    store: TerrainStore,
    completions: Arc<CompletionLists>,
    task_manager: TaskManager,
    expansion_timer: f32,
}

impl Terrain {
    /// Creates an empty terrain and starts its worker threads.
    ///
    /// # Arguments
    /// * `config` - Seed, worker count and streaming parameters
    pub fn new(config: TerrainConfig) -> Self {
        let store = TerrainStore::new();
        let completions = Arc::new(CompletionLists::default());
        let context = WorkerContext {
            store: store.clone(),
            generator: ChunkGenerator::new(config.seed),
            completions: completions.clone(),
        };
        let task_manager = TaskManager::new(config.resolved_worker_count(), context);

        info!(
            "Terrain created: seed {}, {} workers, render radius {} zones",
            config.seed,
            task_manager.worker_count(),
            config.render_radius_zones
        );

        Terrain {
            config,
            store,
            completions,
            task_manager,
            expansion_timer: 0.0,
        }
    }

    /// The configuration this terrain was created with.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// The underlying chunk store.
    pub fn store(&self) -> &TerrainStore {
        &self.store
    }

    /// See [`TerrainStore::get_block_at`].
    pub fn get_block_at(&self, x: i32, y: i32, z: i32) -> Result<BlockType> {
        self.store.get_block_at(x, y, z)
    }

    /// See [`TerrainStore::set_block_at`]. The change is not re-meshed; use
    /// [`Terrain::edit_block_at`] for edits that should become visible.
    pub fn set_block_at(&self, x: i32, y: i32, z: i32, block_type: BlockType) -> Result<()> {
        self.store.set_block_at(x, y, z, block_type)
    }

    /// See [`TerrainStore::has_chunk_at`].
    pub fn has_chunk_at(&self, x: i32, z: i32) -> bool {
        self.store.has_chunk_at(x, z)
    }

    /// See [`TerrainStore::has_zone_at`].
    pub fn has_zone_at(&self, x: i32, z: i32) -> bool {
        self.store.has_zone_at(x, z)
    }

    /// Instantiates the 16 chunks of the zone containing `(x, z)` and queues
    /// block generation for each, then records the zone as generated.
    pub fn instantiate_zone_at(&mut self, x: i32, z: i32) {
        let origin = zone_origin(x, z);
        let mut queued = 0;

        for cx in (origin.x..origin.x + ZONE_WIDTH).step_by(CHUNK_WIDTH as usize) {
            for cz in (origin.y..origin.y + ZONE_WIDTH).step_by(CHUNK_WIDTH as usize) {
                let chunk = self.store.instantiate_chunk_at(cx, cz);
                if chunk.state() == ChunkState::AllocatedEmpty {
                    self.task_manager
                        .publish_task(TerrainTask::GenerateBlocks(chunk));
                    queued += 1;
                }
            }
        }

        self.store.mark_zone_generated(origin.x, origin.y);
        info!(
            "Instantiated zone ({}, {}), {} chunks queued for generation",
            origin.x, origin.y, queued
        );
    }

    /// Releases the mesh buffers of the zone containing `(x, z)`. Block data is kept.
    pub fn destroy_zone_at(&mut self, x: i32, z: i32) {
        let mut released = 0;
        for chunk in self.store.zone_chunks(x, z) {
            if chunk.has_mesh_data() {
                chunk.release_mesh();
                released += 1;
            }
        }
        let origin = zone_origin(x, z);
        debug!(
            "Evicted zone ({}, {}): released {} chunk meshes",
            origin.x, origin.y, released
        );
    }

    /// Queues meshing for every chunk of the zone containing `(x, z)` whose
    /// blocks are generated but which has no mesh and none in progress.
    pub fn create_zone_buffers(&mut self, x: i32, z: i32) {
        for chunk in self.store.zone_chunks(x, z) {
            if chunk.transition(ChunkState::BlockDataPopulated, ChunkState::MeshBuilding) {
                self.task_manager.publish_task(TerrainTask::BuildMesh(chunk));
            }
        }
    }

    /// Draws every meshed chunk returned by [`TerrainStore::chunks_in_range`]
    /// for the same bounds; pass 16-aligned minimums to cover exactly the
    /// chunks whose origins lie in `[min_x, max_x) x [min_z, max_z)`.
    ///
    /// All opaque buffers are drawn first, then all transparent buffers. Each
    /// draw is preceded by a model matrix translating to the chunk's origin.
    pub fn draw<S: SurfaceShader>(&self, min_x: i32, max_x: i32, min_z: i32, max_z: i32, shader: &mut S) {
        let chunks = self.store.chunks_in_range(min_x, max_x, min_z, max_z);

        for chunk in &chunks {
            if let Some(buffers) = chunk.opaque_buffers().as_ref() {
                shader.set_model_matrix(model_matrix(chunk));
                shader.draw_interleaved(buffers);
            }
        }

        for chunk in &chunks {
            if let Some(buffers) = chunk.transparent.buffers().as_ref() {
                shader.set_model_matrix(model_matrix(chunk));
                shader.draw_interleaved(buffers);
            }
        }
    }

    /// Per-frame entry point of the control loop.
    ///
    /// Accumulates `delta_time`; once the configured interval has passed, runs
    /// [`Terrain::try_expansion`] then [`Terrain::check_thread_results`] and
    /// resets the accumulator.
    ///
    /// # Arguments
    /// * `observer` - Current observer position
    /// * `previous` - Observer position at the previous pass
    /// * `delta_time` - Seconds since the last call
    pub fn multithreaded_work(&mut self, observer: Point3<f32>, previous: Point3<f32>, delta_time: f32) {
        self.expansion_timer += delta_time;
        if self.expansion_timer < self.config.expansion_interval {
            return;
        }

        self.try_expansion(observer, previous);
        self.check_thread_results();
        self.expansion_timer = 0.0;
    }

    /// Brings the zones around `observer` into memory and evicts those that
    /// fell out of range since `previous`.
    pub fn try_expansion(&mut self, observer: Point3<f32>, previous: Point3<f32>) {
        let current = zone_origin(observer.x.floor() as i32, observer.z.floor() as i32);
        let last = zone_origin(previous.x.floor() as i32, previous.z.floor() as i32);
        let radius = self.config.render_radius_zones;
        let reach = radius * ZONE_WIDTH;

        for i in -radius..=radius {
            for j in -radius..=radius {
                let (zx, zz) = (last.x + i * ZONE_WIDTH, last.y + j * ZONE_WIDTH);
                let outside = (zx - current.x).abs() > reach || (zz - current.y).abs() > reach;
                if outside && self.store.has_zone_at(zx, zz) {
                    self.destroy_zone_at(zx, zz);
                }
            }
        }

        for i in -radius..=radius {
            for j in -radius..=radius {
                let (zx, zz) = (current.x + i * ZONE_WIDTH, current.y + j * ZONE_WIDTH);
                if !self.store.has_zone_at(zx, zz) {
                    self.instantiate_zone_at(zx, zz);
                } else {
                    self.create_zone_buffers(zx, zz);
                }
            }
        }
    }

    /// Drains the completion lists.
    ///
    /// Chunks with fresh blocks are queued for meshing, along with any
    /// neighbor whose border faces they change: a meshed neighbor is queued
    /// right away, one whose mesh is in flight is flagged for another build.
    /// Finished meshes are then uploaded into their chunks, and flagged chunks
    /// are queued again.
    pub fn check_thread_results(&mut self) {
        let blocks_ready = self.completions.take_blocks_ready();
        let mut meshing_queued = 0;
        for chunk in &blocks_ready {
            if chunk.transition(ChunkState::BlockDataPopulated, ChunkState::MeshBuilding) {
                self.task_manager
                    .publish_task(TerrainTask::BuildMesh(chunk.clone()));
                meshing_queued += 1;
            }
            for side in BlockSide::lateral() {
                let Some(neighbor) = chunk.neighbor(side) else {
                    continue;
                };
                if neighbor.transition(ChunkState::MeshReady, ChunkState::MeshBuilding) {
                    self.task_manager.publish_task(TerrainTask::BuildMesh(neighbor));
                    meshing_queued += 1;
                } else if neighbor.state() == ChunkState::MeshBuilding {
                    neighbor.request_remesh();
                }
            }
        }

        let mut uploaded = 0;
        for mesh in self.completions.take_meshes_ready() {
            let chunk = mesh.chunk.clone();
            if mesh.upload() {
                uploaded += 1;
            }
            if chunk.take_remesh_request() {
                chunk.set_state(ChunkState::MeshBuilding);
                self.task_manager.publish_task(TerrainTask::BuildMesh(chunk));
                meshing_queued += 1;
            }
        }

        if !blocks_ready.is_empty() || uploaded > 0 {
            debug!(
                "{} chunks generated, {} meshes queued, {} meshes uploaded",
                blocks_ready.len(),
                meshing_queued,
                uploaded
            );
        }
    }

    /// Writes a block and queues re-meshing of every chunk whose faces it changes.
    ///
    /// # Returns
    /// `Err(OutOfRange)` if no chunk covers `(x, z)`.
    pub fn edit_block_at(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) -> Result<()> {
        self.store.set_block_at(x, y, z, block_type)?;

        let Some(chunk) = self.store.chunk_at(x, z) else {
            return Ok(());
        };
        if !(0..voxels::chunk::CHUNK_HEIGHT).contains(&y) {
            return Ok(());
        }

        let origin = chunk.origin();
        let (lx, lz) = (x - origin.x, z - origin.y);
        let mut affected = vec![chunk.clone()];
        let borders = [
            (lx == CHUNK_WIDTH - 1, BlockSide::XPos),
            (lx == 0, BlockSide::XNeg),
            (lz == CHUNK_WIDTH - 1, BlockSide::ZPos),
            (lz == 0, BlockSide::ZNeg),
        ];
        for (on_border, side) in borders {
            if on_border {
                affected.extend(chunk.neighbor(side));
            }
        }

        for chunk in affected {
            self.queue_mesh_rebuild(chunk);
        }
        Ok(())
    }

    /// Queues a rebuild for a chunk that is meshed or being meshed.
    ///
    /// Chunks awaiting generation, and generated chunks without a mesh (first
    /// mesh pending, or evicted), are left alone: they get meshed from their
    /// current blocks once they are in range.
    fn queue_mesh_rebuild(&mut self, chunk: Arc<Chunk>) {
        match chunk.state() {
            ChunkState::AllocatedEmpty => {}
            ChunkState::BlockDataPopulated if !chunk.has_mesh_data() => {}
            ChunkState::MeshBuilding => chunk.request_remesh(),
            _ => {
                chunk.set_state(ChunkState::MeshBuilding);
                self.task_manager.publish_task(TerrainTask::BuildMesh(chunk));
            }
        }
    }

    /// True when no task is queued or running and no result awaits the control loop.
    pub fn is_idle(&self) -> bool {
        self.task_manager.in_flight() == 0 && self.completions.is_empty()
    }
}

fn model_matrix(chunk: &Chunk) -> Matrix4<f32> {
    let origin = chunk.origin();
    Matrix4::from_translation(Vector3::new(origin.x as f32, 0.0, origin.y as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        rendering::build_chunk_mesh, task_management::task::TaskResult,
        voxels::chunk::MeshBuffers,
    };

    #[derive(Default)]
    struct RecordingShader {
        models: Vec<Matrix4<f32>>,
        index_counts: Vec<usize>,
    }

    impl SurfaceShader for RecordingShader {
        fn set_model_matrix(&mut self, model: Matrix4<f32>) {
            self.models.push(model);
        }

        fn draw_interleaved(&mut self, buffers: &MeshBuffers) {
            self.index_counts.push(buffers.index_count());
        }
    }

    fn single_worker() -> Terrain {
        Terrain::new(TerrainConfig {
            worker_count: Some(1),
            ..TerrainConfig::default()
        })
    }

    fn settle(terrain: &mut Terrain) {
        for _ in 0..2000 {
            terrain.check_thread_results();
            if terrain.is_idle() {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        panic!("terrain never went idle");
    }

    /// Waits until every published task has been deposited, without draining.
    fn wait_for_workers(terrain: &Terrain) {
        for _ in 0..2000 {
            if terrain.task_manager.in_flight() == 0 {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        panic!("workers never drained");
    }

    fn fill_below(chunk: &Chunk, top: i32, block_type: BlockType) {
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_WIDTH {
                for y in 0..top {
                    chunk.set_block_at(x, y, z, block_type).unwrap();
                }
            }
        }
    }

    fn installed_indices(chunk: &Chunk) -> Option<usize> {
        chunk.opaque_buffers().as_ref().map(MeshBuffers::index_count)
    }

    #[test]
    fn zone_instantiation_creates_sixteen_chunks() {
        let mut terrain = single_worker();
        terrain.instantiate_zone_at(-10, 70);

        assert!(terrain.has_zone_at(-64, 64));
        assert_eq!(terrain.store().chunk_count(), 16);
        assert!(terrain.has_chunk_at(-64, 64));
        assert!(terrain.has_chunk_at(-1, 127));
        assert!(!terrain.has_chunk_at(0, 64));

        settle(&mut terrain);
        for chunk in terrain.store().zone_chunks(-64, 64) {
            assert_eq!(chunk.state(), ChunkState::MeshReady);
        }
    }

    #[test]
    fn draw_issues_opaque_then_transparent_passes() {
        let mut terrain = single_worker();
        let chunk = terrain.store().instantiate_chunk_at(16, 32);
        chunk.set_block_at(0, 10, 0, BlockType::Stone).unwrap();
        chunk.set_block_at(5, 10, 5, BlockType::Water).unwrap();
        chunk.set_state(ChunkState::BlockDataPopulated);

        terrain.create_zone_buffers(16, 32);
        settle(&mut terrain);

        let mut shader = RecordingShader::default();
        terrain.draw(0, 64, 0, 64, &mut shader);

        let translation = Matrix4::from_translation(Vector3::new(16.0, 0.0, 32.0));
        assert_eq!(shader.models, vec![translation, translation]);
        assert_eq!(shader.index_counts, vec![36, 36]);
    }

    #[test]
    fn draw_skips_chunks_without_meshes() {
        let terrain = single_worker();
        terrain.store().instantiate_chunk_at(0, 0);

        let mut shader = RecordingShader::default();
        terrain.draw(0, 16, 0, 16, &mut shader);
        assert!(shader.models.is_empty());
    }

    #[test]
    fn destroying_a_zone_keeps_its_blocks() {
        let mut terrain = single_worker();
        terrain.instantiate_zone_at(0, 0);
        settle(&mut terrain);
        let before = terrain.get_block_at(5, 0, 5).unwrap();

        terrain.destroy_zone_at(0, 0);
        for chunk in terrain.store().zone_chunks(0, 0) {
            assert!(!chunk.has_mesh_data());
            assert_eq!(chunk.state(), ChunkState::BlockDataPopulated);
        }
        assert_eq!(terrain.get_block_at(5, 0, 5), Ok(before));
        assert_eq!(before, BlockType::Bedrock);
    }

    #[test]
    fn timer_gates_the_control_loop() {
        let mut terrain = Terrain::new(TerrainConfig {
            worker_count: Some(1),
            render_radius_zones: 1,
            ..TerrainConfig::default()
        });
        let origin = Point3::new(0.0, 150.0, 0.0);

        terrain.multithreaded_work(origin, origin, 0.2);
        assert_eq!(terrain.store().zone_count(), 0);

        terrain.multithreaded_work(origin, origin, 0.3);
        assert_eq!(terrain.store().zone_count(), 9);
        assert!(terrain.has_zone_at(-64, -64));
        assert!(!terrain.has_zone_at(-128, 0));
    }

    #[test]
    fn edits_are_remeshed_across_borders() {
        let mut terrain = single_worker();
        let west = terrain.store().instantiate_chunk_at(0, 0);
        let east = terrain.store().instantiate_chunk_at(16, 0);
        for chunk in [&west, &east] {
            chunk.set_state(ChunkState::BlockDataPopulated);
        }
        terrain.create_zone_buffers(0, 0);
        settle(&mut terrain);

        terrain.edit_block_at(15, 20, 3, BlockType::Stone).unwrap();
        assert_eq!(west.state(), ChunkState::MeshBuilding);
        assert_eq!(east.state(), ChunkState::MeshBuilding);
        settle(&mut terrain);

        let west_mesh = west.opaque_buffers();
        assert_eq!(west_mesh.as_ref().map(MeshBuffers::index_count), Some(36));
        assert_eq!(east.state(), ChunkState::MeshReady);
    }

    #[test]
    fn late_neighbor_blocks_remesh_an_in_flight_chunk() {
        let mut terrain = single_worker();
        let west = terrain.store().instantiate_chunk_at(0, 0);
        let east = terrain.store().instantiate_chunk_at(16, 0);

        // West is meshed while east is still empty; the result waits undrained.
        fill_below(&west, 10, BlockType::Stone);
        west.set_state(ChunkState::BlockDataPopulated);
        terrain.create_zone_buffers(0, 0);
        assert_eq!(east.state(), ChunkState::AllocatedEmpty);
        wait_for_workers(&terrain);

        fill_below(&east, 10, BlockType::Stone);
        east.set_state(ChunkState::BlockDataPopulated);
        TaskResult::BlocksReady(east.clone()).handle_result(&terrain.completions);

        terrain.check_thread_results();
        settle(&mut terrain);

        assert_eq!(west.state(), ChunkState::MeshReady);
        assert_eq!(east.state(), ChunkState::MeshReady);
        // No wall left on the shared border.
        assert_eq!(
            installed_indices(&west),
            Some(build_chunk_mesh(&west).opaque.index_count())
        );
        assert_eq!(
            installed_indices(&east),
            Some(build_chunk_mesh(&east).opaque.index_count())
        );
    }

    #[test]
    fn edits_during_a_build_are_picked_up() {
        let mut terrain = single_worker();
        let chunk = terrain.store().instantiate_chunk_at(0, 0);
        chunk.set_state(ChunkState::BlockDataPopulated);
        terrain.create_zone_buffers(0, 0);
        wait_for_workers(&terrain);

        terrain.edit_block_at(7, 40, 7, BlockType::Stone).unwrap();
        assert_eq!(chunk.state(), ChunkState::MeshBuilding);
        settle(&mut terrain);

        assert_eq!(chunk.state(), ChunkState::MeshReady);
        assert_eq!(installed_indices(&chunk), Some(36));
    }

    #[test]
    fn edits_to_unmeshed_chunks_wait_for_streaming() {
        let mut terrain = single_worker();
        let chunk = terrain.store().instantiate_chunk_at(0, 0);
        chunk.set_state(ChunkState::BlockDataPopulated);

        terrain.edit_block_at(3, 40, 3, BlockType::Stone).unwrap();
        assert_eq!(chunk.state(), ChunkState::BlockDataPopulated);
        assert_eq!(terrain.task_manager.in_flight(), 0);
        settle(&mut terrain);

        assert!(!chunk.has_mesh_data());
        assert_eq!(terrain.get_block_at(3, 40, 3), Ok(BlockType::Stone));

        // Coming back into range meshes the edited blocks.
        terrain.create_zone_buffers(0, 0);
        settle(&mut terrain);
        assert_eq!(installed_indices(&chunk), Some(36));
    }

    #[test]
    fn edits_outside_loaded_chunks_fail() {
        let mut terrain = single_worker();
        assert!(terrain.edit_block_at(0, 10, 0, BlockType::Dirt).is_err());
    }
}
