//! # Task Management System
//!
//! This module provides the worker pool that generates and meshes chunks off
//! the main thread.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Owns the workers and distributes tasks to them
//! - `TaskChannel`: The queue feeding one worker, plus its thread handle
//! - `TerrainTask` / `TaskResult`: The work and its outcome (see [`task`])
//! - `CompletionLists`: Where workers deposit results for the main thread
//!
//! Each worker owns the receiving end of an `mpsc` channel and blocks on it,
//! so an idle worker costs nothing. Dispatch is round-robin: every published
//! task goes to the next channel in turn, whether or not that worker is busy.
//!
//! ## Task Lifecycle
//! 1. The control loop publishes a task via `TaskManager::publish_task()`
//! 2. The task lands on the next worker's channel
//! 3. The worker processes it and pushes the result to a completion list
//! 4. The control loop drains the completion lists on its next pass
//!
//! ## Shutdown
//! Dropping the `TaskManager` closes every channel; each worker finishes the
//! tasks already queued to it, sees the disconnect and exits, and is joined.
//!
//! ## Example Usage
//! ```rust
//! use std::sync::Arc;
//! use voxel_terrain::engine_state::{
//!     task_management::{task::{CompletionLists, TerrainTask, WorkerContext}, TaskManager},
//!     voxels::{generation::ChunkGenerator, world::TerrainStore},
//! };
//!
//! let store = TerrainStore::new();
//! let completions = Arc::new(CompletionLists::default());
//! let context = WorkerContext {
//!     store: store.clone(),
//!     generator: ChunkGenerator::new(0),
//!     completions: completions.clone(),
//! };
//! let mut task_manager = TaskManager::new(2, context);
//!
//! let chunk = store.instantiate_chunk_at(0, 0);
//! task_manager.publish_task(TerrainTask::GenerateBlocks(chunk));
//!
//! drop(task_manager); // joins the workers after they drain their queues
//! assert_eq!(completions.take_blocks_ready().len(), 1);
//! ```

pub mod task;

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc::{channel, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
};

use log::{error, info};
use task::{TerrainTask, WorkerContext};

/// A communication channel between the main thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the main thread to the worker
/// - `worker`: Handle to the worker thread, joined on drop
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<TerrainTask>,
    worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and distributes terrain tasks to them.
///
/// # Fields
/// - `channels`: One channel per worker
/// - `current_channel`: Index for round-robin scheduling
/// - `in_flight`: Tasks published but not yet deposited in a completion list
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    current_channel: usize,
    in_flight: Arc<AtomicUsize>,
}

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create; at least one is always spawned
    /// * `context` - Handles cloned into every worker
    ///
    /// # Panics
    /// Panics if the operating system refuses to spawn a thread.
    pub fn new(num_workers: usize, context: WorkerContext) -> Self {
        let num_workers = num_workers.max(1);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let mut channels = Vec::with_capacity(num_workers);

        info!("Starting {} terrain workers", num_workers);

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<TerrainTask>();
            let context = context.clone();
            let in_flight = in_flight.clone();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process(&context);
                    result.handle_result(&context.completions);
                    in_flight.fetch_sub(1, Ordering::AcqRel);
                }
            };

            let worker = thread::Builder::new()
                .name(format!("terrain-worker-{}", index))
                .spawn(task_closure)
                .unwrap_or_else(|e| panic!("failed to spawn terrain worker {}: {}", index, e));

            channels.push(TaskChannel {
                task_sender: task_tx,
                worker,
            });
        }

        TaskManager {
            channels,
            current_channel: 0,
            in_flight,
        }
    }

    /// Publishes a task to the next worker in round-robin order.
    ///
    /// # Arguments
    /// * `task` - The task to run
    ///
    /// # Returns
    /// - `true` if the task was handed to a worker
    /// - `false` if that worker has exited (its thread panicked)
    pub fn publish_task(&mut self, task: TerrainTask) -> bool {
        let channel_idx = self.current_channel;
        self.current_channel = (self.current_channel + 1) % self.channels.len();

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(()) => true,
            Err(_) => {
                self.in_flight.fetch_sub(1, Ordering::AcqRel);
                error!("Terrain worker {} is gone; task dropped", channel_idx);
                false
            }
        }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Tasks published whose results have not yet been deposited.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        for channel in self.channels.drain(..) {
            let TaskChannel {
                task_sender,
                worker,
            } = channel;
            drop(task_sender);
            if worker.join().is_err() {
                error!("Terrain worker panicked");
            }
        }
    }
}
