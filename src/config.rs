//! # Terrain Configuration
//!
//! Tunables for the streaming terrain. Every field has a default, so a host
//! can start from `TerrainConfig::default()` or load a partial JSON document:
//!
//! ```json
//! { "seed": 7, "worker_count": 3 }
//! ```

use std::{fs, path::Path};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};

/// Hard ceiling on the number of terrain worker threads.
pub const MAX_WORKER_THREADS: usize = 15;

/// Configuration for a [`Terrain`](crate::Terrain) instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Seed for the gradient-noise permutation table.
    pub seed: u32,
    /// Number of worker threads. `None` means available parallelism minus one.
    pub worker_count: Option<usize>,
    /// Seconds of accumulated frame time between two control-loop passes.
    pub expansion_interval: f32,
    /// Zones kept around the observer in each direction (2 gives a 5x5 grid).
    pub render_radius_zones: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            worker_count: None,
            expansion_interval: 0.5,
            render_radius_zones: 2,
        }
    }
}

impl TerrainConfig {
    /// Parses a configuration from a JSON string. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TerrainError::Config(e.to_string()))
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| TerrainError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }

    /// Resolves the number of worker threads to spawn.
    ///
    /// Always at least one, never more than [`MAX_WORKER_THREADS`].
    pub fn resolved_worker_count(&self) -> usize {
        let requested = match self.worker_count {
            Some(count) => count,
            None => std::thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1))
                .unwrap_or(1),
        };

        if requested > MAX_WORKER_THREADS {
            warn!(
                "Requested {} terrain workers, capping at {}",
                requested, MAX_WORKER_THREADS
            );
        }

        requested.clamp(1, MAX_WORKER_THREADS)
    }
}
