//! # Terrain Errors
//!
//! Error type shared by the terrain store, chunk accessors and configuration
//! loading. Worker tasks never produce errors; everything here surfaces to the
//! caller of a query or mutation.

use thiserror::Error;

/// Errors produced by terrain queries and configuration loading.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TerrainError {
    /// No chunk covers the requested world column.
    ///
    /// Callers such as collision code are expected to check `has_chunk_at`
    /// first; hitting this during normal play means that check was skipped.
    #[error("coordinates {x} {y} {z} have no chunk")]
    OutOfRange {
        /// World-space x
        x: i32,
        /// World-space y
        y: i32,
        /// World-space z
        z: i32,
    },

    /// A chunk-local coordinate fell outside the 16 x 256 x 16 grid.
    #[error("local coordinates {x} {y} {z} are outside the chunk grid")]
    LocalOutOfRange {
        /// Chunk-local x
        x: i32,
        /// Chunk-local y
        y: i32,
        /// Chunk-local z
        z: i32,
    },

    /// The terrain configuration could not be read or parsed.
    #[error("invalid terrain configuration: {0}")]
    Config(String),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, TerrainError>;
