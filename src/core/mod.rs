//! # Core Module
//!
//! Concurrency primitives shared by the terrain store and its workers.
//!
//! ## Key Components
//! - `MtResource`: an `Arc`-shared value behind a `parking_lot` reader-writer lock
//!
//! ## Usage
//! ```rust
//! use voxel_terrain::core::MtResource;
//!
//! let zones = MtResource::new(std::collections::HashSet::new());
//! zones.get_mut().insert((0, 0));
//! assert!(zones.get().contains(&(0, 0)));
//! ```

pub mod mt_resource;

pub use mt_resource::MtResource;
