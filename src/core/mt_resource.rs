use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared, lock-protected state handed to every terrain worker.
///
/// Wraps an `Arc<parking_lot::RwLock<T>>`; cloning yields another handle to the
/// same value. The terrain store keeps its chunk map in one of these so the
/// control loop and the workers see a single map.
///
/// # Examples
///
/// ```
/// use voxel_terrain::core::MtResource;
///
/// let chunks = MtResource::new(Vec::<i64>::new());
/// let worker_view = chunks.clone();
///
/// std::thread::spawn(move || worker_view.get_mut().push(7))
///     .join()
///     .unwrap();
/// assert_eq!(*chunks.get(), vec![7]);
/// ```
///
/// # Locking
/// - `get()` readers run concurrently; a queued writer blocks new readers
/// - `get_recursive()` skips that queue, so a thread holding a read guard
///   can nest another one
/// - `get_mut()` is exclusive
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Wraps `resource` in a fresh lock.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Shared read access.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read()
    }

    /// Shared read access that never waits behind a queued writer.
    pub fn get_recursive(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read_recursive()
    }

    /// Exclusive write access.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write()
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

impl<T: Send + Sync + Default> Default for MtResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_value() {
        let a = MtResource::new(vec![1, 2]);
        let b = a.clone();
        b.get_mut().push(3);
        assert_eq!(*a.get(), vec![1, 2, 3]);
    }

    #[test]
    fn recursive_reads_nest() {
        let resource = MtResource::new(5);
        let outer = resource.get();
        let inner = resource.get_recursive();
        assert_eq!(*outer + *inner, 10);
    }
}
