use {
    crate::index::SegmentData,
    parking_lot::Mutex,
    std::sync::Arc,
};

/// A shared, generation-counted store holding the committed index image.
///
/// Readers and writers each hold a handle; handles are cheap clones of one shared state.
/// Every commit publishes a fresh immutable snapshot and bumps the generation, which is how
/// readers detect that they are stale (`check_latest`). This is the RAM driver; the on-disk
/// codec is an external collaborator with the same publish/snapshot contract.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<StoreInner>>,
}

struct StoreInner {
    data: Arc<SegmentData>,
    generation: u64,
}

impl Store {
    /// Opens a fresh, empty in-memory store at generation zero.
    pub fn open_ram() -> Self {
        Store {
            inner: Arc::new(Mutex::new(StoreInner {
                data: Arc::new(SegmentData::default()),
                generation: 0,
            })),
        }
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Returns the committed image together with the generation it belongs to.
    pub fn snapshot(&self) -> (Arc<SegmentData>, u64) {
        let inner = self.inner.lock();
        (inner.data.clone(), inner.generation)
    }

    /// Publishes a new committed image and returns the new generation.
    pub fn publish(&self, data: SegmentData) -> u64 {
        let mut inner = self.inner.lock();
        inner.data = Arc::new(data);
        inner.generation += 1;
        inner.generation
    }

    /// Resets the store to an empty image, as when an index is created over an existing
    /// store.
    pub fn reset(&self) -> u64 {
        self.publish(SegmentData::default())
    }
}
