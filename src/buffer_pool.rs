use std::{
    ops::{Deref, DerefMut},
    sync::{Arc, Mutex, PoisonError},
};

/// Initial capacity of a freshly allocated line buffer.
const LINE_CAPACITY: usize = 256;

/// Pool of reusable line buffers.
///
/// Cloning is cheap and clones share the same buffers, so one pool can be
/// handed to several loggers explicitly.
#[derive(Clone, Debug)]
pub struct BufferPool {
    inner: Arc<Mutex<PoolInner>>,
}

#[derive(Debug)]
struct PoolInner {
    buffers: Vec<Vec<u8>>,
    max_buffers: usize,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_POOL_SIZE)
    }
}

impl BufferPool {
    /// Creates a pool retaining at most `max_buffers` idle buffers.
    pub fn new(max_buffers: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PoolInner {
                buffers: Vec::with_capacity(max_buffers),
                max_buffers,
            })),
        }
    }

    /// Takes an empty buffer from the pool, allocating one if none is idle.
    pub fn get(&self) -> PooledBuffer {
        let data = self
            .lock()
            .buffers
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(LINE_CAPACITY));
        PooledBuffer {
            data,
            pool: self.clone(),
        }
    }

    /// Number of idle buffers.
    pub fn size(&self) -> usize {
        self.lock().buffers.len()
    }

    fn put_back(&self, mut buffer: Vec<u8>) {
        let mut inner = self.lock();
        if inner.buffers.len() < inner.max_buffers {
            buffer.clear();
            inner.buffers.push(buffer);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PoolInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A buffer on loan from a [`BufferPool`], returned on drop.
pub struct PooledBuffer {
    data: Vec<u8>,
    pool: BufferPool,
}

impl Deref for PooledBuffer {
    type Target = Vec<u8>;
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.put_back(std::mem::take(&mut self.data));
    }
}
