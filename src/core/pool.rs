//! Thread-safe free-list for reusable objects

use crossbeam_channel::{bounded, Receiver, Sender};

/// Default number of idle objects a pool retains.
pub const DEFAULT_POOL_CAPACITY: usize = 256;

/// A bounded free-list of reusable values.
///
/// `get` hands out an idle value or builds a fresh one; `put` returns a value
/// for reuse and silently drops it when the pool is already full. Both are
/// safe to call concurrently. A value that has been handed out is owned by
/// exactly one caller until it is put back.
pub struct Pool<T> {
    idle_tx: Sender<T>,
    idle_rx: Receiver<T>,
    new: fn() -> T,
}

impl<T> Pool<T> {
    pub fn new(new: fn() -> T) -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY, new)
    }

    pub fn with_capacity(capacity: usize, new: fn() -> T) -> Self {
        let (idle_tx, idle_rx) = bounded(capacity);
        Self {
            idle_tx,
            idle_rx,
            new,
        }
    }

    pub fn get(&self) -> T {
        self.idle_rx.try_recv().unwrap_or_else(|_| (self.new)())
    }

    pub fn put(&self, value: T) {
        let _ = self.idle_tx.try_send(value);
    }

    /// Number of idle values currently held.
    pub fn idle(&self) -> usize {
        self.idle_rx.len()
    }
}

impl<T> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_builds_when_empty() {
        let pool: Pool<Vec<u8>> = Pool::new(|| Vec::with_capacity(8));
        let v = pool.get();
        assert!(v.capacity() >= 8);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_put_then_get_reuses() {
        let pool: Pool<Vec<u8>> = Pool::new(Vec::new);
        let mut v = pool.get();
        v.extend_from_slice(b"marker");
        pool.put(v);
        assert_eq!(pool.idle(), 1);

        let reused = pool.get();
        assert_eq!(reused, b"marker");
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_put_beyond_capacity_drops() {
        let pool: Pool<u32> = Pool::with_capacity(2, || 0);
        pool.put(1);
        pool.put(2);
        pool.put(3);
        assert_eq!(pool.idle(), 2);
    }
}
