//! Pooled, append-only byte buffers
//!
//! Encoders serialize each entry into a [`Buffer`] checked out of a
//! [`BufferPool`]. Storage goes back to the pool when the buffer is freed or
//! dropped, so a freed buffer can never be touched again.

use super::pool::Pool;
use std::fmt;
use std::io;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Initial capacity of pooled buffers.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// A shareable handle to a pool of byte storage.
#[derive(Clone, Debug)]
pub struct BufferPool {
    storage: Arc<Pool<Vec<u8>>>,
}

impl BufferPool {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(Pool::new(|| Vec::with_capacity(DEFAULT_BUFFER_SIZE))),
        }
    }

    /// Check out an empty buffer.
    pub fn get(&self) -> Buffer {
        let mut bs = self.storage.get();
        bs.clear();
        Buffer {
            bs,
            pool: Some(self.clone()),
        }
    }

    fn put(&self, bs: Vec<u8>) {
        self.storage.put(bs);
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

fn default_pool() -> &'static BufferPool {
    static POOL: OnceLock<BufferPool> = OnceLock::new();
    POOL.get_or_init(BufferPool::new)
}

/// Check out a buffer from the process-wide default pool.
pub fn get() -> Buffer {
    default_pool().get()
}

/// A thin wrapper around a byte vector with append helpers for primitives.
pub struct Buffer {
    bs: Vec<u8>,
    pool: Option<BufferPool>,
}

impl Buffer {
    /// A buffer that is not backed by any pool.
    pub fn unpooled() -> Self {
        Self {
            bs: Vec::with_capacity(DEFAULT_BUFFER_SIZE),
            pool: None,
        }
    }

    #[inline]
    pub fn append_byte(&mut self, v: u8) {
        self.bs.push(v);
    }

    #[inline]
    pub fn append_bytes(&mut self, v: &[u8]) {
        self.bs.extend_from_slice(v);
    }

    #[inline]
    pub fn append_string(&mut self, s: &str) {
        self.bs.extend_from_slice(s.as_bytes());
    }

    pub fn append_int(&mut self, i: i64) {
        self.append_display(i);
    }

    pub fn append_uint(&mut self, i: u64) {
        self.append_display(i);
    }

    pub fn append_bool(&mut self, v: bool) {
        self.append_string(if v { "true" } else { "false" });
    }

    /// Shortest decimal representation that round-trips, never exponent form.
    pub fn append_f64(&mut self, f: f64) {
        self.append_display(f);
    }

    pub fn append_f32(&mut self, f: f32) {
        self.append_display(f);
    }

    /// Human-readable duration such as `1.5s` or `250ms`.
    pub fn append_duration(&mut self, d: Duration) {
        use std::io::Write as _;
        let _ = write!(self.bs, "{:?}", d);
    }

    fn append_display<T: fmt::Display>(&mut self, v: T) {
        use std::io::Write as _;
        // Writing into a Vec cannot fail.
        let _ = write!(self.bs, "{}", v);
    }

    pub fn len(&self) -> usize {
        self.bs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bs.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.bs.capacity()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bs
    }

    /// The last byte written, if any.
    pub fn last(&self) -> Option<u8> {
        self.bs.last().copied()
    }

    /// Truncate to zero length, keeping the backing storage.
    pub fn reset(&mut self) {
        self.bs.clear();
    }

    /// Remove a single trailing newline, if present.
    pub fn trim_newline(&mut self) {
        if self.bs.last() == Some(&b'\n') {
            self.bs.pop();
        }
    }

    /// Return the storage to its pool. The buffer is consumed.
    pub fn free(self) {
        drop(self)
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bs))
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("contents", &String::from_utf8_lossy(&self.bs))
            .field("pooled", &self.pool.is_some())
            .finish()
    }
}

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bs.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_string(s);
        Ok(())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.put(std::mem::take(&mut self.bs));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_strings() {
        let mut buf = get();
        buf.append_string("ab");
        buf.append_string("cd");
        assert_eq!(buf.to_string(), "abcd");

        buf.reset();
        assert_eq!(buf.len(), 0);
        assert!(buf.cap() >= DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_append_primitives() {
        let mut buf = Buffer::unpooled();
        buf.append_int(-42);
        buf.append_byte(b' ');
        buf.append_uint(42);
        buf.append_byte(b' ');
        buf.append_bool(true);
        buf.append_byte(b' ');
        buf.append_f64(3.25);
        buf.append_byte(b' ');
        buf.append_f32(0.5);
        buf.append_byte(b' ');
        buf.append_duration(Duration::from_millis(1500));
        assert_eq!(buf.to_string(), "-42 42 true 3.25 0.5 1.5s");
    }

    #[test]
    fn test_trim_newline() {
        let mut buf = Buffer::unpooled();
        buf.append_string("line\n");
        buf.trim_newline();
        buf.trim_newline();
        assert_eq!(buf.to_string(), "line");
    }

    #[test]
    fn test_io_write() {
        use std::io::Write;
        let mut buf = Buffer::unpooled();
        write!(buf, "{}-{}", 1, 2).unwrap();
        assert_eq!(buf.bytes(), b"1-2");
    }

    #[test]
    fn test_free_returns_storage() {
        let pool = BufferPool::new();
        let mut buf = pool.get();
        buf.append_string("payload");
        buf.free();
        assert_eq!(pool.storage.idle(), 1);

        let reused = pool.get();
        assert!(reused.is_empty());
    }
}
