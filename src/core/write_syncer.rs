//! Sink capability for encoded entries

use super::error::{LoggerError, MultiError};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// A destination for encoded log entries that can also flush buffered data.
///
/// Cores call `write` without any locking of their own; implementations that
/// wrap a shared resource must serialize access themselves (see [`Locked`]).
pub trait WriteSyncer: Send + Sync {
    fn write(&self, buf: &[u8]) -> io::Result<usize>;
    fn sync(&self) -> io::Result<()>;
}

impl<W: WriteSyncer + ?Sized> WriteSyncer for Arc<W> {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn sync(&self) -> io::Result<()> {
        (**self).sync()
    }
}

/// Wraps any `std::io::Write` in a mutex so it can be shared between
/// threads. `sync` flushes the writer.
pub struct Locked<W> {
    inner: Mutex<W>,
}

impl<W: Write + Send> Locked<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl<W: Write + Send> WriteSyncer for Locked<W> {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().write_all(buf)?;
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

/// Wraps a `std::io::Write` whose `sync` does nothing, for writers with no
/// buffering of their own.
pub struct AddSync<W> {
    inner: Mutex<W>,
}

impl<W: Write + Send> AddSync<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl<W: Write + Send> WriteSyncer for AddSync<W> {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().write_all(buf)?;
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        Ok(())
    }
}

/// A sink that drops everything written to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl WriteSyncer for Discard {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Duplicates writes and syncs to every wrapped sink.
///
/// A failing sink never prevents the others from being written; all
/// failures are reported together.
#[derive(Clone)]
pub struct MultiWriteSyncer {
    sinks: Vec<Arc<dyn WriteSyncer>>,
}

impl MultiWriteSyncer {
    pub fn new(sinks: Vec<Arc<dyn WriteSyncer>>) -> Self {
        Self { sinks }
    }
}

fn into_io_error(errors: MultiError) -> io::Result<()> {
    errors
        .into_result()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
}

impl WriteSyncer for MultiWriteSyncer {
    /// Returns the smallest non-zero byte count reported by any sink.
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        let mut errors = MultiError::new();
        let mut written = 0;
        for sink in &self.sinks {
            match sink.write(buf) {
                Ok(n) => {
                    if written == 0 || (n != 0 && n < written) {
                        written = n;
                    }
                }
                Err(err) => errors.push(LoggerError::io_operation("writing to sink", err)),
            }
        }
        into_io_error(errors)?;
        Ok(written)
    }

    fn sync(&self) -> io::Result<()> {
        let mut errors = MultiError::new();
        for sink in &self.sinks {
            if let Err(err) = sink.sync() {
                errors.push(LoggerError::io_operation("syncing sink", err));
            }
        }
        into_io_error(errors)
    }
}

/// A locked handle to standard output.
pub fn stdout() -> Arc<dyn WriteSyncer> {
    Arc::new(Locked::new(io::stdout()))
}

/// A locked handle to standard error.
pub fn stderr() -> Arc<dyn WriteSyncer> {
    Arc::new(Locked::new(io::stderr()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSink {
        attempts: AtomicUsize,
    }

    impl WriteSyncer for FailingSink {
        fn write(&self, _buf: &[u8]) -> io::Result<usize> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }

        fn sync(&self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    #[test]
    fn test_locked_writes_and_flushes() {
        let sink = Locked::new(Vec::<u8>::new());
        assert_eq!(sink.write(b"hello ").unwrap(), 6);
        sink.write(b"world").unwrap();
        sink.sync().unwrap();
        assert_eq!(sink.into_inner(), b"hello world");
    }

    #[test]
    fn test_multi_writes_all_despite_failure() {
        let good = Arc::new(Locked::new(Vec::<u8>::new()));
        let bad = Arc::new(FailingSink {
            attempts: AtomicUsize::new(0),
        });
        let multi = MultiWriteSyncer::new(vec![
            bad.clone() as Arc<dyn WriteSyncer>,
            good.clone() as Arc<dyn WriteSyncer>,
        ]);

        let err = multi.write(b"entry").unwrap_err();
        assert!(err.to_string().contains("pipe closed"));
        assert_eq!(bad.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(good.inner.lock().as_slice(), b"entry");

        assert!(multi.sync().is_err());
    }

    #[test]
    fn test_add_sync_never_flushes() {
        struct Unflushable(Vec<u8>);
        impl Write for Unflushable {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Err(io::Error::new(io::ErrorKind::Unsupported, "no flush"))
            }
        }

        let sink = AddSync::new(Unflushable(Vec::new()));
        sink.write(b"data").unwrap();
        sink.sync().unwrap();
        assert_eq!(sink.into_inner().0, b"data");
    }

    #[test]
    fn test_multi_reports_bytes_written() {
        let sinks: Vec<Arc<dyn WriteSyncer>> = vec![Arc::new(Discard), Arc::new(Discard)];
        let multi = MultiWriteSyncer::new(sinks);
        assert_eq!(multi.write(b"abc").unwrap(), 3);
        multi.sync().unwrap();
    }
}
