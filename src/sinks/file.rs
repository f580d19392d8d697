//! File sink

use crate::core::error::{LoggerError, Result};
use crate::core::write_syncer::WriteSyncer;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends encoded entries to a file.
///
/// Writes are buffered; `sync` flushes the buffer and asks the OS to persist
/// the file. Writes from many threads are serialized by an internal lock.
pub struct FileSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LoggerError::io_operation(format!("opening {}", path.display()), e))?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WriteSyncer for FileSink {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        self.writer.lock().write_all(buf)?;
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        let mut writer = self.writer.lock();
        writer.flush()?;
        writer.get_ref().sync_all()
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.writer.get_mut().flush();
    }
}
