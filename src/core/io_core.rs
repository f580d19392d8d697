//! Leaf core binding an encoder, a sink and a level enabler

use super::checked_entry::CheckedEntry;
use super::encoder::{add_fields, Encoder};
use super::error::{LoggerError, Result};
use super::field::Field;
use super::log_core::{Core, CoreRef};
use super::log_entry::Entry;
use super::log_level::{level_of, Level, LevelEnabler};
use super::write_syncer::WriteSyncer;
use std::sync::Arc;

/// Writes entries that pass its level enabler to one sink through one
/// encoder.
pub struct IoCore {
    enabler: Arc<dyn LevelEnabler>,
    encoder: Box<dyn Encoder>,
    out: Arc<dyn WriteSyncer>,
}

/// Create a core that writes logs to a `WriteSyncer`.
pub fn new_core(
    encoder: Box<dyn Encoder>,
    out: Arc<dyn WriteSyncer>,
    enabler: impl LevelEnabler + 'static,
) -> CoreRef {
    Arc::new(IoCore {
        enabler: Arc::new(enabler),
        encoder,
        out,
    })
}

impl LevelEnabler for IoCore {
    fn enabled(&self, level: Level) -> bool {
        self.enabler.enabled(level)
    }

    fn min_level(&self) -> Option<Level> {
        Some(level_of(self.enabler.as_ref()))
    }
}

impl Core for IoCore {
    fn with(&self, fields: &[Field]) -> CoreRef {
        let mut encoder = self.encoder.clone_encoder();
        add_fields(encoder.as_object_encoder(), fields);
        Arc::new(IoCore {
            enabler: Arc::clone(&self.enabler),
            encoder,
            out: Arc::clone(&self.out),
        })
    }

    fn check(self: Arc<Self>, entry: &Entry, ce: Option<CheckedEntry>) -> Option<CheckedEntry> {
        if self.enabled(entry.level) {
            return Some(CheckedEntry::add_core(ce, entry, self));
        }
        ce
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        let buf = self.encoder.encode_entry(entry, fields)?;
        self.out
            .write(buf.bytes())
            .map_err(|e| LoggerError::io_operation("writing entry", e))?;
        buf.free();

        if entry.level > Level::Error {
            // A panic or exit may follow; push buffered output out first.
            // Sync failures here are deliberately dropped.
            let _ = self.sync();
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.out
            .sync()
            .map_err(|e| LoggerError::io_operation("syncing output", e))
    }
}
