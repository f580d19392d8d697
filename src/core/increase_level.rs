//! Raising the minimum level of an existing core

use super::checked_entry::CheckedEntry;
use super::error::{LoggerError, Result};
use super::field::Field;
use super::log_core::{Core, CoreRef};
use super::log_entry::Entry;
use super::log_level::{level_of, Level, LevelEnabler};
use std::sync::Arc;

/// A core that only lets through entries its own enabler allows, on top of
/// whatever the wrapped core allows.
pub struct LevelFilterCore {
    core: CoreRef,
    level: Arc<dyn LevelEnabler>,
}

/// Wrap `core` so that it only logs at `level` and above.
///
/// Fails if `level` enables anything the wrapped core does not, since that
/// would lower rather than raise the threshold.
pub fn new_increase_level_core(
    core: CoreRef,
    level: impl LevelEnabler + 'static,
) -> Result<CoreRef> {
    for l in Level::ALL.iter().rev().copied() {
        if !core.enabled(l) && level.enabled(l) {
            return Err(LoggerError::InvalidIncreaseLevel {
                level: l.to_string(),
            });
        }
    }

    Ok(Arc::new(LevelFilterCore {
        core,
        level: Arc::new(level),
    }))
}

impl LevelEnabler for LevelFilterCore {
    fn enabled(&self, level: Level) -> bool {
        self.level.enabled(level)
    }

    fn min_level(&self) -> Option<Level> {
        Some(level_of(self.level.as_ref()))
    }
}

impl Core for LevelFilterCore {
    fn with(&self, fields: &[Field]) -> CoreRef {
        Arc::new(LevelFilterCore {
            core: self.core.with(fields),
            level: Arc::clone(&self.level),
        })
    }

    fn check(self: Arc<Self>, entry: &Entry, ce: Option<CheckedEntry>) -> Option<CheckedEntry> {
        if !self.enabled(entry.level) {
            return ce;
        }
        Arc::clone(&self.core).check(entry, ce)
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        self.core.write(entry, fields)
    }

    fn sync(&self) -> Result<()> {
        self.core.sync()
    }
}
