//! The minimal, fast logger capability

use super::checked_entry::CheckedEntry;
use super::error::Result;
use super::field::Field;
use super::log_entry::Entry;
use super::log_level::{Level, LevelEnabler};
use std::sync::Arc;

/// Shared handle to a core.
pub type CoreRef = Arc<dyn Core>;

/// A minimal, fast logger.
///
/// Logging is split in two: `check` decides whether an entry should be
/// written and, if so, registers the core on a [`CheckedEntry`]; `write`
/// then serializes and emits it. Cores form an immutable tree once built;
/// `with` always returns a new core.
pub trait Core: LevelEnabler {
    /// Add structured context. Siblings sharing a parent never observe each
    /// other's context.
    fn with(&self, fields: &[Field]) -> CoreRef;

    /// Determine whether the entry should be logged, adding this core (or a
    /// downstream one) to the checked entry when it should.
    fn check(self: Arc<Self>, entry: &Entry, ce: Option<CheckedEntry>) -> Option<CheckedEntry>;

    /// Serialize the entry and fields and write them to the destination.
    ///
    /// Callers normally use [`CheckedEntry::write`] rather than calling this
    /// directly; cores may assume `check` already agreed.
    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()>;

    /// Flush buffered logs, if any.
    fn sync(&self) -> Result<()>;
}

/// A core that is never enabled and never writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NopCore;

/// A no-op core.
pub fn new_nop_core() -> CoreRef {
    Arc::new(NopCore)
}

impl LevelEnabler for NopCore {
    fn enabled(&self, _level: Level) -> bool {
        false
    }

    fn min_level(&self) -> Option<Level> {
        Some(Level::Invalid)
    }
}

impl Core for NopCore {
    fn with(&self, _fields: &[Field]) -> CoreRef {
        Arc::new(NopCore)
    }

    fn check(self: Arc<Self>, _entry: &Entry, ce: Option<CheckedEntry>) -> Option<CheckedEntry> {
        ce
    }

    fn write(&self, _entry: &Entry, _fields: &[Field]) -> Result<()> {
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::level_of;

    #[test]
    fn test_nop_core() {
        let core = new_nop_core();
        for level in Level::ALL {
            assert!(!core.enabled(level));
        }
        assert_eq!(level_of(core.as_ref()), Level::Invalid);

        let entry = Entry::new(Level::Fatal, "ignored");
        assert!(core.clone().check(&entry, None).is_none());
        assert!(core.write(&entry, &[]).is_ok());
        assert!(core.with(&[Field::new("k", 1_i64)]).sync().is_ok());
    }
}
