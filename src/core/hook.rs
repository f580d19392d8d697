//! Side-effect callbacks on logged entries

use super::checked_entry::CheckedEntry;
use super::error::{MultiError, Result};
use super::field::Field;
use super::log_core::{Core, CoreRef};
use super::log_entry::Entry;
use super::log_level::{level_of, Level, LevelEnabler};
use std::sync::Arc;

/// A callback run for every entry the wrapped core decides to log. Hooks see
/// only the entry, never its fields.
pub type Hook = Arc<dyn Fn(&Entry) -> Result<()> + Send + Sync>;

/// Wrap a closure as a [`Hook`].
pub fn hook<F>(f: F) -> Hook
where
    F: Fn(&Entry) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Runs hooks alongside a wrapped core.
pub struct HookedCore {
    core: CoreRef,
    hooks: Arc<[Hook]>,
}

/// Wrap `core` so that `hooks` run, in order, for each entry it logs.
///
/// Useful for counting entries by level or forwarding alerts without
/// writing a whole core.
pub fn register_hooks(core: CoreRef, hooks: Vec<Hook>) -> CoreRef {
    Arc::new(HookedCore {
        core,
        hooks: hooks.into(),
    })
}

impl LevelEnabler for HookedCore {
    fn enabled(&self, level: Level) -> bool {
        self.core.enabled(level)
    }

    fn min_level(&self) -> Option<Level> {
        Some(level_of(self.core.as_ref()))
    }
}

impl Core for HookedCore {
    fn with(&self, fields: &[Field]) -> CoreRef {
        Arc::new(HookedCore {
            core: self.core.with(fields),
            hooks: Arc::clone(&self.hooks),
        })
    }

    fn check(self: Arc<Self>, entry: &Entry, ce: Option<CheckedEntry>) -> Option<CheckedEntry> {
        let before = ce.as_ref().map_or(0, CheckedEntry::core_count);
        let downstream = Arc::clone(&self.core).check(entry, ce)?;
        // Only register when the wrapped core itself agreed, not when a
        // sibling earlier in a tee already created the entry.
        if downstream.core_count() > before {
            return Some(CheckedEntry::add_core(Some(downstream), entry, self));
        }
        Some(downstream)
    }

    fn write(&self, entry: &Entry, _fields: &[Field]) -> Result<()> {
        let mut errors = MultiError::new();
        for hook in self.hooks.iter() {
            errors.push_result(hook(entry));
        }
        errors.into_result()
    }

    fn sync(&self) -> Result<()> {
        self.core.sync()
    }
}
