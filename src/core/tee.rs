//! Fan-out across several cores

use super::checked_entry::CheckedEntry;
use super::error::{MultiError, Result};
use super::field::Field;
use super::log_core::{new_nop_core, Core, CoreRef};
use super::log_entry::Entry;
use super::log_level::{level_of, Level, LevelEnabler};
use std::sync::Arc;

/// Duplicates log entries into each of its children.
pub struct MultiCore {
    cores: Vec<CoreRef>,
}

/// Combine several cores into one.
///
/// No cores yields a no-op core and a single core is returned unchanged.
pub fn new_tee(mut cores: Vec<CoreRef>) -> CoreRef {
    match cores.len() {
        0 => new_nop_core(),
        1 => cores.swap_remove(0),
        _ => Arc::new(MultiCore { cores }),
    }
}

impl MultiCore {
    pub fn cores(&self) -> &[CoreRef] {
        &self.cores
    }
}

impl LevelEnabler for MultiCore {
    fn enabled(&self, level: Level) -> bool {
        self.cores.iter().any(|c| c.enabled(level))
    }

    /// The minimum level across all children.
    fn min_level(&self) -> Option<Level> {
        self.cores.iter().map(|c| level_of(c.as_ref())).min()
    }
}

impl Core for MultiCore {
    fn with(&self, fields: &[Field]) -> CoreRef {
        Arc::new(MultiCore {
            cores: self.cores.iter().map(|c| c.with(fields)).collect(),
        })
    }

    fn check(self: Arc<Self>, entry: &Entry, ce: Option<CheckedEntry>) -> Option<CheckedEntry> {
        self.cores
            .iter()
            .fold(ce, |ce, core| Arc::clone(core).check(entry, ce))
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        let mut errors = MultiError::new();
        for core in &self.cores {
            errors.push_result(core.write(entry, fields));
        }
        errors.into_result()
    }

    fn sync(&self) -> Result<()> {
        let mut errors = MultiError::new();
        for core in &self.cores {
            errors.push_result(core.sync());
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LoggerError;
    use crate::observer;

    struct FailingCore {
        message: &'static str,
    }

    impl LevelEnabler for FailingCore {
        fn enabled(&self, _level: Level) -> bool {
            true
        }
    }

    impl Core for FailingCore {
        fn with(&self, _fields: &[Field]) -> CoreRef {
            Arc::new(FailingCore {
                message: self.message,
            })
        }

        fn check(self: Arc<Self>, entry: &Entry, ce: Option<CheckedEntry>) -> Option<CheckedEntry> {
            Some(CheckedEntry::add_core(ce, entry, self))
        }

        fn write(&self, _entry: &Entry, _fields: &[Field]) -> Result<()> {
            Err(LoggerError::other(self.message))
        }

        fn sync(&self) -> Result<()> {
            Err(LoggerError::other(self.message))
        }
    }

    #[test]
    fn test_tee_of_nothing_is_nop() {
        let core = new_tee(Vec::new());
        assert!(!core.enabled(Level::Fatal));
        assert_eq!(level_of(core.as_ref()), Level::Invalid);
    }

    #[test]
    fn test_tee_of_one_is_unwrapped() {
        let (inner, _) = observer::new(Level::Info);
        let core = new_tee(vec![inner.clone()]);
        assert!(Arc::ptr_eq(&core, &inner));
    }

    #[test]
    fn test_fan_out_respects_each_level() {
        let (debug_core, debug_logs) = observer::new(Level::Debug);
        let (warn_core, warn_logs) = observer::new(Level::Warn);
        let tee = new_tee(vec![debug_core, warn_core]);

        assert_eq!(level_of(tee.as_ref()), Level::Debug);
        for (level, msg) in [(Level::Debug, "d"), (Level::Info, "i"), (Level::Error, "e")] {
            let entry = Entry::new(level, msg);
            if let Some(mut ce) = tee.clone().check(&entry, None) {
                ce.write(&[]);
            }
        }

        assert_eq!(debug_logs.len(), 3);
        assert_eq!(warn_logs.len(), 1);
        assert_eq!(warn_logs.all()[0].entry.message, "e");
    }

    #[test]
    fn test_with_applies_to_all_children() {
        let (a, a_logs) = observer::new(Level::Debug);
        let (b, b_logs) = observer::new(Level::Debug);
        let tee = new_tee(vec![a, b]).with(&[Field::new("request", 7_i64)]);

        tee.write(&Entry::new(Level::Info, "x"), &[]).unwrap();
        for logs in [a_logs, b_logs] {
            let all = logs.all();
            assert_eq!(all.len(), 1);
            assert_eq!(all[0].context.len(), 1);
            assert_eq!(all[0].context[0].key, "request");
        }
    }

    #[test]
    fn test_write_aggregates_errors_and_continues() {
        let (good, logs) = observer::new(Level::Debug);
        let tee = new_tee(vec![
            Arc::new(FailingCore { message: "first" }),
            good,
            Arc::new(FailingCore { message: "second" }),
        ]);

        let err = tee.write(&Entry::new(Level::Info, "x"), &[]).unwrap_err();
        assert_eq!(logs.len(), 1);
        let messages: Vec<String> = err.errors().iter().map(|e| e.to_string()).collect();
        assert_eq!(messages, vec!["first", "second"]);

        let err = tee.sync().unwrap_err();
        assert_eq!(err.errors().len(), 2);
    }

    #[test]
    fn test_single_failure_is_not_wrapped() {
        let (good, _) = observer::new(Level::Debug);
        let tee = new_tee(vec![good, Arc::new(FailingCore { message: "only" })]);
        let err = tee.sync().unwrap_err();
        assert!(matches!(err, LoggerError::Other(ref m) if m == "only"));
    }
}
