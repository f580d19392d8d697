//! Deferred context attachment

use super::checked_entry::CheckedEntry;
use super::error::Result;
use super::field::Field;
use super::log_core::{Core, CoreRef};
use super::log_entry::Entry;
use super::log_level::{level_of, Level, LevelEnabler};
use std::sync::{Arc, OnceLock};

/// Holds context fields back until the core is actually used.
///
/// Child loggers that never log never pay for encoding their context.
pub struct LazyWithCore {
    core: CoreRef,
    fields: Vec<Field>,
    materialized: OnceLock<CoreRef>,
}

/// Wrap `core` so that `fields` are only added on first use.
pub fn new_lazy_with(core: CoreRef, fields: Vec<Field>) -> CoreRef {
    Arc::new(LazyWithCore {
        core,
        fields,
        materialized: OnceLock::new(),
    })
}

impl LazyWithCore {
    /// The wrapped core with the pending fields applied, built exactly once.
    fn resolved(&self) -> &CoreRef {
        self.materialized.get_or_init(|| self.core.with(&self.fields))
    }

    /// Whether the pending fields have been applied yet.
    pub fn is_materialized(&self) -> bool {
        self.materialized.get().is_some()
    }
}

impl LevelEnabler for LazyWithCore {
    fn enabled(&self, level: Level) -> bool {
        self.core.enabled(level)
    }

    fn min_level(&self) -> Option<Level> {
        Some(level_of(self.core.as_ref()))
    }
}

impl Core for LazyWithCore {
    fn with(&self, fields: &[Field]) -> CoreRef {
        self.resolved().with(fields)
    }

    fn check(self: Arc<Self>, entry: &Entry, ce: Option<CheckedEntry>) -> Option<CheckedEntry> {
        Arc::clone(self.resolved()).check(entry, ce)
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        self.resolved().write(entry, fields)
    }

    fn sync(&self) -> Result<()> {
        match self.materialized.get() {
            Some(core) => core.sync(),
            None => self.core.sync(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Counts how many times `with` is called on it.
    struct CountingCore {
        inner: CoreRef,
        withs: Arc<AtomicUsize>,
    }

    impl LevelEnabler for CountingCore {
        fn enabled(&self, level: Level) -> bool {
            self.inner.enabled(level)
        }
    }

    impl Core for CountingCore {
        fn with(&self, fields: &[Field]) -> CoreRef {
            self.withs.fetch_add(1, Ordering::SeqCst);
            self.inner.with(fields)
        }

        fn check(self: Arc<Self>, entry: &Entry, ce: Option<CheckedEntry>) -> Option<CheckedEntry> {
            Arc::clone(&self.inner).check(entry, ce)
        }

        fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
            self.inner.write(entry, fields)
        }

        fn sync(&self) -> Result<()> {
            self.inner.sync()
        }
    }

    fn counting(level: Level) -> (CoreRef, observer::ObservedLogs, Arc<AtomicUsize>) {
        let (inner, logs) = observer::new(level);
        let withs = Arc::new(AtomicUsize::new(0));
        let core = Arc::new(CountingCore {
            inner,
            withs: withs.clone(),
        });
        (core, logs, withs)
    }

    #[test]
    fn test_unused_child_never_materializes() {
        let (base, _, withs) = counting(Level::Info);
        let lazy = new_lazy_with(base, vec![Field::new("k", "v")]);

        assert!(lazy.enabled(Level::Info));
        assert!(!lazy.enabled(Level::Debug));
        assert_eq!(level_of(lazy.as_ref()), Level::Info);
        lazy.sync().unwrap();
        assert_eq!(withs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_check_materializes_context() {
        let (base, logs, withs) = counting(Level::Info);
        let lazy = new_lazy_with(base, vec![Field::new("user", "ana")]);

        let mut ce = lazy.check(&Entry::new(Level::Info, "hi"), None).expect("enabled");
        ce.write(&[]);

        assert_eq!(withs.load(Ordering::SeqCst), 1);
        let all = logs.all();
        assert_eq!(all[0].context.len(), 1);
        assert_eq!(all[0].context[0].key, "user");
    }

    #[test]
    fn test_with_chains_after_materializing() {
        let (base, logs, withs) = counting(Level::Debug);
        let lazy = new_lazy_with(base, vec![Field::new("a", 1_i64)]);
        let child = lazy.with(&[Field::new("b", 2_i64)]);

        child.write(&Entry::new(Level::Info, "x"), &[]).unwrap();
        assert_eq!(withs.load(Ordering::SeqCst), 1);
        let keys: Vec<String> = logs.all()[0].context.iter().map(|f| f.key.clone()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_concurrent_first_use_materializes_once() {
        let (base, logs, withs) = counting(Level::Debug);
        let lazy = new_lazy_with(base, vec![Field::new("shared", true)]);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let lazy = lazy.clone();
                thread::spawn(move || {
                    let entry = Entry::new(Level::Info, format!("msg {}", i));
                    if let Some(mut ce) = lazy.check(&entry, None) {
                        ce.write(&[]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(withs.load(Ordering::SeqCst), 1);
        assert_eq!(logs.len(), 8);
    }

    #[test]
    fn test_is_materialized_tracks_first_use() {
        let (base, _, _) = counting(Level::Info);
        let lazy = Arc::new(LazyWithCore {
            core: base,
            fields: vec![Field::new("k", "v")],
            materialized: OnceLock::new(),
        });

        assert!(lazy.enabled(Level::Warn));
        assert!(!lazy.is_materialized());

        let ce = Arc::clone(&lazy).check(&Entry::new(Level::Info, "m"), None);
        assert!(ce.is_some());
        assert!(lazy.is_materialized());
    }
}
