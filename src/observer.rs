//! In-memory core for inspecting what was logged
//!
//! Intended for tests: wire [`new`] into a core tree, log through it, then
//! assert against the returned [`ObservedLogs`].
//!
//! ```
//! use rust_logger_core::{observer, Core, Entry, Field, Level};
//!
//! let (core, logs) = observer::new(Level::Info);
//! if let Some(mut ce) = core.check(&Entry::new(Level::Warn, "disk almost full"), None) {
//!     ce.write(&[Field::new("free_mb", 12_u64)]);
//! }
//!
//! assert_eq!(logs.len(), 1);
//! assert_eq!(logs.filter_message("disk almost full").len(), 1);
//! ```

use crate::core::checked_entry::CheckedEntry;
use crate::core::encoder::add_fields;
use crate::core::error::Result;
use crate::core::field::Field;
use crate::core::log_core::{Core, CoreRef};
use crate::core::log_entry::Entry;
use crate::core::log_level::{level_of, Level, LevelEnabler};
use crate::core::memory_encoder::MapObjectEncoder;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::Arc;

/// An entry together with every field that accompanied it: context added
/// through `with` first, then the fields passed at write time.
#[derive(Debug, Clone)]
pub struct LoggedEntry {
    pub entry: Entry,
    pub context: Vec<Field>,
}

impl LoggedEntry {
    /// The context encoded into a JSON map.
    pub fn context_map(&self) -> Map<String, Value> {
        let mut enc = MapObjectEncoder::new();
        add_fields(&mut enc, &self.context);
        enc.into_fields()
    }
}

/// A concurrency-safe, ordered collection of observed entries.
#[derive(Debug, Clone, Default)]
pub struct ObservedLogs {
    logs: Arc<Mutex<Vec<LoggedEntry>>>,
}

impl ObservedLogs {
    pub fn len(&self) -> usize {
        self.logs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.lock().is_empty()
    }

    /// A copy of every observed entry, in order.
    pub fn all(&self) -> Vec<LoggedEntry> {
        self.logs.lock().clone()
    }

    /// Every observed entry, clearing the collection.
    pub fn take_all(&self) -> Vec<LoggedEntry> {
        std::mem::take(&mut *self.logs.lock())
    }

    /// A new, independent collection of the entries matching `predicate`.
    pub fn filter<F>(&self, predicate: F) -> ObservedLogs
    where
        F: Fn(&LoggedEntry) -> bool,
    {
        let matched: Vec<LoggedEntry> = self
            .logs
            .lock()
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect();
        ObservedLogs {
            logs: Arc::new(Mutex::new(matched)),
        }
    }

    pub fn filter_message(&self, msg: &str) -> ObservedLogs {
        self.filter(|e| e.entry.message == msg)
    }

    pub fn filter_message_snippet(&self, snippet: &str) -> ObservedLogs {
        self.filter(|e| e.entry.message.contains(snippet))
    }

    pub fn filter_level_exact(&self, level: Level) -> ObservedLogs {
        self.filter(|e| e.entry.level == level)
    }

    pub fn filter_logger_name(&self, name: &str) -> ObservedLogs {
        self.filter(|e| e.entry.logger_name == name)
    }

    /// Entries whose fields encode `field` to the same value.
    pub fn filter_field(&self, field: &Field) -> ObservedLogs {
        let mut enc = MapObjectEncoder::new();
        field.add_to(&mut enc);
        let wanted = enc.into_fields();
        self.filter(|e| {
            let have = e.context_map();
            wanted.iter().all(|(k, v)| have.get(k) == Some(v))
        })
    }

    pub fn filter_field_key(&self, key: &str) -> ObservedLogs {
        self.filter(|e| e.context.iter().any(|f| f.key == key))
    }

    fn add(&self, entry: LoggedEntry) {
        self.logs.lock().push(entry);
    }
}

struct ObserverCore {
    enabler: Arc<dyn LevelEnabler>,
    logs: ObservedLogs,
    context: Vec<Field>,
}

/// Create a core that buffers logs in memory, and the handle to read them.
pub fn new(enabler: impl LevelEnabler + 'static) -> (CoreRef, ObservedLogs) {
    let logs = ObservedLogs::default();
    let core = Arc::new(ObserverCore {
        enabler: Arc::new(enabler),
        logs: logs.clone(),
        context: Vec::new(),
    });
    (core, logs)
}

impl LevelEnabler for ObserverCore {
    fn enabled(&self, level: Level) -> bool {
        self.enabler.enabled(level)
    }

    fn min_level(&self) -> Option<Level> {
        Some(level_of(self.enabler.as_ref()))
    }
}

impl Core for ObserverCore {
    fn with(&self, fields: &[Field]) -> CoreRef {
        let mut context = Vec::with_capacity(self.context.len() + fields.len());
        context.extend_from_slice(&self.context);
        context.extend_from_slice(fields);
        Arc::new(ObserverCore {
            enabler: Arc::clone(&self.enabler),
            logs: self.logs.clone(),
            context,
        })
    }

    fn check(self: Arc<Self>, entry: &Entry, ce: Option<CheckedEntry>) -> Option<CheckedEntry> {
        if self.enabled(entry.level) {
            return Some(CheckedEntry::add_core(ce, entry, self));
        }
        ce
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        let mut context = Vec::with_capacity(self.context.len() + fields.len());
        context.extend_from_slice(&self.context);
        context.extend_from_slice(fields);
        self.logs.add(LoggedEntry {
            entry: entry.clone(),
            context,
        });
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}
