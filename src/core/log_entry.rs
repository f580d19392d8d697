//! Log entry structure

use super::buffer;
use super::log_level::Level;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::panic::Location;

/// Where a log statement was made.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct EntryCaller {
    pub defined: bool,
    pub pc: usize,
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl EntryCaller {
    /// Build a caller; when `ok` is false the caller is left undefined.
    pub fn new(pc: usize, file: impl Into<String>, line: u32, ok: bool) -> Self {
        if !ok {
            return Self::default();
        }
        Self {
            defined: true,
            pc,
            file: file.into(),
            line,
            function: String::new(),
        }
    }

    pub fn from_location(location: &Location<'_>) -> Self {
        Self::new(0, location.file(), location.line(), true)
    }

    /// The location of the code calling this function.
    #[track_caller]
    pub fn here() -> Self {
        Self::from_location(Location::caller())
    }

    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    /// `file:line`, or `undefined`.
    pub fn full_path(&self) -> String {
        if !self.defined {
            return "undefined".to_string();
        }
        let mut buf = buffer::get();
        buf.append_string(&self.file);
        buf.append_byte(b':');
        buf.append_uint(u64::from(self.line));
        buf.to_string()
    }

    /// `package/file:line`, keeping only the last directory of the path.
    pub fn trimmed_path(&self) -> String {
        if !self.defined {
            return "undefined".to_string();
        }
        let file = self.file.replace('\\', "/");
        let Some(last) = file.rfind('/') else {
            return self.full_path();
        };
        let Some(prev) = file[..last].rfind('/') else {
            return self.full_path();
        };
        let mut buf = buffer::get();
        buf.append_string(&file[prev + 1..]);
        buf.append_byte(b':');
        buf.append_uint(u64::from(self.line));
        buf.to_string()
    }
}

impl Clone for EntryCaller {
    fn clone(&self) -> Self {
        Self {
            defined: self.defined,
            pc: self.pc,
            file: self.file.clone(),
            line: self.line,
            function: self.function.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.defined = source.defined;
        self.pc = source.pc;
        self.file.clone_from(&source.file);
        self.line = source.line;
        self.function.clone_from(&source.function);
    }
}

impl fmt::Display for EntryCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

/// A single log statement.
///
/// Entries are built once per statement and only borrowed by cores; the
/// fields accompanying the statement travel separately.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct Entry {
    pub level: Level,
    pub time: DateTime<Utc>,
    pub logger_name: String,
    pub message: String,
    pub caller: EntryCaller,
    pub stack: String,
}

impl Entry {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            time: Utc::now(),
            logger_name: String::new(),
            message: message.into(),
            caller: EntryCaller::default(),
            stack: String::new(),
        }
    }

    #[must_use]
    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    #[must_use]
    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    #[must_use]
    pub fn with_caller(mut self, caller: EntryCaller) -> Self {
        self.caller = caller;
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }
}

/// `clone_from` keeps the destination's string allocations, which lets a
/// pooled entry be refilled without allocating.
impl Clone for Entry {
    fn clone(&self) -> Self {
        Self {
            level: self.level,
            time: self.time,
            logger_name: self.logger_name.clone(),
            message: self.message.clone(),
            caller: self.caller.clone(),
            stack: self.stack.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.level = source.level;
        self.time = source.time;
        self.logger_name.clone_from(&source.logger_name);
        self.message.clone_from(&source.message);
        self.caller.clone_from(&source.caller);
        self.stack.clone_from(&source.stack);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_caller() {
        let caller = EntryCaller::new(0, "main.rs", 3, false);
        assert!(!caller.defined);
        assert_eq!(caller.full_path(), "undefined");
        assert_eq!(caller.trimmed_path(), "undefined");
    }

    #[test]
    fn test_caller_paths() {
        let caller = EntryCaller::new(0, "/home/dev/project/src/core/entry.rs", 42, true);
        assert_eq!(caller.full_path(), "/home/dev/project/src/core/entry.rs:42");
        assert_eq!(caller.trimmed_path(), "core/entry.rs:42");

        let shallow = EntryCaller::new(0, "entry.rs", 7, true);
        assert_eq!(shallow.trimmed_path(), "entry.rs:7");
    }

    #[test]
    fn test_caller_here() {
        let caller = EntryCaller::here();
        assert!(caller.defined);
        assert!(caller.file.ends_with("log_entry.rs"));
        assert!(caller.line > 0);
    }

    #[test]
    fn test_entry_builders() {
        let entry = Entry::new(Level::Warn, "disk almost full")
            .with_logger_name("storage")
            .with_stack("frame 0");
        assert_eq!(entry.level, Level::Warn);
        assert_eq!(entry.logger_name, "storage");
        assert_eq!(entry.stack, "frame 0");
        assert!(!entry.caller.defined);
    }

    #[test]
    fn test_clone_from_reuses_allocations() {
        let mut pooled = Entry::new(Level::Debug, String::with_capacity(256))
            .with_caller(EntryCaller::new(0, String::with_capacity(128), 1, true));
        let message_cap = pooled.message.capacity();
        let file_cap = pooled.caller.file.capacity();

        let source = Entry::new(Level::Error, "write failed")
            .with_logger_name("db")
            .with_caller(EntryCaller::new(0, "src/db/conn.rs", 88, true).with_function("flush"));
        pooled.clone_from(&source);

        assert_eq!(pooled, source);
        assert_eq!(pooled.message.capacity(), message_cap);
        assert_eq!(pooled.caller.file.capacity(), file_cap);
    }
}
