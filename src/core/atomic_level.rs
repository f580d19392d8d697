//! Lock-free, runtime-adjustable logging threshold
//!
//! An `AtomicLevel` is a cheap handle around a shared atomic word. Cloning
//! it shares the underlying level, so every core built on top of the same
//! handle observes a `set_level` immediately.

use super::error::LoggerError;
use super::log_level::{Level, LevelEnabler};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI8, Ordering};
use std::sync::Arc;

/// A dynamic logging level shared by a tree of cores.
///
/// # Example
///
/// ```
/// use rust_logger_core::{AtomicLevel, Level, LevelEnabler};
///
/// let level = AtomicLevel::new();
/// let shared = level.clone();
///
/// level.set_level(Level::Error);
/// assert!(!shared.enabled(Level::Warn));
/// assert!(shared.enabled(Level::Error));
/// ```
#[derive(Debug, Clone)]
pub struct AtomicLevel {
    level: Arc<AtomicI8>,
}

impl AtomicLevel {
    /// Create an `AtomicLevel` enabled at `Info` and above.
    pub fn new() -> Self {
        Self::at(Level::Info)
    }

    /// Create an `AtomicLevel` enabled at `level` and above.
    pub fn at(level: Level) -> Self {
        Self {
            level: Arc::new(AtomicI8::new(level.as_i8())),
        }
    }

    /// Parse the level name and wrap it in a new `AtomicLevel`.
    pub fn parse(text: &str) -> Result<Self, LoggerError> {
        Ok(Self::at(text.parse()?))
    }

    /// The minimum enabled level.
    #[inline]
    pub fn level(&self) -> Level {
        Level::from_i8(self.level.load(Ordering::Relaxed))
    }

    /// Change the threshold for every holder of this handle.
    #[inline]
    pub fn set_level(&self, level: Level) {
        self.level.store(level.as_i8(), Ordering::Relaxed);
    }

    /// Whether two handles share the same underlying level.
    pub fn ptr_eq(&self, other: &AtomicLevel) -> bool {
        Arc::ptr_eq(&self.level, &other.level)
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelEnabler for AtomicLevel {
    #[inline]
    fn enabled(&self, level: Level) -> bool {
        self.level().enabled(level)
    }

    fn min_level(&self) -> Option<Level> {
        Some(self.level())
    }
}

impl fmt::Display for AtomicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.level(), f)
    }
}

impl FromStr for AtomicLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AtomicLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.level().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AtomicLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Level::deserialize(deserializer).map(AtomicLevel::at)
    }
}
