//! Log level definitions

use super::error::LoggerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Logging priority. Higher levels are more important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(i8)]
pub enum Level {
    /// Usually voluminous, and usually disabled in production.
    Debug = -1,
    /// The default logging priority.
    #[default]
    Info = 0,
    /// More important than Info, but doesn't need individual human review.
    Warn = 1,
    /// High-priority. If an application is running smoothly, it shouldn't
    /// generate any error-level logs.
    Error = 2,
    /// Particularly important errors. In development the logger panics after
    /// writing the message.
    DPanic = 3,
    /// Logs a message, then panics.
    Panic = 4,
    /// Logs a message, then calls `process::exit(1)`.
    Fatal = 5,
    /// Sentinel above every real level; nothing is enabled at or past it.
    Invalid = 6,
}

impl Level {
    pub const MIN: Level = Level::Debug;
    pub const MAX: Level = Level::Fatal;

    /// Every real level, in ascending order.
    pub const ALL: [Level; 7] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::DPanic,
        Level::Panic,
        Level::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::DPanic => "dpanic",
            Level::Panic => "panic",
            Level::Fatal => "fatal",
            Level::Invalid => "invalid",
        }
    }

    pub fn capital_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::DPanic => "DPANIC",
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
            Level::Invalid => "INVALID",
        }
    }

    /// Whether `candidate` is at or above this threshold.
    #[inline]
    pub fn enabled(self, candidate: Level) -> bool {
        candidate >= self
    }

    pub(crate) fn as_i8(self) -> i8 {
        self as i8
    }

    pub(crate) fn from_i8(value: i8) -> Level {
        match value {
            -1 => Level::Debug,
            0 => Level::Info,
            1 => Level::Warn,
            2 => Level::Error,
            3 => Level::DPanic,
            4 => Level::Panic,
            5 => Level::Fatal,
            _ => Level::Invalid,
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Level::Debug => Magenta,
            Level::Info => Blue,
            Level::Warn => Yellow,
            Level::Error | Level::DPanic | Level::Panic | Level::Fatal => Red,
            Level::Invalid => BrightBlack,
        }
    }
}

/// Parse a level from its text representation. The empty string means `Info`.
pub fn parse_level(text: &str) -> Result<Level, LoggerError> {
    text.parse()
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            // Unmarshaling the empty string yields the default level.
            return Ok(Level::Info);
        }
        match s.to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "dpanic" => Ok(Level::DPanic),
            "panic" => Ok(Level::Panic),
            "fatal" => Ok(Level::Fatal),
            _ => Err(LoggerError::InvalidLevel(s.to_string())),
        }
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Decides whether a given logging level is enabled when logging a message.
///
/// Enablers are used to construct cores. Many enablers can share one
/// [`AtomicLevel`](super::atomic_level::AtomicLevel), which lets the
/// threshold of a whole tree of cores change at runtime.
pub trait LevelEnabler: Send + Sync {
    fn enabled(&self, level: Level) -> bool;

    /// The minimum enabled level, for enablers that track it themselves.
    ///
    /// Returning `None` makes [`level_of`] probe each level instead.
    fn min_level(&self) -> Option<Level> {
        None
    }
}

impl LevelEnabler for Level {
    fn enabled(&self, level: Level) -> bool {
        Level::enabled(*self, level)
    }

    fn min_level(&self) -> Option<Level> {
        Some(*self)
    }
}

impl<E: LevelEnabler + ?Sized> LevelEnabler for std::sync::Arc<E> {
    fn enabled(&self, level: Level) -> bool {
        (**self).enabled(level)
    }

    fn min_level(&self) -> Option<Level> {
        (**self).min_level()
    }
}

/// A [`LevelEnabler`] backed by a predicate.
pub struct LevelEnablerFn<F>(pub F);

impl<F> LevelEnabler for LevelEnablerFn<F>
where
    F: Fn(Level) -> bool + Send + Sync,
{
    fn enabled(&self, level: Level) -> bool {
        (self.0)(level)
    }
}

/// Report the minimum enabled level for `enabler`.
///
/// Uses [`LevelEnabler::min_level`] when available; otherwise returns the
/// first level from `Debug` to `Fatal` that is enabled, or `Level::Invalid`
/// if none is.
pub fn level_of<E: LevelEnabler + ?Sized>(enabler: &E) -> Level {
    if let Some(level) = enabler.min_level() {
        return level;
    }
    Level::ALL
        .iter()
        .copied()
        .find(|&level| enabler.enabled(level))
        .unwrap_or(Level::Invalid)
}
