//! Encoder configuration
//!
//! Keys and the small formatting policies (level, time, duration, caller and
//! logger name) shared by the concrete encoders. Every policy is a plain enum
//! so a whole `EncoderConfig` can be deserialized from configuration files.

use super::encoder::PrimitiveArrayEncoder;
use super::error::{LoggerError, Result};
use super::log_entry::EntryCaller;
use super::log_level::Level;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Write as _;
use std::time::Duration;

/// Default line ending appended after each encoded entry.
pub const DEFAULT_LINE_ENDING: &str = "\n";

const ISO8601_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// How levels are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelEncoder {
    /// `info`
    #[default]
    Lowercase,
    /// `info`, wrapped in ANSI color codes.
    #[serde(alias = "color")]
    LowercaseColor,
    /// `INFO`
    Capital,
    /// `INFO`, wrapped in ANSI color codes.
    CapitalColor,
}

impl LevelEncoder {
    pub fn encode(&self, level: Level, enc: &mut dyn PrimitiveArrayEncoder) {
        match self {
            LevelEncoder::Lowercase => enc.append_string(level.to_str()),
            LevelEncoder::Capital => enc.append_string(level.capital_str()),
            LevelEncoder::LowercaseColor => enc.append_string(&colorize(level, level.to_str())),
            LevelEncoder::CapitalColor => {
                enc.append_string(&colorize(level, level.capital_str()))
            }
        }
    }
}

#[cfg(feature = "console")]
fn colorize(level: Level, text: &str) -> String {
    use colored::Colorize;
    text.color(level.color_code()).to_string()
}

#[cfg(not(feature = "console"))]
fn colorize(_level: Level, text: &str) -> String {
    text.to_string()
}

/// How entry timestamps (and time fields) are rendered.
///
/// # Examples
///
/// ```
/// use rust_logger_core::core::encoder_config::TimeEncoder;
///
/// // Apache log format
/// let format = TimeEncoder::Layout("%d/%b/%Y:%H:%M:%S %z".to_string());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeEncoder {
    /// Floating-point seconds since the Unix epoch: `1736332245.123456`
    #[default]
    Epoch,
    /// Floating-point milliseconds since the Unix epoch: `1736332245123.456`
    #[serde(rename = "millis")]
    EpochMillis,
    /// Integer nanoseconds since the Unix epoch.
    #[serde(rename = "nanos")]
    EpochNanos,
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,
    /// RFC 3339 at second precision: `2025-01-08T10:30:45Z`
    Rfc3339,
    /// RFC 3339 with nanoseconds: `2025-01-08T10:30:45.123456789Z`
    #[serde(rename = "rfc3339nano")]
    Rfc3339Nano,
    /// Custom strftime layout.
    Layout(String),
}

impl TimeEncoder {
    /// Reject a custom layout chrono cannot render.
    pub fn validate(&self) -> Result<()> {
        if let TimeEncoder::Layout(layout) = self {
            if StrftimeItems::new(layout).any(|item| matches!(item, Item::Error)) {
                return Err(LoggerError::encoder(
                    "time",
                    format!("invalid time layout {:?}", layout),
                ));
            }
        }
        Ok(())
    }

    pub fn encode(&self, t: &DateTime<Utc>, enc: &mut dyn PrimitiveArrayEncoder) {
        match self {
            TimeEncoder::Epoch => {
                let secs = t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) / 1e9;
                enc.append_f64(secs);
            }
            TimeEncoder::EpochMillis => {
                let millis =
                    t.timestamp() as f64 * 1e3 + f64::from(t.timestamp_subsec_nanos()) / 1e6;
                enc.append_f64(millis);
            }
            TimeEncoder::EpochNanos => enc.append_i64(
                t.timestamp_nanos_opt()
                    .unwrap_or_else(|| t.timestamp_micros().saturating_mul(1000)),
            ),
            TimeEncoder::Iso8601 => enc.append_string(&t.format(ISO8601_LAYOUT).to_string()),
            TimeEncoder::Rfc3339 => enc.append_string(&t.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            TimeEncoder::Rfc3339Nano => {
                enc.append_string(&t.format("%Y-%m-%dT%H:%M:%S%.9fZ").to_string())
            }
            TimeEncoder::Layout(layout) => {
                let mut text = String::new();
                // An unrenderable layout falls back to ISO 8601.
                if write!(text, "{}", t.format(layout)).is_err() {
                    text = t.format(ISO8601_LAYOUT).to_string();
                }
                enc.append_string(&text);
            }
        }
    }
}

/// How durations are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationEncoder {
    /// Floating-point seconds.
    #[default]
    Seconds,
    /// Integer nanoseconds.
    Nanos,
    /// Floating-point milliseconds.
    #[serde(rename = "ms")]
    Millis,
    /// Human-readable text such as `1.5s`.
    String,
}

impl DurationEncoder {
    pub fn encode(&self, d: Duration, enc: &mut dyn PrimitiveArrayEncoder) {
        match self {
            DurationEncoder::Seconds => enc.append_f64(d.as_secs_f64()),
            DurationEncoder::Nanos => {
                enc.append_i64(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
            }
            DurationEncoder::Millis => enc.append_f64(d.as_nanos() as f64 / 1e6),
            DurationEncoder::String => enc.append_string(&format!("{:?}", d)),
        }
    }
}

/// How caller locations are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerEncoder {
    /// `dir/file.rs:42`
    #[default]
    Short,
    /// `/abs/path/to/dir/file.rs:42`
    Full,
}

impl CallerEncoder {
    pub fn encode(&self, caller: &EntryCaller, enc: &mut dyn PrimitiveArrayEncoder) {
        match self {
            CallerEncoder::Short => enc.append_string(&caller.trimmed_path()),
            CallerEncoder::Full => enc.append_string(&caller.full_path()),
        }
    }
}

/// How logger names are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameEncoder {
    #[default]
    Full,
}

impl NameEncoder {
    pub fn encode(&self, name: &str, enc: &mut dyn PrimitiveArrayEncoder) {
        match self {
            NameEncoder::Full => enc.append_string(name),
        }
    }
}

/// Keys and formatting policies for an encoder. An empty key omits that
/// element of the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub message_key: String,
    pub level_key: String,
    pub time_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub function_key: String,
    pub stacktrace_key: String,
    pub skip_line_ending: bool,
    pub line_ending: String,
    pub encode_level: LevelEncoder,
    #[serde(deserialize_with = "deserialize_time_encoder")]
    pub encode_time: TimeEncoder,
    pub encode_duration: DurationEncoder,
    pub encode_caller: CallerEncoder,
    pub encode_name: NameEncoder,
    /// Separator between elements of console output.
    pub console_separator: String,
}

impl EncoderConfig {
    /// Machine-oriented defaults: short keys, epoch timestamps.
    pub fn production() -> Self {
        Self {
            message_key: "msg".to_string(),
            level_key: "level".to_string(),
            time_key: "ts".to_string(),
            name_key: "logger".to_string(),
            caller_key: "caller".to_string(),
            function_key: String::new(),
            stacktrace_key: "stacktrace".to_string(),
            skip_line_ending: false,
            line_ending: DEFAULT_LINE_ENDING.to_string(),
            encode_level: LevelEncoder::Lowercase,
            encode_time: TimeEncoder::Epoch,
            encode_duration: DurationEncoder::Seconds,
            encode_caller: CallerEncoder::Short,
            encode_name: NameEncoder::Full,
            console_separator: "\t".to_string(),
        }
    }

    /// Human-oriented defaults: single-letter keys, ISO 8601 timestamps.
    pub fn development() -> Self {
        Self {
            message_key: "M".to_string(),
            level_key: "L".to_string(),
            time_key: "T".to_string(),
            name_key: "N".to_string(),
            caller_key: "C".to_string(),
            function_key: String::new(),
            stacktrace_key: "S".to_string(),
            encode_level: LevelEncoder::Capital,
            encode_time: TimeEncoder::Iso8601,
            encode_duration: DurationEncoder::String,
            ..Self::production()
        }
    }

    /// Check the policies that can only fail at format time.
    pub fn validate(&self) -> Result<()> {
        self.encode_time.validate()
    }

    /// The line ending to append, honouring `skip_line_ending`.
    pub fn line_ending(&self) -> &str {
        if self.skip_line_ending {
            ""
        } else if self.line_ending.is_empty() {
            DEFAULT_LINE_ENDING
        } else {
            &self.line_ending
        }
    }
}

fn deserialize_time_encoder<'de, D>(deserializer: D) -> std::result::Result<TimeEncoder, D::Error>
where
    D: Deserializer<'de>,
{
    let encoder = TimeEncoder::deserialize(deserializer)?;
    encoder.validate().map_err(serde::de::Error::custom)?;
    Ok(encoder)
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::production()
    }
}
