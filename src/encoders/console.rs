//! Human-readable console encoder
//!
//! Entry metadata (time, level, logger name, caller, message) is written as
//! plain text separated by `console_separator`; structured context follows as
//! a single JSON object. A stack trace, if any, goes on its own line.

use super::json::JsonEncoder;
use crate::core::buffer::{self, Buffer};
use crate::core::encoder::{Encoder, ObjectEncoder, PrimitiveArrayEncoder};
use crate::core::encoder_config::EncoderConfig;
use crate::core::error::Result;
use crate::core::field::Field;
use crate::core::log_entry::Entry;
use crate::core::marshaler::{ArrayMarshaler, ObjectMarshaler};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Collects metadata elements as plain, unquoted text.
#[derive(Default)]
struct ElementEncoder {
    elems: Vec<String>,
}

impl PrimitiveArrayEncoder for ElementEncoder {
    fn append_bool(&mut self, value: bool) {
        self.elems.push(value.to_string());
    }

    fn append_byte_string(&mut self, value: &[u8]) {
        self.elems.push(String::from_utf8_lossy(value).into_owned());
    }

    fn append_duration(&mut self, value: Duration) {
        self.elems.push(format!("{:?}", value));
    }

    fn append_f64(&mut self, value: f64) {
        self.elems.push(value.to_string());
    }

    fn append_f32(&mut self, value: f32) {
        self.elems.push(value.to_string());
    }

    fn append_i64(&mut self, value: i64) {
        self.elems.push(value.to_string());
    }

    fn append_string(&mut self, value: &str) {
        self.elems.push(value.to_string());
    }

    fn append_time(&mut self, value: &DateTime<Utc>) {
        self.elems.push(value.to_rfc3339());
    }

    fn append_u64(&mut self, value: u64) {
        self.elems.push(value.to_string());
    }
}

/// Encodes entries for people to read.
///
/// Intended for development; the JSON encoder is the better choice for
/// anything a machine will parse.
pub struct ConsoleEncoder {
    json: JsonEncoder,
}

impl ConsoleEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            json: JsonEncoder::new(config),
        }
    }

    fn separator(&self) -> &str {
        let sep = &self.json.config().console_separator;
        if sep.is_empty() {
            "\t"
        } else {
            sep
        }
    }

    fn write_context(&self, line: &mut Buffer, fields: &[Field]) {
        let ctx = self.json.encode_context(fields);
        if ctx.is_empty() {
            return;
        }
        line.append_string(self.separator());
        line.append_byte(b'{');
        line.append_bytes(ctx.bytes());
        line.append_byte(b'}');
    }
}

impl ObjectEncoder for ConsoleEncoder {
    fn add_array(&mut self, key: &str, marshaler: &dyn ArrayMarshaler) -> Result<()> {
        self.json.add_array(key, marshaler)
    }

    fn add_object(&mut self, key: &str, marshaler: &dyn ObjectMarshaler) -> Result<()> {
        self.json.add_object(key, marshaler)
    }

    fn add_binary(&mut self, key: &str, value: &[u8]) {
        self.json.add_binary(key, value);
    }

    fn add_byte_string(&mut self, key: &str, value: &[u8]) {
        self.json.add_byte_string(key, value);
    }

    fn add_bool(&mut self, key: &str, value: bool) {
        self.json.add_bool(key, value);
    }

    fn add_duration(&mut self, key: &str, value: Duration) {
        self.json.add_duration(key, value);
    }

    fn add_f64(&mut self, key: &str, value: f64) {
        self.json.add_f64(key, value);
    }

    fn add_f32(&mut self, key: &str, value: f32) {
        self.json.add_f32(key, value);
    }

    fn add_i64(&mut self, key: &str, value: i64) {
        self.json.add_i64(key, value);
    }

    fn add_string(&mut self, key: &str, value: &str) {
        self.json.add_string(key, value);
    }

    fn add_time(&mut self, key: &str, value: &DateTime<Utc>) {
        self.json.add_time(key, value);
    }

    fn add_u64(&mut self, key: &str, value: u64) {
        self.json.add_u64(key, value);
    }

    fn add_reflected(&mut self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.json.add_reflected(key, value)
    }

    fn open_namespace(&mut self, key: &str) {
        self.json.open_namespace(key);
    }
}

impl Encoder for ConsoleEncoder {
    fn clone_encoder(&self) -> Box<dyn Encoder> {
        Box::new(ConsoleEncoder {
            json: self.json.clone_json(),
        })
    }

    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Buffer> {
        let config = self.json.config();
        if !config.time_key.is_empty() {
            config.encode_time.validate()?;
        }
        let mut line = buffer::get();

        let mut arr = ElementEncoder::default();
        if !config.time_key.is_empty() {
            config.encode_time.encode(&entry.time, &mut arr);
        }
        if !config.level_key.is_empty() {
            config.encode_level.encode(entry.level, &mut arr);
        }
        if !entry.logger_name.is_empty() && !config.name_key.is_empty() {
            config.encode_name.encode(&entry.logger_name, &mut arr);
        }
        if entry.caller.defined {
            if !config.caller_key.is_empty() {
                config.encode_caller.encode(&entry.caller, &mut arr);
            }
            if !config.function_key.is_empty() {
                arr.append_string(&entry.caller.function);
            }
        }
        if !config.message_key.is_empty() {
            arr.append_string(&entry.message);
        }

        for (i, elem) in arr.elems.iter().enumerate() {
            if i > 0 {
                line.append_string(self.separator());
            }
            line.append_string(elem);
        }

        self.write_context(&mut line, fields);

        if !entry.stack.is_empty() && !config.stacktrace_key.is_empty() {
            line.append_byte(b'\n');
            line.append_string(&entry.stack);
        }
        line.append_string(config.line_ending());
        Ok(line)
    }

    fn as_object_encoder(&mut self) -> &mut dyn ObjectEncoder {
        self
    }
}
