//! JSON encoder for structured logging
//!
//! Writes each entry as a single-line JSON object (JSONL), compatible with
//! log aggregation tools like ELK or Loki. Context added through `with` is
//! serialized once, when it is added, and copied into every entry after.

use crate::core::buffer::{self, Buffer};
use crate::core::encoder::{
    add_fields, ArrayEncoder, Encoder, ObjectEncoder, PrimitiveArrayEncoder,
};
use crate::core::encoder_config::EncoderConfig;
use crate::core::error::Result;
use crate::core::field::Field;
use crate::core::log_entry::Entry;
use crate::core::marshaler::{ArrayMarshaler, ObjectMarshaler};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Append `s` to `buf` as the inside of a JSON string literal.
pub(crate) fn append_escaped(buf: &mut Buffer, s: &str) {
    let bytes = s.as_bytes();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b >= 0x20 && b != b'\\' && b != b'"' {
            continue;
        }
        buf.append_bytes(&bytes[start..i]);
        match b {
            b'\\' => buf.append_string("\\\\"),
            b'"' => buf.append_string("\\\""),
            b'\n' => buf.append_string("\\n"),
            b'\r' => buf.append_string("\\r"),
            b'\t' => buf.append_string("\\t"),
            _ => {
                buf.append_string("\\u00");
                buf.append_byte(HEX[usize::from(b >> 4)]);
                buf.append_byte(HEX[usize::from(b & 0xF)]);
            }
        }
        start = i + 1;
    }
    buf.append_bytes(&bytes[start..]);
}

/// Encodes entries as JSON objects.
pub struct JsonEncoder {
    config: Arc<EncoderConfig>,
    buf: Buffer,
    open_namespaces: usize,
}

impl JsonEncoder {
    /// Create an encoder with no accumulated context.
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config: Arc::new(config),
            buf: buffer::get(),
            open_namespaces: 0,
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Independent copy, including accumulated context.
    pub(crate) fn clone_json(&self) -> JsonEncoder {
        let mut buf = buffer::get();
        buf.append_bytes(self.buf.bytes());
        JsonEncoder {
            config: Arc::clone(&self.config),
            buf,
            open_namespaces: self.open_namespaces,
        }
    }

    /// Accumulated context followed by `fields`, with every namespace
    /// closed but without the enclosing braces. Empty if there is nothing
    /// to write.
    pub(crate) fn encode_context(&self, fields: &[Field]) -> Buffer {
        let mut ctx = self.clone_json();
        add_fields(&mut ctx, fields);
        ctx.close_open_namespaces();
        ctx.buf
    }

    fn add_key(&mut self, key: &str) {
        self.add_element_separator();
        self.buf.append_byte(b'"');
        append_escaped(&mut self.buf, key);
        self.buf.append_string("\":");
    }

    fn add_element_separator(&mut self) {
        match self.buf.last() {
            None | Some(b'{' | b'[' | b':' | b',' | b' ') => {}
            Some(_) => self.buf.append_byte(b','),
        }
    }

    fn close_open_namespaces(&mut self) {
        for _ in 0..self.open_namespaces {
            self.buf.append_byte(b'}');
        }
        self.open_namespaces = 0;
    }

    fn append_float(&mut self, value: f64, display: impl FnOnce(&mut Buffer)) {
        self.add_element_separator();
        if value.is_nan() {
            self.buf.append_string("\"NaN\"");
        } else if value == f64::INFINITY {
            self.buf.append_string("\"+Inf\"");
        } else if value == f64::NEG_INFINITY {
            self.buf.append_string("\"-Inf\"");
        } else {
            display(&mut self.buf);
        }
    }
}

impl ObjectEncoder for JsonEncoder {
    fn add_array(&mut self, key: &str, marshaler: &dyn ArrayMarshaler) -> Result<()> {
        self.add_key(key);
        self.append_array(marshaler)
    }

    fn add_object(&mut self, key: &str, marshaler: &dyn ObjectMarshaler) -> Result<()> {
        self.add_key(key);
        self.append_object(marshaler)
    }

    fn add_binary(&mut self, key: &str, value: &[u8]) {
        self.add_string(key, &BASE64.encode(value));
    }

    fn add_byte_string(&mut self, key: &str, value: &[u8]) {
        self.add_key(key);
        self.append_byte_string(value);
    }

    fn add_bool(&mut self, key: &str, value: bool) {
        self.add_key(key);
        self.append_bool(value);
    }

    fn add_duration(&mut self, key: &str, value: Duration) {
        self.add_key(key);
        self.append_duration(value);
    }

    fn add_f64(&mut self, key: &str, value: f64) {
        self.add_key(key);
        self.append_f64(value);
    }

    fn add_f32(&mut self, key: &str, value: f32) {
        self.add_key(key);
        self.append_f32(value);
    }

    fn add_i64(&mut self, key: &str, value: i64) {
        self.add_key(key);
        self.append_i64(value);
    }

    fn add_string(&mut self, key: &str, value: &str) {
        self.add_key(key);
        self.append_string(value);
    }

    fn add_time(&mut self, key: &str, value: &DateTime<Utc>) {
        self.add_key(key);
        self.append_time(value);
    }

    fn add_u64(&mut self, key: &str, value: u64) {
        self.add_key(key);
        self.append_u64(value);
    }

    fn add_reflected(&mut self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.add_key(key);
        self.append_reflected(value)
    }

    fn open_namespace(&mut self, key: &str) {
        self.add_key(key);
        self.buf.append_byte(b'{');
        self.open_namespaces += 1;
    }
}

impl PrimitiveArrayEncoder for JsonEncoder {
    fn append_bool(&mut self, value: bool) {
        self.add_element_separator();
        self.buf.append_bool(value);
    }

    fn append_byte_string(&mut self, value: &[u8]) {
        self.add_element_separator();
        self.buf.append_byte(b'"');
        append_escaped(&mut self.buf, &String::from_utf8_lossy(value));
        self.buf.append_byte(b'"');
    }

    fn append_duration(&mut self, value: Duration) {
        let config = Arc::clone(&self.config);
        config.encode_duration.encode(value, self);
    }

    fn append_f64(&mut self, value: f64) {
        self.append_float(value, |buf| buf.append_f64(value));
    }

    fn append_f32(&mut self, value: f32) {
        self.append_float(f64::from(value), |buf| buf.append_f32(value));
    }

    fn append_i64(&mut self, value: i64) {
        self.add_element_separator();
        self.buf.append_int(value);
    }

    fn append_string(&mut self, value: &str) {
        self.add_element_separator();
        self.buf.append_byte(b'"');
        append_escaped(&mut self.buf, value);
        self.buf.append_byte(b'"');
    }

    fn append_time(&mut self, value: &DateTime<Utc>) {
        let config = Arc::clone(&self.config);
        config.encode_time.encode(value, self);
    }

    fn append_u64(&mut self, value: u64) {
        self.add_element_separator();
        self.buf.append_uint(value);
    }
}

impl ArrayEncoder for JsonEncoder {
    fn append_array(&mut self, marshaler: &dyn ArrayMarshaler) -> Result<()> {
        self.add_element_separator();
        self.buf.append_byte(b'[');
        let result = marshaler.marshal_log_array(self);
        self.buf.append_byte(b']');
        result
    }

    fn append_object(&mut self, marshaler: &dyn ObjectMarshaler) -> Result<()> {
        // Namespaces opened inside the object close with it.
        let outer = std::mem::take(&mut self.open_namespaces);
        self.add_element_separator();
        self.buf.append_byte(b'{');
        let result = marshaler.marshal_log_object(self);
        self.close_open_namespaces();
        self.buf.append_byte(b'}');
        self.open_namespaces = outer;
        result
    }

    fn append_reflected(&mut self, value: &serde_json::Value) -> Result<()> {
        self.add_element_separator();
        serde_json::to_writer(&mut self.buf, value)?;
        Ok(())
    }
}

impl Encoder for JsonEncoder {
    fn clone_encoder(&self) -> Box<dyn Encoder> {
        Box::new(self.clone_json())
    }

    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Buffer> {
        let config = Arc::clone(&self.config);
        if !config.time_key.is_empty() {
            config.encode_time.validate()?;
        }
        let mut out = JsonEncoder {
            config: Arc::clone(&config),
            buf: buffer::get(),
            open_namespaces: 0,
        };
        out.buf.append_byte(b'{');

        if !config.level_key.is_empty() {
            out.add_key(&config.level_key);
            config.encode_level.encode(entry.level, &mut out);
        }
        if !config.time_key.is_empty() {
            out.add_time(&config.time_key, &entry.time);
        }
        if !entry.logger_name.is_empty() && !config.name_key.is_empty() {
            out.add_key(&config.name_key);
            config.encode_name.encode(&entry.logger_name, &mut out);
        }
        if entry.caller.defined {
            if !config.caller_key.is_empty() {
                out.add_key(&config.caller_key);
                config.encode_caller.encode(&entry.caller, &mut out);
            }
            if !config.function_key.is_empty() {
                out.add_string(&config.function_key, &entry.caller.function);
            }
        }
        if !config.message_key.is_empty() {
            out.add_string(&config.message_key, &entry.message);
        }

        if !self.buf.is_empty() {
            out.add_element_separator();
            out.buf.append_bytes(self.buf.bytes());
        }
        out.open_namespaces = self.open_namespaces;
        add_fields(&mut out, fields);
        out.close_open_namespaces();

        if !entry.stack.is_empty() && !config.stacktrace_key.is_empty() {
            out.add_string(&config.stacktrace_key, &entry.stack);
        }
        out.buf.append_byte(b'}');
        out.buf.append_string(config.line_ending());
        Ok(out.buf)
    }

    fn as_object_encoder(&mut self) -> &mut dyn ObjectEncoder {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoder_config::{DurationEncoder, TimeEncoder};
    use crate::core::log_entry::EntryCaller;
    use crate::core::log_level::Level;
    use crate::core::marshaler::ObjectMarshalerFn;
    use chrono::TimeZone;
    use serde_json::json;

    fn bare_config() -> EncoderConfig {
        EncoderConfig {
            time_key: String::new(),
            ..EncoderConfig::production()
        }
    }

    fn encode(enc: &JsonEncoder, entry: &Entry, fields: &[Field]) -> String {
        enc.encode_entry(entry, fields).unwrap().to_string()
    }

    #[test]
    fn test_basic_entry() {
        let enc = JsonEncoder::new(bare_config());
        let out = encode(&enc, &Entry::new(Level::Info, "hello"), &[Field::new("k", "v")]);
        assert_eq!(out, "{\"level\":\"info\",\"msg\":\"hello\",\"k\":\"v\"}\n");
    }

    #[test]
    fn test_all_entry_elements() {
        let time = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).single().unwrap();
        let config = EncoderConfig {
            encode_time: TimeEncoder::Rfc3339,
            function_key: "func".to_string(),
            ..EncoderConfig::production()
        };
        let entry = Entry::new(Level::Error, "failed")
            .at(time)
            .with_logger_name("db")
            .with_caller(EntryCaller::new(0, "/src/pool/conn.rs", 42, true).with_function("open"))
            .with_stack("frame 1\nframe 2");

        let out = encode(&JsonEncoder::new(config), &entry, &[]);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            parsed,
            json!({
                "level": "error",
                "ts": "2025-01-08T10:30:45Z",
                "logger": "db",
                "caller": "pool/conn.rs:42",
                "func": "open",
                "msg": "failed",
                "stacktrace": "frame 1\nframe 2",
            })
        );
    }

    #[test]
    fn test_empty_keys_omit_elements() {
        let config = EncoderConfig {
            level_key: String::new(),
            time_key: String::new(),
            message_key: String::new(),
            ..EncoderConfig::production()
        };
        let out = encode(&JsonEncoder::new(config), &Entry::new(Level::Warn, "gone"), &[]);
        assert_eq!(out, "{}\n");
    }

    #[test]
    fn test_context_is_isolated_between_clones() {
        let mut parent = JsonEncoder::new(bare_config());
        parent.add_string("service", "api");

        let mut child = parent.clone_encoder();
        child.as_object_encoder().add_i64("request", 7);

        let entry = Entry::new(Level::Info, "m");
        assert_eq!(
            encode(&parent, &entry, &[]),
            "{\"level\":\"info\",\"msg\":\"m\",\"service\":\"api\"}\n"
        );
        let child_out = child.encode_entry(&entry, &[]).unwrap().to_string();
        assert_eq!(
            child_out,
            "{\"level\":\"info\",\"msg\":\"m\",\"service\":\"api\",\"request\":7}\n"
        );
    }

    #[test]
    fn test_namespaces_nest_and_close() {
        let mut enc = JsonEncoder::new(bare_config());
        enc.open_namespace("outer");
        enc.add_i64("a", 1);

        let out = encode(
            &enc,
            &Entry::new(Level::Info, "m"),
            &[Field::namespace("inner"), Field::new("b", 2_i64)],
        );
        assert_eq!(
            out,
            "{\"level\":\"info\",\"msg\":\"m\",\"outer\":{\"a\":1,\"inner\":{\"b\":2}}}\n"
        );
    }

    #[test]
    fn test_namespace_inside_object_closes_with_object() {
        let nested = ObjectMarshalerFn(|enc: &mut dyn ObjectEncoder| -> Result<()> {
            enc.open_namespace("ns");
            enc.add_bool("x", true);
            Ok(())
        });
        let out = encode(
            &JsonEncoder::new(bare_config()),
            &Entry::new(Level::Info, "m"),
            &[Field::object("obj", nested), Field::new("after", 1_i64)],
        );
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["obj"], json!({"ns": {"x": true}}));
        assert_eq!(parsed["after"], json!(1));
    }

    #[test]
    fn test_escaping() {
        let out = encode(
            &JsonEncoder::new(bare_config()),
            &Entry::new(Level::Info, "quote \" slash \\ tab \t bell \u{7} é"),
            &[Field::byte_string("raw", vec![b'o', b'k', 0xFF])],
        );
        assert!(out.contains(r#""msg":"quote \" slash \\ tab \t bell \u0007 é""#));
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["raw"], json!("ok\u{FFFD}"));
    }

    #[test]
    fn test_special_floats_are_strings() {
        let out = encode(
            &JsonEncoder::new(bare_config()),
            &Entry::new(Level::Info, "m"),
            &[
                Field::new("nan", f64::NAN),
                Field::new("inf", f64::INFINITY),
                Field::new("ninf", f32::NEG_INFINITY),
                Field::new("half", 0.5_f32),
            ],
        );
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["nan"], json!("NaN"));
        assert_eq!(parsed["inf"], json!("+Inf"));
        assert_eq!(parsed["ninf"], json!("-Inf"));
        assert_eq!(parsed["half"], json!(0.5));
    }

    #[test]
    fn test_field_kinds() {
        let config = EncoderConfig {
            encode_duration: DurationEncoder::Nanos,
            ..bare_config()
        };
        let out = encode(
            &JsonEncoder::new(config),
            &Entry::new(Level::Info, "m"),
            &[
                Field::skip(),
                Field::binary("bin", vec![1_u8, 2, 3]),
                Field::array("ids", vec![1_i64, 2, 3]),
                Field::new("wait", Duration::from_micros(5)),
                Field::reflect("meta", &json!({"nested": [true, null]})),
                Field::new("small", -3_i8),
            ],
        );
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["bin"], json!("AQID"));
        assert_eq!(parsed["ids"], json!([1, 2, 3]));
        assert_eq!(parsed["wait"], json!(5000));
        assert_eq!(parsed["meta"], json!({"nested": [true, null]}));
        assert_eq!(parsed["small"], json!(-3));
        assert_eq!(parsed.as_object().unwrap().len(), 7);
    }

    #[test]
    fn test_skip_line_ending() {
        let config = EncoderConfig {
            skip_line_ending: true,
            ..bare_config()
        };
        let out = encode(&JsonEncoder::new(config), &Entry::new(Level::Info, "m"), &[]);
        assert!(out.ends_with('}'));
    }

    #[test]
    fn test_invalid_time_layout_is_an_encoder_error() {
        let config = EncoderConfig {
            encode_time: TimeEncoder::Layout("%Y-%Q".to_string()),
            ..EncoderConfig::production()
        };
        let result = JsonEncoder::new(config).encode_entry(&Entry::new(Level::Info, "m"), &[]);
        assert!(matches!(
            result,
            Err(crate::core::error::LoggerError::EncoderError { .. })
        ));
    }

    #[test]
    fn test_time_field_with_invalid_layout_falls_back() {
        let time = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).single().unwrap();
        let config = EncoderConfig {
            encode_time: TimeEncoder::Layout("%Y-%Q".to_string()),
            ..bare_config()
        };
        let out = encode(
            &JsonEncoder::new(config),
            &Entry::new(Level::Info, "m"),
            &[Field::new("at", time)],
        );
        assert_eq!(
            out,
            "{\"level\":\"info\",\"msg\":\"m\",\"at\":\"2025-01-08T10:30:45.000Z\"}\n"
        );
    }
}
