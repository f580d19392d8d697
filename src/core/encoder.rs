//! Serialization contract between the core and concrete encoders
//!
//! An [`Encoder`] turns an [`Entry`] plus its [`Field`]s into bytes. Context
//! added through `Core::with` is written into a *clone* of the encoder, so
//! each logger carries its own pre-serialized context.

use super::buffer::Buffer;
use super::error::Result;
use super::field::Field;
use super::log_entry::Entry;
use super::marshaler::{ArrayMarshaler, ObjectMarshaler};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// A strongly-typed, encoding-agnostic interface for adding key-value pairs
/// to a map-like structure.
pub trait ObjectEncoder {
    // Logging-specific marshalers.
    fn add_array(&mut self, key: &str, marshaler: &dyn ArrayMarshaler) -> Result<()>;
    fn add_object(&mut self, key: &str, marshaler: &dyn ObjectMarshaler) -> Result<()>;

    // Built-in types.
    fn add_binary(&mut self, key: &str, value: &[u8]);
    fn add_byte_string(&mut self, key: &str, value: &[u8]);
    fn add_bool(&mut self, key: &str, value: bool);
    fn add_duration(&mut self, key: &str, value: Duration);
    fn add_f64(&mut self, key: &str, value: f64);
    fn add_f32(&mut self, key: &str, value: f32);
    fn add_i64(&mut self, key: &str, value: i64);
    fn add_i32(&mut self, key: &str, value: i32) {
        self.add_i64(key, i64::from(value));
    }
    fn add_i16(&mut self, key: &str, value: i16) {
        self.add_i64(key, i64::from(value));
    }
    fn add_i8(&mut self, key: &str, value: i8) {
        self.add_i64(key, i64::from(value));
    }
    fn add_string(&mut self, key: &str, value: &str);
    fn add_time(&mut self, key: &str, value: &DateTime<Utc>);
    fn add_u64(&mut self, key: &str, value: u64);
    fn add_u32(&mut self, key: &str, value: u32) {
        self.add_u64(key, u64::from(value));
    }
    fn add_u16(&mut self, key: &str, value: u16) {
        self.add_u64(key, u64::from(value));
    }
    fn add_u8(&mut self, key: &str, value: u8) {
        self.add_u64(key, u64::from(value));
    }

    /// Arbitrary serialized data. Slow, so prefer the typed methods.
    fn add_reflected(&mut self, key: &str, value: &serde_json::Value) -> Result<()>;

    /// Scope all subsequently added keys under `key` until the entry ends.
    fn open_namespace(&mut self, key: &str);
}

/// The subset of [`ArrayEncoder`] that deals only in primitives. Level,
/// time, duration, caller and name encoders write through it.
pub trait PrimitiveArrayEncoder {
    fn append_bool(&mut self, value: bool);
    fn append_byte_string(&mut self, value: &[u8]);
    fn append_duration(&mut self, value: Duration);
    fn append_f64(&mut self, value: f64);
    fn append_f32(&mut self, value: f32);
    fn append_i64(&mut self, value: i64);
    fn append_i32(&mut self, value: i32) {
        self.append_i64(i64::from(value));
    }
    fn append_i16(&mut self, value: i16) {
        self.append_i64(i64::from(value));
    }
    fn append_i8(&mut self, value: i8) {
        self.append_i64(i64::from(value));
    }
    fn append_string(&mut self, value: &str);
    fn append_time(&mut self, value: &DateTime<Utc>);
    fn append_u64(&mut self, value: u64);
    fn append_u32(&mut self, value: u32) {
        self.append_u64(u64::from(value));
    }
    fn append_u16(&mut self, value: u16) {
        self.append_u64(u64::from(value));
    }
    fn append_u8(&mut self, value: u8) {
        self.append_u64(u64::from(value));
    }
}

/// A strongly-typed, encoding-agnostic interface for adding array-like
/// structures, used from inside [`ArrayMarshaler`]s.
pub trait ArrayEncoder: PrimitiveArrayEncoder {
    fn append_array(&mut self, marshaler: &dyn ArrayMarshaler) -> Result<()>;
    fn append_object(&mut self, marshaler: &dyn ObjectMarshaler) -> Result<()>;
    fn append_reflected(&mut self, value: &serde_json::Value) -> Result<()>;
}

/// A format-agnostic interface for all log entry marshalers.
pub trait Encoder: ObjectEncoder + Send + Sync {
    /// Copy the encoder, including accumulated context. Adding fields to the
    /// copy must never affect the original.
    fn clone_encoder(&self) -> Box<dyn Encoder>;

    /// Serialize the entry and fields, together with any accumulated
    /// context, into a pooled buffer. Fields of the skip kind are omitted.
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Buffer>;

    fn as_object_encoder(&mut self) -> &mut dyn ObjectEncoder;
}

/// Write `fields` into `enc`, in order.
pub fn add_fields(enc: &mut dyn ObjectEncoder, fields: &[Field]) {
    for field in fields {
        field.add_to(enc);
    }
}
