//! In-memory encoder backed by `serde_json` values
//!
//! Useful for tests and for hooks that want to inspect fields without
//! parsing serialized output.

use super::encoder::{ArrayEncoder, ObjectEncoder, PrimitiveArrayEncoder};
use super::error::Result;
use super::marshaler::{ArrayMarshaler, ObjectMarshaler};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};
use std::time::Duration;

fn float_value(f: f64) -> Value {
    Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(f.to_string()))
}

fn duration_value(d: Duration) -> Value {
    Value::from(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
}

fn time_value(t: &DateTime<Utc>) -> Value {
    Value::String(t.to_rfc3339())
}

/// An [`ObjectEncoder`] that builds a `serde_json::Map`.
#[derive(Debug, Default, Clone)]
pub struct MapObjectEncoder {
    fields: Map<String, Value>,
    namespaces: Vec<String>,
}

impl MapObjectEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The encoded fields, with namespaces as nested objects.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    fn current(&mut self) -> &mut Map<String, Value> {
        let mut cur = &mut self.fields;
        for ns in &self.namespaces {
            let slot = cur
                .entry(ns.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            cur = match slot {
                Value::Object(map) => map,
                _ => unreachable!("namespace slot was just made an object"),
            };
        }
        cur
    }

    fn insert(&mut self, key: &str, value: Value) {
        self.current().insert(key.to_string(), value);
    }
}

impl ObjectEncoder for MapObjectEncoder {
    fn add_array(&mut self, key: &str, marshaler: &dyn ArrayMarshaler) -> Result<()> {
        let mut arr = SliceArrayEncoder::default();
        let result = marshaler.marshal_log_array(&mut arr);
        self.insert(key, Value::Array(arr.elems));
        result
    }

    fn add_object(&mut self, key: &str, marshaler: &dyn ObjectMarshaler) -> Result<()> {
        let mut obj = MapObjectEncoder::new();
        let result = marshaler.marshal_log_object(&mut obj);
        self.insert(key, Value::Object(obj.fields));
        result
    }

    fn add_binary(&mut self, key: &str, value: &[u8]) {
        self.insert(key, Value::String(BASE64.encode(value)));
    }

    fn add_byte_string(&mut self, key: &str, value: &[u8]) {
        self.insert(key, Value::String(String::from_utf8_lossy(value).into_owned()));
    }

    fn add_bool(&mut self, key: &str, value: bool) {
        self.insert(key, Value::Bool(value));
    }

    fn add_duration(&mut self, key: &str, value: Duration) {
        self.insert(key, duration_value(value));
    }

    fn add_f64(&mut self, key: &str, value: f64) {
        self.insert(key, float_value(value));
    }

    fn add_f32(&mut self, key: &str, value: f32) {
        self.insert(key, float_value(f64::from(value)));
    }

    fn add_i64(&mut self, key: &str, value: i64) {
        self.insert(key, Value::from(value));
    }

    fn add_string(&mut self, key: &str, value: &str) {
        self.insert(key, Value::String(value.to_string()));
    }

    fn add_time(&mut self, key: &str, value: &DateTime<Utc>) {
        self.insert(key, time_value(value));
    }

    fn add_u64(&mut self, key: &str, value: u64) {
        self.insert(key, Value::from(value));
    }

    fn add_reflected(&mut self, key: &str, value: &Value) -> Result<()> {
        self.insert(key, value.clone());
        Ok(())
    }

    fn open_namespace(&mut self, key: &str) {
        self.current()
            .insert(key.to_string(), Value::Object(Map::new()));
        self.namespaces.push(key.to_string());
    }
}

/// An [`ArrayEncoder`] collecting `serde_json` values.
#[derive(Debug, Default, Clone)]
pub struct SliceArrayEncoder {
    elems: Vec<Value>,
}

impl SliceArrayEncoder {
    pub fn elems(&self) -> &[Value] {
        &self.elems
    }
}

impl PrimitiveArrayEncoder for SliceArrayEncoder {
    fn append_bool(&mut self, value: bool) {
        self.elems.push(Value::Bool(value));
    }

    fn append_byte_string(&mut self, value: &[u8]) {
        self.elems
            .push(Value::String(String::from_utf8_lossy(value).into_owned()));
    }

    fn append_duration(&mut self, value: Duration) {
        self.elems.push(duration_value(value));
    }

    fn append_f64(&mut self, value: f64) {
        self.elems.push(float_value(value));
    }

    fn append_f32(&mut self, value: f32) {
        self.elems.push(float_value(f64::from(value)));
    }

    fn append_i64(&mut self, value: i64) {
        self.elems.push(Value::from(value));
    }

    fn append_string(&mut self, value: &str) {
        self.elems.push(Value::String(value.to_string()));
    }

    fn append_time(&mut self, value: &DateTime<Utc>) {
        self.elems.push(time_value(value));
    }

    fn append_u64(&mut self, value: u64) {
        self.elems.push(Value::from(value));
    }
}

impl ArrayEncoder for SliceArrayEncoder {
    fn append_array(&mut self, marshaler: &dyn ArrayMarshaler) -> Result<()> {
        let mut arr = SliceArrayEncoder::default();
        let result = marshaler.marshal_log_array(&mut arr);
        self.elems.push(Value::Array(arr.elems));
        result
    }

    fn append_object(&mut self, marshaler: &dyn ObjectMarshaler) -> Result<()> {
        let mut obj = MapObjectEncoder::new();
        let result = marshaler.marshal_log_object(&mut obj);
        self.elems.push(Value::Object(obj.fields));
        result
    }

    fn append_reflected(&mut self, value: &Value) -> Result<()> {
        self.elems.push(value.clone());
        Ok(())
    }
}
