//! Structured key-value data attached to log entries

use super::encoder::ObjectEncoder;
use super::marshaler::{ArrayMarshaler, ObjectMarshaler};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Value type for structured logging fields
#[derive(Clone)]
pub enum FieldValue {
    /// A no-op field; encoders omit it entirely.
    Skip,
    Bool(bool),
    I64(i64),
    I32(i32),
    I16(i16),
    I8(i8),
    U64(u64),
    U32(u32),
    U16(u16),
    U8(u8),
    F64(f64),
    F32(f32),
    String(String),
    /// UTF-8 (or nearly so) bytes, encoded as a string.
    ByteString(Vec<u8>),
    /// Opaque bytes, encoded as base64 by text encoders.
    Binary(Vec<u8>),
    Duration(Duration),
    Time(DateTime<Utc>),
    Array(Arc<dyn ArrayMarshaler>),
    Object(Arc<dyn ObjectMarshaler>),
    /// An object whose keys are merged into the enclosing object.
    Inline(Arc<dyn ObjectMarshaler>),
    /// Opens a namespace named by the field key.
    Namespace,
    /// An error message.
    Error(String),
    /// Arbitrary data already converted to a JSON value.
    Reflect(serde_json::Value),
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Skip => f.write_str("Skip"),
            FieldValue::Bool(v) => write!(f, "Bool({})", v),
            FieldValue::I64(v) => write!(f, "I64({})", v),
            FieldValue::I32(v) => write!(f, "I32({})", v),
            FieldValue::I16(v) => write!(f, "I16({})", v),
            FieldValue::I8(v) => write!(f, "I8({})", v),
            FieldValue::U64(v) => write!(f, "U64({})", v),
            FieldValue::U32(v) => write!(f, "U32({})", v),
            FieldValue::U16(v) => write!(f, "U16({})", v),
            FieldValue::U8(v) => write!(f, "U8({})", v),
            FieldValue::F64(v) => write!(f, "F64({})", v),
            FieldValue::F32(v) => write!(f, "F32({})", v),
            FieldValue::String(v) => write!(f, "String({:?})", v),
            FieldValue::ByteString(v) => {
                write!(f, "ByteString({:?})", String::from_utf8_lossy(v))
            }
            FieldValue::Binary(v) => write!(f, "Binary({} bytes)", v.len()),
            FieldValue::Duration(v) => write!(f, "Duration({:?})", v),
            FieldValue::Time(v) => write!(f, "Time({})", v),
            FieldValue::Array(_) => f.write_str("Array(..)"),
            FieldValue::Object(_) => f.write_str("Object(..)"),
            FieldValue::Inline(_) => f.write_str("Inline(..)"),
            FieldValue::Namespace => f.write_str("Namespace"),
            FieldValue::Error(v) => write!(f, "Error({:?})", v),
            FieldValue::Reflect(v) => write!(f, "Reflect({})", v),
        }
    }
}

macro_rules! field_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    FieldValue::$variant(v)
                }
            }
        )*
    };
}

field_value_from! {
    bool => Bool,
    i64 => I64,
    i32 => I32,
    i16 => I16,
    i8 => I8,
    u64 => U64,
    u32 => U32,
    u16 => U16,
    u8 => U8,
    f64 => F64,
    f32 => F32,
    String => String,
    Duration => Duration,
    DateTime<Utc> => Time,
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        FieldValue::U64(v as u64)
    }
}

impl From<isize> for FieldValue {
    fn from(v: isize) -> Self {
        FieldValue::I64(v as i64)
    }
}

/// One key-value pair accompanying a log entry.
#[derive(Debug, Clone)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A field that encoders skip.
    pub fn skip() -> Self {
        Self::new("", FieldValue::Skip)
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn byte_string(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::new(key, FieldValue::ByteString(value.into()))
    }

    pub fn binary(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::new(key, FieldValue::Binary(value.into()))
    }

    pub fn object(key: impl Into<String>, marshaler: impl ObjectMarshaler + 'static) -> Self {
        Self::new(key, FieldValue::Object(Arc::new(marshaler)))
    }

    pub fn array(key: impl Into<String>, marshaler: impl ArrayMarshaler + 'static) -> Self {
        Self::new(key, FieldValue::Array(Arc::new(marshaler)))
    }

    /// Merge the marshaler's keys into the enclosing object.
    pub fn inline(marshaler: impl ObjectMarshaler + 'static) -> Self {
        Self::new("", FieldValue::Inline(Arc::new(marshaler)))
    }

    /// Scope every key added after this field under `key`.
    pub fn namespace(key: impl Into<String>) -> Self {
        Self::new(key, FieldValue::Namespace)
    }

    /// An error under the conventional `error` key.
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self::named_error("error", err)
    }

    pub fn named_error(key: impl Into<String>, err: &dyn std::error::Error) -> Self {
        Self::new(key, FieldValue::Error(err.to_string()))
    }

    /// Any serializable value. A value that fails to serialize becomes a
    /// `<key>Error` string field.
    pub fn reflect<T: Serialize + ?Sized>(key: impl Into<String>, value: &T) -> Self {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(v) => Self::new(key, FieldValue::Reflect(v)),
            Err(err) => Self::new(format!("{}Error", key), err.to_string()),
        }
    }

    /// Add this field to an encoder.
    ///
    /// Marshaler failures do not abort the entry: they are recorded under
    /// `<key>Error` instead.
    pub fn add_to(&self, enc: &mut dyn ObjectEncoder) {
        let key = self.key.as_str();
        let result = match &self.value {
            FieldValue::Skip => Ok(()),
            FieldValue::Bool(v) => {
                enc.add_bool(key, *v);
                Ok(())
            }
            FieldValue::I64(v) => {
                enc.add_i64(key, *v);
                Ok(())
            }
            FieldValue::I32(v) => {
                enc.add_i32(key, *v);
                Ok(())
            }
            FieldValue::I16(v) => {
                enc.add_i16(key, *v);
                Ok(())
            }
            FieldValue::I8(v) => {
                enc.add_i8(key, *v);
                Ok(())
            }
            FieldValue::U64(v) => {
                enc.add_u64(key, *v);
                Ok(())
            }
            FieldValue::U32(v) => {
                enc.add_u32(key, *v);
                Ok(())
            }
            FieldValue::U16(v) => {
                enc.add_u16(key, *v);
                Ok(())
            }
            FieldValue::U8(v) => {
                enc.add_u8(key, *v);
                Ok(())
            }
            FieldValue::F64(v) => {
                enc.add_f64(key, *v);
                Ok(())
            }
            FieldValue::F32(v) => {
                enc.add_f32(key, *v);
                Ok(())
            }
            FieldValue::String(v) => {
                enc.add_string(key, v);
                Ok(())
            }
            FieldValue::ByteString(v) => {
                enc.add_byte_string(key, v);
                Ok(())
            }
            FieldValue::Binary(v) => {
                enc.add_binary(key, v);
                Ok(())
            }
            FieldValue::Duration(v) => {
                enc.add_duration(key, *v);
                Ok(())
            }
            FieldValue::Time(v) => {
                enc.add_time(key, v);
                Ok(())
            }
            FieldValue::Array(m) => enc.add_array(key, m.as_ref()),
            FieldValue::Object(m) => enc.add_object(key, m.as_ref()),
            FieldValue::Inline(m) => m.marshal_log_object(enc),
            FieldValue::Namespace => {
                enc.open_namespace(key);
                Ok(())
            }
            FieldValue::Error(msg) => {
                enc.add_string(key, msg);
                Ok(())
            }
            FieldValue::Reflect(v) => enc.add_reflected(key, v),
        };

        if let Err(err) = result {
            enc.add_string(&format!("{}Error", key), &err.to_string());
        }
    }
}
