//! Marshaling hooks for user-defined composite values

use super::encoder::{ArrayEncoder, ObjectEncoder};
use super::error::Result;

/// Allows a type to efficiently add itself to a log entry as an object.
pub trait ObjectMarshaler: Send + Sync {
    fn marshal_log_object(&self, enc: &mut dyn ObjectEncoder) -> Result<()>;
}

/// Allows a type to efficiently add itself to a log entry as an array.
pub trait ArrayMarshaler: Send + Sync {
    fn marshal_log_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()>;
}

/// Adapts a closure to [`ObjectMarshaler`].
pub struct ObjectMarshalerFn<F>(pub F);

impl<F> ObjectMarshaler for ObjectMarshalerFn<F>
where
    F: Fn(&mut dyn ObjectEncoder) -> Result<()> + Send + Sync,
{
    fn marshal_log_object(&self, enc: &mut dyn ObjectEncoder) -> Result<()> {
        (self.0)(enc)
    }
}

/// Adapts a closure to [`ArrayMarshaler`].
pub struct ArrayMarshalerFn<F>(pub F);

impl<F> ArrayMarshaler for ArrayMarshalerFn<F>
where
    F: Fn(&mut dyn ArrayEncoder) -> Result<()> + Send + Sync,
{
    fn marshal_log_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()> {
        (self.0)(enc)
    }
}

macro_rules! primitive_array {
    ($($ty:ty => $append:ident),* $(,)?) => {
        $(
            impl ArrayMarshaler for Vec<$ty> {
                fn marshal_log_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()> {
                    for v in self {
                        enc.$append(*v);
                    }
                    Ok(())
                }
            }
        )*
    };
}

primitive_array! {
    bool => append_bool,
    i64 => append_i64,
    i32 => append_i32,
    u64 => append_u64,
    u32 => append_u32,
    f64 => append_f64,
}

impl ArrayMarshaler for Vec<String> {
    fn marshal_log_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()> {
        for v in self {
            enc.append_string(v);
        }
        Ok(())
    }
}
