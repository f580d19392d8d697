//! Core logger types and traits

pub mod atomic_level;
pub mod buffer;
pub mod checked_entry;
pub mod encoder;
pub mod encoder_config;
pub mod error;
pub mod field;
pub mod hook;
pub mod increase_level;
pub mod io_core;
pub mod lazy_with;
pub mod log_core;
pub mod log_entry;
pub mod log_level;
pub mod marshaler;
pub mod memory_encoder;
pub mod pool;
pub mod tee;
pub mod write_syncer;

pub use atomic_level::AtomicLevel;
pub use buffer::{Buffer, BufferPool};
pub use checked_entry::{
    AfterWrite, CheckWriteAction, CheckWriteHook, CheckedEntry, TaskExit, TerminalPolicy,
};
pub use encoder::{add_fields, ArrayEncoder, Encoder, ObjectEncoder, PrimitiveArrayEncoder};
pub use encoder_config::{
    CallerEncoder, DurationEncoder, EncoderConfig, LevelEncoder, NameEncoder, TimeEncoder,
};
pub use error::{LoggerError, MultiError, Result};
pub use field::{Field, FieldValue};
pub use hook::{hook, register_hooks, Hook};
pub use increase_level::new_increase_level_core;
pub use io_core::new_core;
pub use lazy_with::new_lazy_with;
pub use log_core::{new_nop_core, Core, CoreRef, NopCore};
pub use log_entry::{Entry, EntryCaller};
pub use log_level::{level_of, parse_level, Level, LevelEnabler, LevelEnablerFn};
pub use marshaler::{ArrayMarshaler, ArrayMarshalerFn, ObjectMarshaler, ObjectMarshalerFn};
pub use memory_encoder::{MapObjectEncoder, SliceArrayEncoder};
pub use tee::new_tee;
pub use write_syncer::{AddSync, Discard, Locked, MultiWriteSyncer, WriteSyncer};
