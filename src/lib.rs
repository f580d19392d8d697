//! # Rust Logger Core
//!
//! The decision-and-dispatch core of a structured logger: composable cores
//! that decide *whether* and *where* an entry is written, a pooled
//! check-then-write protocol, and the encoder contract that turns entries
//! into bytes.
//!
//! ## Features
//!
//! - **Composable cores**: fan-out (`new_tee`), threshold raising
//!   (`new_increase_level_core`), side-effect hooks (`register_hooks`) and
//!   deferred context (`new_lazy_with`)
//! - **Low allocation**: pooled `CheckedEntry` slots and byte buffers
//! - **Runtime levels**: lock-free `AtomicLevel` shared across a core tree
//! - **Encoders**: JSON lines and human-readable console output
//!
//! ## Example
//!
//! ```
//! use rust_logger_core::prelude::*;
//! use std::sync::Arc;
//!
//! let level = AtomicLevel::at(Level::Info);
//! let core = new_core(
//!     Box::new(JsonEncoder::new(EncoderConfig::production())),
//!     Arc::new(Discard),
//!     level.clone(),
//! )
//! .with(&[Field::new("service", "api")]);
//!
//! let entry = Entry::new(Level::Warn, "cache miss rate high");
//! if let Some(mut ce) = core.check(&entry, None) {
//!     ce.write(&[Field::new("rate", 0.42)]);
//! }
//! ```

pub mod core;
pub mod encoders;
pub mod observer;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        new_core, new_increase_level_core, new_lazy_with, new_nop_core, new_tee, register_hooks,
        AtomicLevel, CheckWriteAction, CheckedEntry, Core, CoreRef, Discard, Encoder,
        EncoderConfig, Entry, EntryCaller, Field, FieldValue, Level, LevelEnabler, Locked,
        LoggerError, Result, TerminalPolicy, WriteSyncer,
    };
    pub use crate::encoders::{ConsoleEncoder, JsonEncoder};
    pub use crate::sinks::FileSink;
}

pub use crate::core::{
    hook, level_of, new_core, new_increase_level_core, new_lazy_with, new_nop_core, new_tee,
    register_hooks, AfterWrite, AtomicLevel, CheckWriteAction, CheckWriteHook, CheckedEntry, Core,
    CoreRef, Encoder, EncoderConfig, Entry, EntryCaller, Field, FieldValue, Hook, Level,
    LevelEnabler, LoggerError, MultiError, ObjectEncoder, Result, TerminalPolicy, WriteSyncer,
};
pub use encoders::{ConsoleEncoder, JsonEncoder};
pub use sinks::FileSink;
