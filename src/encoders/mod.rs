//! Encoder implementations

pub mod console;
pub mod json;

pub use console::ConsoleEncoder;
pub use json::JsonEncoder;
