//! Write syncer implementations backed by OS resources

pub mod file;

pub use file::FileSink;
