//! Error types for the logging core

use std::fmt;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {source}")]
    IoOperation {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unrecognized level text
    #[error("unrecognized level: {0:?}")]
    InvalidLevel(String),

    /// A level filter that would enable a level the wrapped core disables
    #[error(
        "invalid increase level, as level {level:?} is allowed by increased level, but not by existing core"
    )]
    InvalidIncreaseLevel { level: String },

    /// Encoder failed to serialize an entry
    #[error("Encoder error ({encoder}): {message}")]
    EncoderError { encoder: String, message: String },

    /// Hook failure
    #[error("hook error: {0}")]
    HookError(String),

    /// Several independent failures
    #[error("{0}")]
    Multiple(MultiError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(operation: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            source,
        }
    }

    /// Create an encoder error
    pub fn encoder(encoder: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::EncoderError {
            encoder: encoder.into(),
            message: message.into(),
        }
    }

    /// Create a hook error
    pub fn hook<S: Into<String>>(msg: S) -> Self {
        LoggerError::HookError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Flatten this error into its leaf errors.
    ///
    /// A `Multiple` yields every error it collected (recursively); any other
    /// variant yields itself.
    pub fn errors(&self) -> Vec<&LoggerError> {
        match self {
            LoggerError::Multiple(multi) => multi.iter().flat_map(LoggerError::errors).collect(),
            other => vec![other],
        }
    }
}

/// An ordered collection of errors produced by independent operations.
///
/// Fan-out writes and hook chains never stop at the first failure; they push
/// every failure here and convert the result with [`MultiError::into_result`].
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<LoggerError>,
}

impl MultiError {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record the error of `result`, if any.
    pub fn push_result(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.push(err);
        }
    }

    /// Record an error. Nested `Multiple` errors are flattened.
    pub fn push(&mut self, err: LoggerError) {
        match err {
            LoggerError::Multiple(inner) => self.errors.extend(inner.errors),
            other => self.errors.push(other),
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoggerError> {
        self.errors.iter()
    }

    /// `Ok` when nothing failed, the error itself when exactly one did, and
    /// `LoggerError::Multiple` otherwise.
    pub fn into_result(mut self) -> Result<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(LoggerError::Multiple(self)),
        }
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}
