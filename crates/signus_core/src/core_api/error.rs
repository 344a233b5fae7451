use std::io;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    UnrecognizedFormat,
    Corrupt,
    InvalidSlot,
    NoFreeSlot,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Classify a codec error. `context` says what was being attempted.
    pub fn from_io(context: &str, e: &io::Error) -> Self {
        let code = match e.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => CoreErrorCode::Corrupt,
            io::ErrorKind::InvalidInput => CoreErrorCode::InvalidSlot,
            io::ErrorKind::StorageFull => CoreErrorCode::NoFreeSlot,
            _ => CoreErrorCode::Io,
        };
        Self::new(code, format!("{context}: {e}"))
    }
}
