//! Error types for PPS device access

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PpsError>;

#[derive(Error, Debug)]
pub enum PpsError {
    #[error("PPS device error: {0}")]
    Device(String),

    #[error("Malformed PPS assert line {line:?}: {reason}")]
    MalformedAssert { line: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PpsError {
    pub fn device<S: Into<String>>(msg: S) -> Self {
        Self::Device(msg.into())
    }

    pub fn malformed<S: Into<String>, R: Into<String>>(line: S, reason: R) -> Self {
        Self::MalformedAssert {
            line: line.into(),
            reason: reason.into(),
        }
    }
}
