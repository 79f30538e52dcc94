//! Error types for segment capture

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CaptureError>;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Capture tool error: {0}")]
    Tool(String),

    #[error("Unsupported sample width: {0} bits (expected 16, 24 or 32)")]
    UnsupportedBits(u16),

    #[error("Segment already exists: {0} (two segments started in the same second)")]
    Collision(PathBuf),

    #[error("Metadata error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptureError {
    pub fn tool<S: Into<String>>(msg: S) -> Self {
        Self::Tool(msg.into())
    }
}
