//! Error types for alignment analysis

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AlignError>;

#[derive(Error, Debug)]
pub enum AlignError {
    #[error("Sample rate must be positive")]
    ZeroSampleRate,

    #[error("No metadata record for artifact: {0}")]
    MissingMetadata(PathBuf),

    #[error("Metadata error: {0}")]
    Metadata(#[from] nightcall_capture::CaptureError),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
