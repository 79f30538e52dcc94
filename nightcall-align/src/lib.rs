//! Nightcall alignment analysis
//!
//! Offline reconstruction of where each PPS pulse falls inside a recorded
//! sample stream. Consumes the segment metadata persisted by the recorder
//! plus the artifact's own frame count, and produces nanosecond-resolution
//! alignment results and batch statistics.
//!
//! Pure and read-only over already-persisted data: safe to run while the
//! recorder is active, because the recorder writes metadata atomically.

pub mod alignment;
pub mod batch;
pub mod error;
pub mod report;
pub mod wav;

pub use alignment::{compute, AlignmentResult, PrecisionRating};
pub use batch::{analyze_dir, analyze_file, summarize, BatchSummary, FileReport};
pub use error::{AlignError, Result};
pub use wav::{read_info, WavInfo};
