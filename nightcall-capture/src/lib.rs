//! Nightcall segment capture
//!
//! Everything the scheduler needs to turn one recording slot into one audio
//! artifact plus one immutable metadata record:
//!
//! ```text
//! Scheduler
//!   │
//!   ├─> CaptureTool (arecord child process, start/wait/kill seam)
//!   │     │
//!   │     └─> SegmentRecorder: wall-clock bounds, kill-on-shutdown,
//!   │           deterministic filenames, collision fail-fast
//!   │
//!   └─> SegmentMetadata: JSON sidecar, atomic write-then-rename
//! ```
//!
//! The `ShutdownToken` lives here because the recorder's kill-on-cancel path
//! is its primary consumer; the scheduler shares the same token across all
//! of its waits.

pub mod cancel;
pub mod error;
pub mod metadata;
pub mod recorder;
pub mod tool;

pub use cancel::ShutdownToken;
pub use error::{CaptureError, Result};
pub use metadata::{PpsTiming, SegmentMetadata};
pub use recorder::{segment_stem, SegmentRecorder};
pub use tool::{pcm_format, Arecord, CaptureHandle, CaptureSpec, CaptureTool};
