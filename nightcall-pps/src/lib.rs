//! Nightcall PPS access
//!
//! Hardware timing primitives for the nightcall recorder: observing
//! pulse-per-second assert edges through the kernel's sysfs interface, and a
//! bounded gate on the external clock-sync daemon.
//!
//! Both capabilities sit behind small traits (`PpsSource`, `SyncGate`) so the
//! scheduler can be exercised with deterministic fakes.

pub mod edge;
pub mod error;
pub mod sync;

pub use edge::{parse_assert_line, PpsDevice, PpsEdge, PpsSource};
pub use error::{PpsError, Result};
pub use sync::{ChronySync, SyncGate};
