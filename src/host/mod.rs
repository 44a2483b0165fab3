//! Interfaces to the host environment
//!
//! The driver never touches the OS directly: system memory, wall-clock
//! pauses and progress output all come in through these traits so a run
//! can be replayed deterministically.

mod pacing;
mod probe;
mod progress;

pub use pacing::{Pacer, ThreadSleeper, VirtualClock};
pub use probe::{FixedMemory, MemoryProbe, MemorySnapshot, ProbeError, SystemMemory};
pub use progress::{ConsoleProgress, NullProgress, ProgressSink};
