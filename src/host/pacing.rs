//! Pacing between waveform steps

use std::time::Duration;

/// Blocks (or pretends to) between steps.
pub trait Pacer {
    /// Suspend for `delay`.
    fn pause(&mut self, delay: Duration);
}

impl<T: Pacer + ?Sized> Pacer for &mut T {
    fn pause(&mut self, delay: Duration) {
        (**self).pause(delay);
    }
}

impl<T: Pacer + ?Sized> Pacer for Box<T> {
    fn pause(&mut self, delay: Duration) {
        (**self).pause(delay);
    }
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Pacer for ThreadSleeper {
    fn pause(&mut self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Accumulates requested delays without blocking.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    elapsed: Duration,
    pauses: usize,
}

impl VirtualClock {
    /// Clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all requested delays.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of pauses requested.
    pub fn pauses(&self) -> usize {
        self.pauses
    }
}

impl Pacer for VirtualClock {
    fn pause(&mut self, delay: Duration) {
        self.elapsed += delay;
        self.pauses += 1;
    }
}
