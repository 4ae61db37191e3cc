//! Host time source

use norprog_core::io::TimeSource;
use std::time::{Duration, Instant};

/// Microsecond counter backed by [`Instant`]
///
/// Counts from the moment the clock is created and wraps after roughly
/// 71 minutes, which the program driver's elapsed-time arithmetic handles.
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    epoch: Instant,
}

impl StdClock {
    /// Create a clock whose counter starts at zero now
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for StdClock {
    fn now_us(&mut self) -> u32 {
        // Truncation is the intended modulo 2^32 wrap
        self.epoch.elapsed().as_micros() as u32
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }
}
