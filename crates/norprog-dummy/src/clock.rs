//! Deterministic microsecond clock

use norprog_core::io::TimeSource;

/// A time source that advances by a fixed step every time it is queried
///
/// Each call to [`TimeSource::now_us`] returns the current time and then
/// advances it by `increment` microseconds, wrapping at 2^32. A delay
/// advances the time by the delay. This makes the number of status polls
/// before a timeout a pure function of the start time, the increment and
/// the timeout.
#[derive(Debug, Clone)]
pub struct FakeClock {
    time: u32,
    increment: u32,
    queries: u32,
}

impl FakeClock {
    /// Create a clock starting at `start` that advances by `increment` per query
    pub fn new(start: u32, increment: u32) -> Self {
        Self {
            time: start,
            increment,
            queries: 0,
        }
    }

    /// Time the next query will return
    pub fn peek(&self) -> u32 {
        self.time
    }

    /// Number of times the clock has been queried
    pub fn queries(&self) -> u32 {
        self.queries
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl TimeSource for FakeClock {
    fn now_us(&mut self) -> u32 {
        let now = self.time;
        self.time = self.time.wrapping_add(self.increment);
        self.queries = self.queries.wrapping_add(1);
        now
    }

    fn delay_us(&mut self, us: u32) {
        self.time = self.time.wrapping_add(us);
    }
}
