//! Wall-clock pacing for watching a run in real time
//!
//! Pacing only delays between ticks; it never changes what is simulated.

use std::time::Duration;

use web_time::Instant;

/// Holds ticks to a fixed rate
pub struct TickPacer {
    tick_duration: Duration,
    next_tick: Instant,
}

impl TickPacer {
    /// `ticks_per_second == 0` disables pacing
    pub fn new(ticks_per_second: u32) -> Self {
        let tick_duration = if ticks_per_second == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / ticks_per_second
        };
        Self {
            tick_duration,
            next_tick: Instant::now(),
        }
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Sleep until the next tick is due and return how long we slept
    ///
    /// A pacer that fell more than one tick behind resyncs to now instead
    /// of rushing to catch up.
    pub fn wait(&mut self) -> Duration {
        let now = Instant::now();
        if now > self.next_tick + self.tick_duration {
            self.next_tick = now + self.tick_duration;
            return Duration::ZERO;
        }

        let slept = self.next_tick.saturating_duration_since(now);
        if !slept.is_zero() {
            std::thread::sleep(slept);
        }
        self.next_tick += self.tick_duration;
        slept
    }
}
