//! Timestamp sources and the clamped frame delta.

use std::time::Instant;

/// Source of monotonically increasing timestamps, in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall-clock time since the clock was created.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Simulated display refresh: each call to [`FixedRateClock::advance`]
/// moves time forward by exactly one frame.
pub struct FixedRateClock {
    frame: u64,
    period: f64,
}

impl FixedRateClock {
    pub fn new(fps: f64) -> Self {
        Self {
            frame: 0,
            period: 1.0 / fps,
        }
    }

    pub fn advance(&mut self) {
        self.frame += 1;
    }
}

impl Clock for FixedRateClock {
    fn now(&self) -> f64 {
        self.frame as f64 * self.period
    }
}

/// Turns successive timestamps into clamped time steps.
#[derive(Debug, Clone)]
pub struct DeltaTimer {
    last: f64,
    max_dt: f64,
}

impl DeltaTimer {
    pub fn new(max_dt: f64) -> Self {
        Self { last: 0.0, max_dt }
    }

    /// Forget the previous timestamp, e.g. when a loop (re)starts.
    pub fn restart(&mut self, now: f64) {
        self.last = now;
    }

    /// Elapsed time since the previous call, clamped to `[0, max_dt]`.
    pub fn tick(&mut self, now: f64) -> f64 {
        let dt = (now - self.last).clamp(0.0, self.max_dt);
        self.last = now;
        dt
    }
}
