//! Time sources for the engine.
//!
//! `Clock` supplies epoch seconds for snapshot timestamps and idle catch-up.
//! `TickClock` turns a variable wall-clock delta into a whole number of
//! nominal ticks using an accumulator, so live production follows the
//! one-tick-per-interval rule without losing time to timer drift.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now" as floating-point seconds since the Unix epoch.
pub trait Clock {
    fn now_epoch_secs(&self) -> f64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

pub struct TickClock {
    /// Milliseconds per tick (1000ms = one production unit per second).
    ms_per_tick: f64,
    /// Accumulated milliseconds not yet consumed as ticks
    accumulator: f64,
    /// Upper bound on a single frame's delta.
    max_delta_ms: f64,
    pub total_ticks: u64,
    /// Timestamp of the last update (ms), None if first frame
    last_timestamp: Option<f64>,
}

impl TickClock {
    /// `interval_ms` is the nominal tick cadence. A single frame may
    /// contribute at most five ticks; a stalled driver does not flood
    /// the economy with catch-up ticks (that is what load-time idle
    /// catch-up is for).
    pub fn new(interval_ms: u64) -> Self {
        let ms_per_tick = interval_ms.max(1) as f64;
        Self {
            ms_per_tick,
            accumulator: 0.0,
            max_delta_ms: ms_per_tick * 5.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed a monotonic timestamp in milliseconds and get the number of
    /// ticks to run this frame.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, self.max_delta_ms),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }

    /// Milliseconds until the next tick is due.
    pub fn until_next_tick_ms(&self) -> f64 {
        (self.ms_per_tick - self.accumulator).max(0.0)
    }

    /// Drop any partial tick, e.g. after a prestige reset.
    pub fn restart(&mut self, now_ms: f64) {
        self.accumulator = 0.0;
        self.last_timestamp = Some(now_ms);
    }
}

#[cfg(test)]
pub struct FixedClock(pub f64);

#[cfg(test)]
impl Clock for FixedClock {
    fn now_epoch_secs(&self) -> f64 {
        self.0
    }
}
