//! Cycle clock driving the simulation
//!
//! Counts elapsed simulation cycles against wall time at a configurable
//! cycles-per-second rate. The game session never reads this clock; the
//! shell updates it every frame and feeds each drained cycle into the
//! session as one tick.

use std::time::Instant;

/// Tracks how many simulation cycles have elapsed and not yet been polled
#[derive(Debug)]
pub struct Clock {
    /// Milliseconds that make up one cycle
    millis_per_cycle: f32,
    /// Last time the clock was updated
    last_update: Instant,
    /// Cycles elapsed and not yet drained
    elapsed_cycles: u32,
    /// Fractional progress toward the next cycle, in milliseconds
    excess_millis: f32,
    paused: bool,
}

impl Clock {
    /// Create a clock running at the given cycles-per-second rate
    pub fn new(cycles_per_second: f32) -> Self {
        let mut clock = Self {
            millis_per_cycle: 0.0,
            last_update: Instant::now(),
            elapsed_cycles: 0,
            excess_millis: 0.0,
            paused: false,
        };
        clock.set_cycles_per_second(cycles_per_second);
        clock
    }

    /// Change the rate. Already-elapsed cycles and the fractional excess
    /// are kept; call [`reset`](Self::reset) as well to drop the backlog.
    pub fn set_cycles_per_second(&mut self, cycles_per_second: f32) {
        self.millis_per_cycle = (1.0 / cycles_per_second) * 1000.0;
    }

    /// Drop any pending cycles and restart the accumulator from now
    pub fn reset(&mut self) {
        self.elapsed_cycles = 0;
        self.excess_millis = 0.0;
        self.last_update = Instant::now();
    }

    /// Accumulate cycles from the wall clock. Call every frame, even while
    /// paused, so the delta time never piles up across a pause.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// [`update`](Self::update) against an explicit now, for tests
    pub fn update_at(&mut self, now: Instant) {
        let delta = now.duration_since(self.last_update).as_secs_f32() * 1000.0 + self.excess_millis;
        if !self.paused {
            self.elapsed_cycles += (delta / self.millis_per_cycle) as u32;
            self.excess_millis = delta % self.millis_per_cycle;
        }
        self.last_update = now;
    }

    /// Pause or resume cycle accumulation
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Consume one elapsed cycle if any are pending
    pub fn has_elapsed_cycle(&mut self) -> bool {
        if self.elapsed_cycles > 0 {
            self.elapsed_cycles -= 1;
            true
        } else {
            false
        }
    }
}
