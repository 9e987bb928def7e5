//! Simulated frame timing.
//!
//! Nothing in the simulation reads the wall clock. The [`Time`] value owned by
//! the [`World`](crate::world::World) is advanced by the delta passed to
//! `World::update`, and every timer inside a component is a [`Clock`] ticked
//! by that same delta. Replaying the same sequence of deltas therefore
//! replays the same game.

use std::time::Duration;

/// Frame timing, advanced once per `World::update`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Time {
    /// Duration of the current frame.
    delta: Duration,
    /// Total simulated time.
    elapsed: Duration,
    /// Frame counter.
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called at the start of each frame.
    pub(crate) fn advance(&mut self, dt: Duration) {
        self.delta = dt;
        self.elapsed += dt;
        self.frame_count += 1;
    }

    /// Duration of the current frame.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Delta time in seconds (f32), the most common way to use it.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Total simulated time.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of frames simulated so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// A polled stopwatch, ticked by the frame delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    elapsed: Duration,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, dt: Duration) {
        self.elapsed += dt;
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Reset to zero, returning the time that had elapsed.
    pub fn restart(&mut self) -> Duration {
        std::mem::take(&mut self.elapsed)
    }
}

/// A [`Clock`] paired with a duration: "has `duration` passed yet?".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    clock: Clock,
    duration: Duration,
}

impl Timer {
    pub fn new(duration: Duration) -> Self {
        Self {
            clock: Clock::new(),
            duration,
        }
    }

    pub fn tick(&mut self, dt: Duration) {
        self.clock.tick(dt);
    }

    pub fn finished(&self) -> bool {
        self.clock.elapsed() >= self.duration
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.clock.elapsed())
    }

    /// Restart from zero with a new duration.
    pub fn reset(&mut self, duration: Duration) {
        self.duration = duration;
        self.clock.restart();
    }
}
