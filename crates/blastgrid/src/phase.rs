//! # TimedPhase — Windup, Damage, Recover
//!
//! Every timed hazard in the game has the same shape: it announces itself,
//! hurts for a while, then lingers before going away. Boss attacks,
//! explosions and flames all run on one [`TimedPhase`]:
//!
//! ```text
//!  Entering ──▶ Windup ──▶ Damage ──▶ Recover ──▶ Exiting
//!     │           │          │           │
//!     │       windup ms   damage ms   recover ms
//!     └─ first update, no time spent
//! ```
//!
//! The clock is polled: [`TimedPhase::update`] ticks it by the frame delta
//! and moves on whenever `elapsed >= duration` for the current phase. The
//! time left over after a transition carries into the next phase, so a long
//! frame may cross several phases at once (zero-length phases are crossed in
//! the same update).
//!
//! Callers read [`TimedPhase::phase`] after updating and, for instance, keep
//! their damage collider active exactly while it is [`Phase::Damage`].

use std::time::Duration;

use crate::time::Clock;

/// Phases compare in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Phase {
    #[default]
    Entering,
    Windup,
    Damage,
    Recover,
    /// Terminal. The owner decides what happens next.
    Exiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseDurations {
    pub windup: Duration,
    pub damage: Duration,
    pub recover: Duration,
}

impl PhaseDurations {
    pub fn from_millis(windup: u64, damage: u64, recover: u64) -> Self {
        Self {
            windup: Duration::from_millis(windup),
            damage: Duration::from_millis(damage),
            recover: Duration::from_millis(recover),
        }
    }

    pub fn total(&self) -> Duration {
        self.windup + self.damage + self.recover
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimedPhase {
    phase: Phase,
    clock: Clock,
    durations: PhaseDurations,
}

impl TimedPhase {
    pub fn new(durations: PhaseDurations) -> Self {
        Self {
            phase: Phase::Entering,
            clock: Clock::new(),
            durations,
        }
    }

    /// Start over from [`Phase::Entering`].
    pub fn restart(&mut self) {
        self.phase = Phase::Entering;
        self.clock.restart();
    }

    /// Start over with new durations.
    pub fn restart_with(&mut self, durations: PhaseDurations) {
        self.durations = durations;
        self.restart();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    /// Time spent in the current phase.
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn is_damaging(&self) -> bool {
        self.phase == Phase::Damage
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Exiting
    }

    fn limit(&self) -> Option<Duration> {
        match self.phase {
            Phase::Windup => Some(self.durations.windup),
            Phase::Damage => Some(self.durations.damage),
            Phase::Recover => Some(self.durations.recover),
            Phase::Entering | Phase::Exiting => None,
        }
    }

    /// Advance by `dt`. Returns the new phase if it changed.
    pub fn update(&mut self, dt: Duration) -> Option<Phase> {
        let before = self.phase;
        match self.phase {
            Phase::Exiting => return None,
            // Entering costs no time.
            Phase::Entering => self.phase = Phase::Windup,
            _ => self.clock.tick(dt),
        }

        while let Some(limit) = self.limit() {
            if self.clock.elapsed() < limit {
                break;
            }
            let over = self.clock.restart() - limit;
            self.clock.tick(over);
            self.phase = match self.phase {
                Phase::Windup => Phase::Damage,
                Phase::Damage => Phase::Recover,
                _ => Phase::Exiting,
            };
        }

        (self.phase != before).then_some(self.phase)
    }
}
