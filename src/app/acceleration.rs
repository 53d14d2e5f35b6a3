//! Time-based acceleration for continuous movement.
//!
//! Holding an arrow key produces a stream of key-down repeats. Each repeat in the
//! same direction that arrives within the timeout raises the multiplier by a
//! fixed increment up to a cap; a direction change or a pause resets it to 1.0.
//!
//! ```text
//! step = base_speed × multiplier            (no modifier)
//! step = base_speed × multiplier × fast     (fast modifier)
//! step = base_speed / slow_divisor          (precise modifier, no acceleration)
//! ```

use crate::domain::{Direction, Modifiers};
use std::time::Duration;

/// Tunables for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementTuning {
    /// Pixels per key event at multiplier 1.0.
    pub base_speed: f64,
    /// Extra factor while the fast modifier is held.
    pub fast_multiplier: f64,
    /// Divisor applied to `base_speed` while the precise modifier is held.
    pub slow_divisor: f64,
    /// Multiplier growth per accelerated repeat.
    pub acceleration_increment: f64,
    /// Upper bound of the multiplier.
    pub max_multiplier: f64,
    /// Longest gap between two events that still counts as a repeat.
    pub acceleration_timeout: Duration,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            base_speed: 10.0,
            fast_multiplier: 3.0,
            slow_divisor: 4.0,
            acceleration_increment: 0.25,
            max_multiplier: 4.0,
            acceleration_timeout: Duration::from_millis(150),
        }
    }
}

impl MovementTuning {
    /// Distance covered by one movement event.
    #[must_use]
    pub fn step(&self, multiplier: f64, modifiers: Modifiers) -> f64 {
        if modifiers.shift {
            self.base_speed * multiplier * self.fast_multiplier
        } else if modifiers.option {
            self.base_speed / self.slow_divisor
        } else {
            self.base_speed * multiplier
        }
    }
}

/// Acceleration bookkeeping across movement events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelerationState {
    last_direction: Option<Direction>,
    last_move: Option<Duration>,
    multiplier: f64,
}

impl Default for AccelerationState {
    fn default() -> Self {
        Self {
            last_direction: None,
            last_move: None,
            multiplier: 1.0,
        }
    }
}

impl AccelerationState {
    #[must_use]
    pub const fn multiplier(&self) -> f64 {
        self.multiplier
    }

    #[must_use]
    pub const fn last_direction(&self) -> Option<Direction> {
        self.last_direction
    }

    /// Records a movement event and returns the multiplier to apply to it.
    ///
    /// Timestamps that go backwards count as a zero gap.
    pub fn register(&mut self, direction: Direction, at: Duration, tuning: &MovementTuning) -> f64 {
        let repeat = self.last_direction == Some(direction)
            && self
                .last_move
                .is_some_and(|last| at.saturating_sub(last) < tuning.acceleration_timeout);

        self.multiplier = if repeat {
            (self.multiplier + tuning.acceleration_increment).min(tuning.max_multiplier)
        } else {
            1.0
        };
        self.last_direction = Some(direction);
        self.last_move = Some(at);

        tracing::trace!(
            direction = ?direction,
            repeat,
            multiplier = self.multiplier,
            "acceleration updated"
        );
        self.multiplier
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
