// SPDX-License-Identifier: MIT OR Apache-2.0
//! Delta-time sources for ticking a graph.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// How a graph measures time between ticks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Clock {
    /// Real elapsed time between ticks
    #[default]
    Wall,
    /// Deterministic fixed step in seconds
    Fixed {
        /// Step in seconds
        dt: f32,
    },
}

/// Running clock state
#[derive(Debug, Clone, Default)]
pub struct TickClock {
    clock: Clock,
    last: Option<Instant>,
}

impl TickClock {
    /// Create a clock
    pub fn new(clock: Clock) -> Self {
        Self { clock, last: None }
    }

    /// Configured clock
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Seconds since the previous call; zero on the first wall-clock tick
    pub fn advance(&mut self) -> f32 {
        match self.clock {
            Clock::Fixed { dt } => dt,
            Clock::Wall => {
                let now = Instant::now();
                let dt = self.last.map_or(0.0, |last| now.duration_since(last).as_secs_f32());
                self.last = Some(now);
                dt
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let mut clock = TickClock::new(Clock::Fixed { dt: 0.25 });
        assert_eq!(clock.advance(), 0.25);
        assert_eq!(clock.advance(), 0.25);
    }

    #[test]
    fn test_wall_clock_starts_at_zero() {
        let mut clock = TickClock::new(Clock::Wall);
        assert_eq!(clock.advance(), 0.0);
        assert!(clock.advance() >= 0.0);
    }

    #[test]
    fn test_clock_ron() {
        let text = ron::to_string(&Clock::Fixed { dt: 0.5 }).unwrap();
        assert_eq!(ron::from_str::<Clock>(&text).unwrap(), Clock::Fixed { dt: 0.5 });
    }
}
