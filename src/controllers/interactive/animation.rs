use std::f64::consts::TAU;
use std::time::Instant;

/// Radians per second; 0.02 rad per frame at 60 fps.
pub const DEFAULT_PHASE_SPEED: f64 = 1.2;

/// Animation phase in `[0, 2π)`, advanced by wall-clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClock {
    phase: f64,
    speed: f64,
    last_tick: Option<Instant>,
}

impl AnimationClock {
    #[must_use]
    pub fn new(speed: f64) -> Self {
        Self {
            phase: 0.0,
            speed: if speed.is_finite() { speed } else { 0.0 },
            last_tick: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Advances by the time since the previous tick and returns the new phase.
    /// The first tick only records `now`.
    pub fn tick(&mut self, now: Instant) -> f64 {
        if let Some(previous) = self.last_tick {
            let elapsed = now.saturating_duration_since(previous).as_secs_f64();
            self.phase = (self.phase + self.speed * elapsed).rem_euclid(TAU);
        }

        self.last_tick = Some(now);
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.last_tick = None;
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(DEFAULT_PHASE_SPEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_tick_does_not_advance() {
        let mut clock = AnimationClock::default();

        assert_eq!(clock.tick(Instant::now()), 0.0);
    }

    #[test]
    fn test_advances_by_elapsed_time() {
        let mut clock = AnimationClock::new(2.0);
        let start = Instant::now();

        clock.tick(start);
        let phase = clock.tick(start + Duration::from_millis(500));

        assert!((phase - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_phase_wraps_below_tau() {
        let mut clock = AnimationClock::new(1.0);
        let start = Instant::now();

        clock.tick(start);
        let phase = clock.tick(start + Duration::from_secs(7));

        assert!((0.0..TAU).contains(&phase));
        assert!((phase - (7.0 - TAU)).abs() < 1e-9);
    }

    #[test]
    fn test_backwards_time_is_ignored() {
        let mut clock = AnimationClock::new(1.0);
        let start = Instant::now() + Duration::from_secs(1);

        clock.tick(start);
        let phase = clock.tick(start - Duration::from_millis(100));

        assert_eq!(phase, 0.0);
    }

    #[test]
    fn test_reset_returns_to_zero() {
        let mut clock = AnimationClock::new(1.0);
        let start = Instant::now();
        clock.tick(start);
        clock.tick(start + Duration::from_secs(2));

        clock.reset();

        assert_eq!(clock.phase(), 0.0);
    }
}
