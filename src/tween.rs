//! Delayed, eased interpolation tracks for the animated modes.

/// Easing curve applied to the normalized progress of a [`Tween`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant velocity.
    Linear,
    /// Accelerate from zero.
    InQuad,
    /// Decelerate to zero.
    #[default]
    OutQuad,
    /// Accelerate, then decelerate.
    InOutQuad,
    /// Decelerate to zero, more abruptly than [`Easing::OutQuad`].
    OutCubic,
}

impl Easing {
    /// Map the normalized progress `t` in `0..=1` through the curve.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// A single eased `from → to` value animated over time, with an optional
/// start delay.
///
/// Holds `from` during the delay and clamps to `to` when finished.
#[derive(Debug, Clone)]
pub struct Tween {
    /// Value at the start.
    from: f32,
    /// Value at the end.
    to: f32,
    /// Seconds to wait before interpolation starts.
    delay: f32,
    /// Seconds the interpolation takes after the delay.
    duration: f32,
    /// Curve applied to the progress.
    easing: Easing,
    /// Seconds passed since the tween was created.
    elapsed: f32,
}

impl Tween {
    /// Create a tween running immediately with the default easing.
    #[must_use]
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            delay: 0.0,
            duration,
            easing: Easing::default(),
            elapsed: 0.0,
        }
    }

    /// Wait this many seconds before interpolation starts.
    #[must_use]
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;

        self
    }

    /// Use a different easing curve.
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;

        self
    }

    /// Advance the tween by a time step in seconds.
    pub fn advance(&mut self, delta_time: f32) {
        self.elapsed += delta_time;
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> f32 {
        if self.elapsed <= self.delay {
            return self.from;
        }
        if self.duration <= 0.0 {
            return self.to;
        }

        let t = ((self.elapsed - self.delay) / self.duration).clamp(0.0, 1.0);

        self.from + (self.to - self.from) * self.easing.apply(t)
    }

    /// Whether the tween has reached its end value.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.elapsed >= self.delay + self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::{Easing, Tween};

    #[test]
    fn easing_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::InQuad,
            Easing::OutQuad,
            Easing::InOutQuad,
            Easing::OutCubic,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?} start");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?} end");
        }
    }

    #[test]
    fn holds_from_during_delay() {
        let mut tween = Tween::new(10.0, 20.0, 1.0).with_delay(0.5);

        tween.advance(0.25);
        assert_eq!(tween.value(), 10.0);
        assert!(!tween.finished());
    }

    #[test]
    fn finishes_after_delay_and_duration() {
        let mut tween = Tween::new(0.0, 1.0, 1.0).with_delay(1.0);

        tween.advance(1.9);
        assert!(!tween.finished());

        tween.advance(0.2);
        assert!(tween.finished());
        assert_eq!(tween.value(), 1.0);
    }

    #[test]
    fn value_stays_within_bounds() {
        let mut tween = Tween::new(-5.0, 5.0, 2.0).with_easing(Easing::InOutQuad);

        for _ in 0..100 {
            tween.advance(0.05);
            assert!((-5.0..=5.0).contains(&tween.value()));
        }

        assert_eq!(tween.value(), 5.0);
    }

    #[test]
    fn zero_duration_jumps_to_end() {
        let mut tween = Tween::new(0.0, 3.0, 0.0).with_delay(0.1);

        assert_eq!(tween.value(), 0.0);
        tween.advance(0.2);
        assert_eq!(tween.value(), 3.0);
        assert!(tween.finished());
    }
}
