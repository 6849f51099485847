use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::projection::Rotation;
use super::view::ViewState;

/// `1 - (1 - t)^3`: starts fast, settles into the target
#[inline]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Linear interpolation that lands exactly on `to` at `t >= 1`
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    #[inline]
    fn lerp(self, to: Self, t: f64) -> Self {
        if t >= 1.0 {
            to
        } else {
            self + (to - self) * t
        }
    }
}

impl Lerp for Rotation {
    #[inline]
    fn lerp(self, to: Self, t: f64) -> Self {
        Rotation::new(self.lambda.lerp(to.lambda, t), self.phi.lerp(to.phi, t))
    }
}

/// Eased transition between two values over a fixed duration
#[derive(Clone, Copy, Debug)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    started: Instant,
    duration: Duration,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, started: Instant, duration: Duration) -> Self {
        Self { from, to, started, duration }
    }

    /// Linear progress in [0, 1]
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn value_at(&self, progress: f64) -> T {
        self.from.lerp(self.to, ease_out_cubic(progress))
    }

    pub fn sample(&self, now: Instant) -> T {
        self.value_at(self.progress(now))
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Cooperative cancellation flag shared between an animation and whoever started it
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// A tween plus the token that can abort it
#[derive(Debug)]
pub struct Animation<T> {
    pub tween: Tween<T>,
    token: CancelToken,
}

impl<T: Lerp> Animation<T> {
    pub fn start(from: T, to: T, now: Instant, duration: Duration) -> (Self, CancelToken) {
        let token = CancelToken::new();
        let animation = Self {
            tween: Tween::new(from, to, now, duration),
            token: token.clone(),
        };
        (animation, token)
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }
}

/// Zoom step: scale follows the tween
pub fn step_zoom(view: ViewState, zoom: &Tween<f64>, now: Instant) -> ViewState {
    view.with_scale(zoom.sample(now))
}

/// Fly-to step: rotation follows the tween
pub fn step_fly_to(view: ViewState, fly: &Tween<Rotation>, now: Instant) -> ViewState {
    view.with_rotation(fly.sample(now))
}

/// Idle spin: fixed degrees of longitude per tick
pub fn step_auto_rotate(view: ViewState, degrees_per_tick: f64) -> ViewState {
    view.rotated_by(degrees_per_tick, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_cubic() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
        // Front-loaded
        assert!(ease_out_cubic(0.25) > 0.25);
    }

    #[test]
    fn test_tween_progress_and_endpoint() {
        let t0 = Instant::now();
        let tween = Tween::new(10.0, 20.0, t0, Duration::from_millis(100));
        assert_eq!(tween.sample(t0), 10.0);
        assert!((tween.sample(t0 + Duration::from_millis(50)) - 18.75).abs() < 1e-9);
        assert_eq!(tween.sample(t0 + Duration::from_millis(100)), 20.0);
        assert_eq!(tween.sample(t0 + Duration::from_secs(5)), 20.0);
        assert!(tween.is_finished(t0 + Duration::from_millis(100)));
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let t0 = Instant::now();
        let tween = Tween::new(0.0, 1.0, t0, Duration::ZERO);
        assert!(tween.is_finished(t0));
        assert_eq!(tween.sample(t0), 1.0);
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let (animation, token) = Animation::start(0.0, 1.0, Instant::now(), Duration::from_millis(10));
        assert!(!animation.is_cancelled());
        token.cancel();
        assert!(animation.is_cancelled());
    }
}
