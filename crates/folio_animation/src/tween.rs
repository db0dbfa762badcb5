//! Tweens
//!
//! A `Tween` is a fixed-duration transition between two visual states.
//! A `TweenedValue` is a single retargetable scalar: setting a new target
//! starts a fresh tween from wherever the value currently is.

use folio_core::Millis;
use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::values::{Interpolate, VisualPatch, VisualState};

/// A transition from one visual state to another
///
/// Both ends are patches resolved against the target's base state, so a
/// "from" tween (`from` set, `to` empty) animates into the element's
/// natural state and a "to" tween animates out of it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub from: VisualPatch,
    pub to: VisualPatch,
    pub duration_ms: Millis,
    pub easing: Easing,
}

impl Tween {
    /// Animate from `patch` into the base state
    pub fn from(patch: VisualPatch, duration_ms: Millis) -> Self {
        Self::from_to(patch, VisualPatch::default(), duration_ms)
    }

    /// Animate from the base state to `patch`
    pub fn to(patch: VisualPatch, duration_ms: Millis) -> Self {
        Self::from_to(VisualPatch::default(), patch, duration_ms)
    }

    pub fn from_to(from: VisualPatch, to: VisualPatch, duration_ms: Millis) -> Self {
        Self {
            from,
            to,
            duration_ms: duration_ms.max(0.0),
            easing: Easing::default(),
        }
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Eased progress at `local_ms` into the tween
    pub fn progress(&self, local_ms: Millis) -> f32 {
        if self.duration_ms <= 0.0 {
            return if local_ms >= 0.0 { 1.0 } else { 0.0 };
        }
        let t = (local_ms / self.duration_ms).clamp(0.0, 1.0) as f32;
        self.easing.apply(t)
    }

    pub fn start_state(&self, base: VisualState) -> VisualState {
        self.from.apply(base)
    }

    pub fn end_state(&self, base: VisualState) -> VisualState {
        self.to.apply(base)
    }

    /// Sample the tween `local_ms` after it started
    pub fn sample(&self, base: VisualState, local_ms: Millis) -> VisualState {
        let from = self.start_state(base);
        let to = self.end_state(base);
        if self.duration_ms <= 0.0 {
            return if local_ms >= 0.0 { to } else { from };
        }
        let t = (local_ms / self.duration_ms).clamp(0.0, 1.0) as f32;
        if t >= 1.0 {
            // exact end values, even for overshooting curves
            return to;
        }
        from.lerp(&to, self.easing.apply(t))
    }
}

/// A scalar that eases toward whatever target it was last given
///
/// Retargeting mid-flight restarts from the current sampled value, so the
/// most recent `set_target` always wins and the value never jumps.
#[derive(Clone, Debug)]
pub struct TweenedValue {
    value: f32,
    from: f32,
    target: f32,
    elapsed_ms: Millis,
    duration_ms: Millis,
    easing: Easing,
    animating: bool,
}

impl TweenedValue {
    pub fn new(initial: f32, duration_ms: Millis, easing: Easing) -> Self {
        Self {
            value: initial,
            from: initial,
            target: initial,
            elapsed_ms: 0.0,
            duration_ms: duration_ms.max(0.0),
            easing,
            animating: false,
        }
    }

    pub fn get(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Start easing toward `target` from the current value
    pub fn set_target(&mut self, target: f32) {
        if target == self.target && (self.animating || self.value == target) {
            return;
        }
        self.from = self.value;
        self.target = target;
        self.elapsed_ms = 0.0;
        if self.duration_ms <= 0.0 {
            self.value = target;
            self.animating = false;
        } else {
            self.animating = true;
        }
    }

    /// Advance by `dt_ms`; returns true while still animating
    pub fn tick(&mut self, dt_ms: Millis) -> bool {
        if !self.animating {
            return false;
        }
        self.elapsed_ms += dt_ms.max(0.0);
        let t = (self.elapsed_ms / self.duration_ms).min(1.0) as f32;
        if t >= 1.0 {
            self.value = self.target;
            self.animating = false;
        } else {
            self.value = self.from.lerp(&self.target, self.easing.apply(t));
        }
        self.animating
    }

    /// Jump to the target immediately
    pub fn snap_to_target(&mut self) {
        self.value = self.target;
        self.from = self.target;
        self.animating = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tween_ends_at_base() {
        let tween = Tween::from(VisualPatch::new().opacity(0.0).y(30.0), 800.0)
            .easing(Easing::power3_out());
        let base = VisualState::IDENTITY;

        let start = tween.sample(base, 0.0);
        assert_eq!(start.opacity, 0.0);
        assert_eq!(start.y, 30.0);

        let mid = tween.sample(base, 400.0);
        assert!(mid.opacity > 0.5 && mid.opacity < 1.0);

        assert_eq!(tween.sample(base, 800.0), base);
        assert_eq!(tween.sample(base, 5000.0), base);
    }

    #[test]
    fn test_overshoot_ends_exactly() {
        let tween = Tween::from(VisualPatch::new().scale(0.0), 600.0).easing(Easing::back_out());
        assert_eq!(tween.sample(VisualState::IDENTITY, 600.0).scale, 1.0);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let tween = Tween::to(VisualPatch::new().opacity(0.0), 0.0);
        assert_eq!(tween.sample(VisualState::IDENTITY, 0.0).opacity, 0.0);
        assert_eq!(tween.progress(0.0), 1.0);
    }

    #[test]
    fn test_tweened_value_reaches_target() {
        let mut value = TweenedValue::new(0.0, 300.0, Easing::Linear);
        value.set_target(30.0);
        assert!(value.tick(150.0));
        assert!((value.get() - 15.0).abs() < 1e-4);
        assert!(!value.tick(150.0));
        assert_eq!(value.get(), 30.0);
    }

    #[test]
    fn test_last_target_wins() {
        let mut value = TweenedValue::new(0.0, 300.0, Easing::Linear);
        value.set_target(100.0);
        value.tick(150.0);
        let midway = value.get();

        value.set_target(10.0);
        assert_eq!(value.get(), midway);
        value.tick(300.0);
        assert_eq!(value.get(), 10.0);
    }

    #[test]
    fn test_snap_to_target() {
        let mut value = TweenedValue::new(0.0, 300.0, Easing::Linear);
        value.set_target(42.0);
        value.snap_to_target();
        assert_eq!(value.get(), 42.0);
        assert!(!value.is_animating());
    }
}
