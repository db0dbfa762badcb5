//! Scroll parallax
//!
//! An element drifts down at a fraction of the scroll speed. Each scroll
//! retargets a short linear tween, so bursts of scroll events smooth out
//! instead of stepping.

use folio_animation::{Easing, TweenedValue, VisualPatch};
use folio_core::Millis;

/// Retarget duration for parallax offsets
pub const PARALLAX_DURATION_MS: Millis = 300.0;

#[derive(Clone, Debug)]
pub struct Parallax {
    multiplier: f32,
    offset: TweenedValue,
}

impl Parallax {
    pub fn new(multiplier: f32) -> Self {
        Self {
            multiplier,
            offset: TweenedValue::new(0.0, PARALLAX_DURATION_MS, Easing::Linear),
        }
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    pub fn on_scroll(&mut self, scroll_y: f32) {
        self.offset.set_target(scroll_y * self.multiplier);
    }

    /// Advance the offset tween; returns true while moving
    pub fn tick(&mut self, dt_ms: Millis) -> bool {
        self.offset.tick(dt_ms)
    }

    /// Current vertical offset (px)
    pub fn offset(&self) -> f32 {
        self.offset.get()
    }

    pub fn target(&self) -> f32 {
        self.offset.target()
    }

    pub fn patch(&self) -> VisualPatch {
        VisualPatch::new().y(self.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eases_toward_scaled_scroll() {
        let mut hero = Parallax::new(0.3);
        hero.on_scroll(1000.0);
        assert_eq!(hero.target(), 300.0);
        assert_eq!(hero.offset(), 0.0);

        hero.tick(150.0);
        assert!((hero.offset() - 150.0).abs() < 1e-3);
        assert!(!hero.tick(150.0));
        assert_eq!(hero.patch().y, Some(300.0));
    }

    #[test]
    fn test_latest_scroll_wins() {
        let mut image = Parallax::new(0.1);
        image.on_scroll(1000.0);
        image.tick(150.0);
        image.on_scroll(0.0);
        assert_eq!(image.target(), 0.0);
        image.tick(150.0);
        assert!((image.offset() - 25.0).abs() < 1e-3);
        image.tick(150.0);
        assert_eq!(image.offset(), 0.0);
    }
}
