//! Animatable value types
//!
//! `VisualState` is the full set of per-element properties the page engine
//! animates. Renderers read it; tweens interpolate it.

use serde::{Deserialize, Serialize};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal (for settling detection)
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

// ============================================================================
// f32 Implementation
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// Visual State
// ============================================================================

/// Renderable properties of a single element
///
/// Translation is in pixels, rotation in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualState {
    pub opacity: f32,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub scale_y: f32,
    pub rotation: f32,
    pub rotation_x: f32,
}

impl VisualState {
    /// The untransformed, fully visible state
    pub const IDENTITY: VisualState = VisualState {
        opacity: 1.0,
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        scale_y: 1.0,
        rotation: 0.0,
        rotation_x: 0.0,
    };

    /// Identity with zero opacity
    pub fn hidden() -> Self {
        Self {
            opacity: 0.0,
            ..Self::IDENTITY
        }
    }

    pub fn with(self, patch: &VisualPatch) -> Self {
        patch.apply(self)
    }
}

impl Default for VisualState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Interpolate for VisualState {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        VisualState {
            opacity: self.opacity.lerp(&other.opacity, t),
            x: self.x.lerp(&other.x, t),
            y: self.y.lerp(&other.y, t),
            scale: self.scale.lerp(&other.scale, t),
            scale_y: self.scale_y.lerp(&other.scale_y, t),
            rotation: self.rotation.lerp(&other.rotation, t),
            rotation_x: self.rotation_x.lerp(&other.rotation_x, t),
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.opacity.approx_eq(&other.opacity, epsilon)
            && self.x.approx_eq(&other.x, epsilon)
            && self.y.approx_eq(&other.y, epsilon)
            && self.scale.approx_eq(&other.scale, epsilon)
            && self.scale_y.approx_eq(&other.scale_y, epsilon)
            && self.rotation.approx_eq(&other.rotation, epsilon)
            && self.rotation_x.approx_eq(&other.rotation_x, epsilon)
    }
}

// ============================================================================
// Visual Patch
// ============================================================================

/// A partial `VisualState`; unset fields keep the base value
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_x: Option<f32>,
}

impl VisualPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opacity(mut self, v: f32) -> Self {
        self.opacity = Some(v);
        self
    }

    pub fn x(mut self, v: f32) -> Self {
        self.x = Some(v);
        self
    }

    pub fn y(mut self, v: f32) -> Self {
        self.y = Some(v);
        self
    }

    pub fn scale(mut self, v: f32) -> Self {
        self.scale = Some(v);
        self
    }

    pub fn scale_y(mut self, v: f32) -> Self {
        self.scale_y = Some(v);
        self
    }

    pub fn rotation(mut self, v: f32) -> Self {
        self.rotation = Some(v);
        self
    }

    pub fn rotation_x(mut self, v: f32) -> Self {
        self.rotation_x = Some(v);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay this patch onto a base state
    pub fn apply(&self, base: VisualState) -> VisualState {
        VisualState {
            opacity: self.opacity.unwrap_or(base.opacity),
            x: self.x.unwrap_or(base.x),
            y: self.y.unwrap_or(base.y),
            scale: self.scale.unwrap_or(base.scale),
            scale_y: self.scale_y.unwrap_or(base.scale_y),
            rotation: self.rotation.unwrap_or(base.rotation),
            rotation_x: self.rotation_x.unwrap_or(base.rotation_x),
        }
    }

    /// Merge two patches; fields set in `other` win
    pub fn merge(&self, other: &VisualPatch) -> VisualPatch {
        VisualPatch {
            opacity: other.opacity.or(self.opacity),
            x: other.x.or(self.x),
            y: other.y.or(self.y),
            scale: other.scale.or(self.scale),
            scale_y: other.scale_y.or(self.scale_y),
            rotation: other.rotation.or(self.rotation),
            rotation_x: other.rotation_x.or(self.rotation_x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_lerp() {
        assert_eq!(0.0f32.lerp(&10.0, 0.5), 5.0);
        assert!(1.0f32.approx_eq(&1.00001, 0.001));
    }

    #[test]
    fn test_identity_default() {
        let state = VisualState::default();
        assert_eq!(state.opacity, 1.0);
        assert_eq!(state.scale, 1.0);
        assert_eq!(state.y, 0.0);
    }

    #[test]
    fn test_patch_overlays_base() {
        let from = VisualPatch::new().opacity(0.0).y(50.0).rotation_x(-90.0);
        let state = from.apply(VisualState::IDENTITY);
        assert_eq!(state.opacity, 0.0);
        assert_eq!(state.y, 50.0);
        assert_eq!(state.rotation_x, -90.0);
        assert_eq!(state.scale, 1.0);
    }

    #[test]
    fn test_state_lerp_midpoint() {
        let a = VisualState::hidden().with(&VisualPatch::new().x(-100.0));
        let b = VisualState::IDENTITY;
        let mid = a.lerp(&b, 0.5);
        assert!(mid.opacity.approx_eq(&0.5, 1e-6));
        assert!(mid.x.approx_eq(&-50.0, 1e-6));
    }

    #[test]
    fn test_patch_merge() {
        let base = VisualPatch::new().opacity(0.0).y(50.0);
        let merged = base.merge(&VisualPatch::new().y(60.0).rotation(5.0));
        assert_eq!(merged.opacity, Some(0.0));
        assert_eq!(merged.y, Some(60.0));
        assert_eq!(merged.rotation, Some(5.0));
        assert!(VisualPatch::new().is_empty());
    }
}
