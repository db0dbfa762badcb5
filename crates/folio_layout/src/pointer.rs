//! Pointer pose mapping
//!
//! Maps pointer movement over the hero to a sprite pose and a horizontal
//! position on the stage. Moving right faces the sprite right, moving left
//! faces it left, and it turns back to the front once the pointer has been
//! still for the idle window.
//!
//! Timers are deadlines against caller-supplied timestamps: every processed
//! move replaces the pending deadline, and `tick(now)` expires it.

use folio_core::Millis;
use serde::{Deserialize, Serialize};

use crate::stage::Stage;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pose {
    #[default]
    Front,
    Left,
    Right,
}

impl Pose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pose::Front => "front",
            Pose::Left => "left",
            Pose::Right => "right",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// Lowest stage x the sprite may take (px)
    pub min_x: f32,
    /// Movement below this magnitude keeps the current pose (px)
    pub jitter_threshold: f32,
    /// Stillness before the pose returns to front
    pub idle_timeout_ms: Millis,
    /// Delay between entrance completion and live tracking
    pub init_delay_ms: Millis,
    /// Horizontal position, as a stage fraction, before live tracking starts
    pub initial_fraction: f32,
    /// Vertical position as a stage fraction
    pub vertical_fraction: f32,
    /// Stage x used once tracking starts but before any movement (px)
    pub fallback_x: f32,
    /// Sprite edge length in reference pixels
    pub size: f32,
    pub opacity: f32,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            min_x: 440.0,
            jitter_threshold: 2.0,
            idle_timeout_ms: 200.0,
            init_delay_ms: 200.0,
            initial_fraction: 1243.0 / 1440.0,
            vertical_fraction: 600.0 / 1024.0,
            fallback_x: 1070.0,
            size: 320.0,
            opacity: 0.9,
        }
    }
}

/// Where the sprite's centre sits horizontally on the stage
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpritePosition {
    /// Fraction of the stage width
    Fraction(f32),
    /// Stage pixels
    Pixels(f32),
}

impl SpritePosition {
    /// Resolve to stage pixels
    pub fn to_pixels(&self, stage_width: f32) -> f32 {
        match *self {
            SpritePosition::Fraction(f) => f * stage_width,
            SpritePosition::Pixels(px) => px,
        }
    }
}

pub struct PointerPoseMapper {
    config: PoseConfig,
    pose: Pose,
    /// Clamped stage x from the last processed move
    x: Option<f32>,
    /// Client x of the last processed move
    last_x: f32,
    idle_deadline: Option<Millis>,
    entrance_done_at: Option<Millis>,
    intersecting: bool,
}

impl PointerPoseMapper {
    pub fn new(config: PoseConfig) -> Self {
        Self {
            config,
            pose: Pose::Front,
            x: None,
            last_x: 0.0,
            idle_deadline: None,
            entrance_done_at: None,
            intersecting: true,
        }
    }

    pub fn config(&self) -> &PoseConfig {
        &self.config
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn idle_deadline(&self) -> Option<Millis> {
        self.idle_deadline
    }

    /// Record that the entrance animation finished; the sprite appears now
    /// and starts tracking after the initialization delay
    pub fn mark_entrance_complete(&mut self, now: Millis) {
        if self.entrance_done_at.is_none() {
            tracing::debug!(now, "pose mapper armed");
            self.entrance_done_at = Some(now);
        }
    }

    pub fn is_sprite_visible(&self) -> bool {
        self.entrance_done_at.is_some()
    }

    /// Whether the hero is in view
    pub fn set_intersecting(&mut self, intersecting: bool) {
        self.intersecting = intersecting;
    }

    pub fn is_intersecting(&self) -> bool {
        self.intersecting
    }

    pub fn is_initialized(&self, now: Millis) -> bool {
        self.entrance_done_at
            .is_some_and(|done| now >= done + self.config.init_delay_ms)
    }

    /// All preconditions for processing pointer moves
    pub fn is_enabled(&self, now: Millis, stage: &Stage) -> bool {
        self.is_initialized(now) && self.intersecting && stage.size().width > 0.0
    }

    /// Handle a pointer move; returns true if it was processed
    pub fn on_pointer_move(&mut self, client_x: f32, now: Millis, stage: &Stage) -> bool {
        // a deadline that already passed fired before this move arrived
        self.tick(now);

        if !self.is_enabled(now, stage) {
            return false;
        }

        let relative = stage.to_stage_x(client_x);
        self.x = Some(relative.max(self.config.min_x));

        let delta = client_x - self.last_x;
        if delta.abs() > self.config.jitter_threshold {
            let pose = if delta > 0.0 { Pose::Right } else { Pose::Left };
            if pose != self.pose {
                tracing::debug!(pose = pose.as_str(), delta, "pose changed");
                self.pose = pose;
            }
        }

        self.idle_deadline = Some(now + self.config.idle_timeout_ms);
        self.last_x = client_x;
        true
    }

    /// Expire the idle deadline; returns true when the pose changed
    pub fn tick(&mut self, now: Millis) -> bool {
        match self.idle_deadline {
            Some(deadline) if now >= deadline => {
                self.idle_deadline = None;
                if self.pose != Pose::Front {
                    tracing::debug!(now, "pose idle, back to front");
                    self.pose = Pose::Front;
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Horizontal sprite position at `now`
    pub fn position(&self, now: Millis) -> SpritePosition {
        if !self.is_initialized(now) {
            return SpritePosition::Fraction(self.config.initial_fraction);
        }
        SpritePosition::Pixels(self.x.unwrap_or(self.config.fallback_x))
    }
}

impl Default for PointerPoseMapper {
    fn default() -> Self {
        Self::new(PoseConfig::default())
    }
}
