//! Folio Animation System
//!
//! Declarative tweens and timelines driven by a single-threaded frame
//! scheduler.
//!
//! # Features
//!
//! - **Easing**: named curves (`"power3.out"`, `"back.out(1.7)"`, ...)
//! - **Visual State**: opacity/translate/scale/rotation with interpolation
//! - **Tweens**: from-state to to-state transitions, plus retargetable values
//! - **Timelines**: position parameters, staggered targets, cues, reverse
//! - **Scheduler**: frame ticker that drives timelines and tick callbacks

pub mod easing;
pub mod scheduler;
pub mod timeline;
pub mod tween;
pub mod values;

pub use easing::{EaseKind, Easing, ParseEasingError};
pub use scheduler::{
    AnimationScheduler, SchedulerHandle, TickCallback, TickCallbackId, TimelineId,
};
pub use timeline::{
    Cue, PlayDirection, Position, StaggerConfig, StaggerDirection, TargetId, Timeline,
};
pub use tween::{Tween, TweenedValue};
pub use values::{Interpolate, VisualPatch, VisualState};
