//! Hover timelines
//!
//! A hover effect is two recipes, one for pointer enter and one for leave.
//! Each transition builds a fresh timeline of `to` tweens starting from the
//! elements' current values and replaces the previous timeline, so leaving
//! halfway through the enter animation reverses smoothly from wherever it
//! got to.

use folio_animation::{
    Easing, Position, SchedulerHandle, TargetId, Timeline, TimelineId, Tween, VisualPatch,
    VisualState,
};
use folio_core::Millis;
use rustc_hash::FxHashMap;

/// One tween in a hover recipe
#[derive(Clone, Debug, PartialEq)]
pub struct HoverStep {
    pub target: TargetId,
    pub to: VisualPatch,
    pub duration_ms: Millis,
    pub easing: Easing,
    pub position: Position,
}

impl HoverStep {
    pub fn new(target: impl Into<TargetId>, to: VisualPatch, duration_ms: Millis) -> Self {
        Self {
            target: target.into(),
            to,
            duration_ms,
            easing: Easing::default(),
            position: Position::Sequential,
        }
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

pub struct HoverEffect {
    scheduler: SchedulerHandle,
    rest: FxHashMap<TargetId, VisualState>,
    enter: Vec<HoverStep>,
    leave: Vec<HoverStep>,
    active: Option<TimelineId>,
    hovered: bool,
}

impl HoverEffect {
    pub fn new(scheduler: SchedulerHandle) -> Self {
        Self {
            scheduler,
            rest: FxHashMap::default(),
            enter: Vec::new(),
            leave: Vec::new(),
            active: None,
            hovered: false,
        }
    }

    /// Resting state of a target before any hover
    pub fn rest(mut self, target: impl Into<TargetId>, state: VisualState) -> Self {
        self.rest.insert(target.into(), state);
        self
    }

    pub fn on_enter(mut self, step: HoverStep) -> Self {
        self.enter.push(step);
        self
    }

    pub fn on_leave(mut self, step: HoverStep) -> Self {
        self.leave.push(step);
        self
    }

    /// Project card: image zoom, overlay fade, button slide-up
    pub fn project_card(scheduler: SchedulerHandle, card: &str) -> Self {
        let image = TargetId::new(format!("{card}.image"));
        let overlay = TargetId::new(format!("{card}.overlay"));
        let button = TargetId::new(format!("{card}.button"));

        Self::new(scheduler)
            .rest(overlay.clone(), VisualState::IDENTITY.with(&VisualPatch::new().opacity(0.0)))
            .rest(
                button.clone(),
                VisualState::IDENTITY.with(&VisualPatch::new().opacity(0.0).y(20.0)),
            )
            .on_enter(
                HoverStep::new(image.clone(), VisualPatch::new().scale(1.1), 400.0)
                    .easing(Easing::power2_out()),
            )
            .on_enter(
                HoverStep::new(overlay.clone(), VisualPatch::new().opacity(1.0), 300.0)
                    .at(Position::RelativeToEnd(400.0)),
            )
            .on_enter(
                HoverStep::new(button.clone(), VisualPatch::new().y(0.0).opacity(1.0), 300.0)
                    .at(Position::RelativeToEnd(200.0)),
            )
            .on_leave(HoverStep::new(button, VisualPatch::new().y(20.0).opacity(0.0), 200.0))
            .on_leave(
                HoverStep::new(overlay, VisualPatch::new().opacity(0.0), 300.0)
                    .at(Position::RelativeToEnd(100.0)),
            )
            .on_leave(
                HoverStep::new(image, VisualPatch::new().scale(1.0), 400.0)
                    .easing(Easing::power2_out())
                    .at(Position::RelativeToEnd(300.0)),
            )
    }

    /// Contact icon: grow and spin a full turn
    pub fn contact_icon(scheduler: SchedulerHandle, icon: impl Into<TargetId>) -> Self {
        let icon = icon.into();
        Self::new(scheduler)
            .on_enter(
                HoverStep::new(icon.clone(), VisualPatch::new().scale(1.2).rotation(360.0), 500.0)
                    .easing(Easing::back_out()),
            )
            .on_leave(
                HoverStep::new(icon, VisualPatch::new().scale(1.0).rotation(0.0), 300.0)
                    .easing(Easing::power2_out()),
            )
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn timeline(&self) -> Option<TimelineId> {
        self.active
    }

    /// Pointer entered; no-op when already hovered
    pub fn enter(&mut self) {
        if self.hovered {
            return;
        }
        self.hovered = true;
        let steps = std::mem::take(&mut self.enter);
        self.run(&steps);
        self.enter = steps;
    }

    /// Pointer left; no-op when not hovered
    pub fn leave(&mut self) {
        if !self.hovered {
            return;
        }
        self.hovered = false;
        let steps = std::mem::take(&mut self.leave);
        self.run(&steps);
        self.leave = steps;
    }

    fn run(&mut self, steps: &[HoverStep]) {
        let mut timeline = Timeline::new();
        for step in steps {
            timeline.set_base(step.target.clone(), self.visual_state(&step.target));
        }
        for step in steps {
            let tween = Tween::to(step.to, step.duration_ms).easing(step.easing);
            timeline.add(step.target.clone(), tween, step.position);
        }
        timeline.play();

        if let Some(previous) = self.active.take() {
            self.scheduler.remove_timeline(previous);
        }
        self.active = self.scheduler.register_timeline(timeline);
        tracing::trace!(hovered = self.hovered, steps = steps.len(), "hover timeline started");
    }

    /// Current visual state of a target
    pub fn visual_state(&self, target: &TargetId) -> VisualState {
        let rest = self.rest.get(target).copied().unwrap_or_default();
        self.active
            .and_then(|id| self.scheduler.with_timeline(id, |t| t.state_of(target)))
            .flatten()
            .unwrap_or(rest)
    }
}

impl Drop for HoverEffect {
    fn drop(&mut self) {
        if let Some(id) = self.active.take() {
            self.scheduler.remove_timeline(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_animation::{AnimationScheduler, Interpolate};

    #[test]
    fn test_project_card_enter_and_leave() {
        let scheduler = AnimationScheduler::new();
        let mut card = HoverEffect::project_card(scheduler.handle(), "projects.card.0");
        let image = TargetId::from("projects.card.0.image");
        let button = TargetId::from("projects.card.0.button");

        assert_eq!(card.visual_state(&button).opacity, 0.0);
        assert_eq!(card.visual_state(&button).y, 20.0);

        card.enter();
        scheduler.tick(1000.0);
        assert!((card.visual_state(&image).scale - 1.1).abs() < 1e-4);
        assert!(card.visual_state(&button).approx_eq(&VisualState::IDENTITY, 1e-4));

        card.leave();
        scheduler.tick(1000.0);
        assert!((card.visual_state(&image).scale - 1.0).abs() < 1e-4);
        assert_eq!(card.visual_state(&button).opacity, 0.0);
        assert_eq!(scheduler.timeline_count(), 1);
    }

    #[test]
    fn test_enter_timeline_layout() {
        let scheduler = AnimationScheduler::new();
        let mut card = HoverEffect::project_card(scheduler.handle(), "card");
        card.enter();
        let duration = scheduler
            .handle()
            .with_timeline(card.timeline().unwrap(), |t| t.duration())
            .unwrap();
        // image 0-400, overlay 0-300, button 200-500
        assert_eq!(duration, 500.0);
    }

    #[test]
    fn test_leave_mid_enter_starts_from_current() {
        let scheduler = AnimationScheduler::new();
        let mut icon = HoverEffect::contact_icon(scheduler.handle(), "contact.icon.0");
        let target = TargetId::from("contact.icon.0");

        icon.enter();
        scheduler.tick(100.0);
        let mid = icon.visual_state(&target);
        assert!(mid.rotation > 0.0 && mid.rotation < 360.0);

        icon.leave();
        assert!(icon.visual_state(&target).approx_eq(&mid, 1e-4));
        scheduler.tick(300.0);
        assert_eq!(icon.visual_state(&target).rotation, 0.0);
        assert_eq!(icon.visual_state(&target).scale, 1.0);
    }

    #[test]
    fn test_repeated_enter_is_ignored() {
        let scheduler = AnimationScheduler::new();
        let mut icon = HoverEffect::contact_icon(scheduler.handle(), "icon");
        icon.enter();
        let first = icon.timeline();
        icon.enter();
        assert_eq!(icon.timeline(), first);
        assert!(icon.is_hovered());
    }

    #[test]
    fn test_drop_removes_timeline() {
        let scheduler = AnimationScheduler::new();
        let mut icon = HoverEffect::contact_icon(scheduler.handle(), "icon");
        icon.enter();
        assert_eq!(scheduler.timeline_count(), 1);
        drop(icon);
        assert_eq!(scheduler.timeline_count(), 0);
    }
}
