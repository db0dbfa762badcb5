//! Scroll-synchronized motion
//!
//! Each reveal pairs one staggered timeline with one scroll trigger. The
//! trigger is fed the smooth-scroll position (not the raw input), and the
//! toggle action for each crossing drives the timeline: typically play on
//! enter and reverse on leaving back up.
//!
//! Reveals render their `from` state as soon as they are added, so content
//! below the fold starts hidden. Playing a reveal that is already revealed
//! does nothing; values never compound.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use folio_animation::{
    Easing, PlayDirection, Position, SchedulerHandle, StaggerConfig, TargetId, Timeline,
    TimelineId, Tween, VisualPatch, VisualState,
};
use folio_core::{Millis, StateTransitions};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::scroll::{ScrollListenerId, ScrollTick, SmoothScrollHandle};
use crate::section::ViewportMetrics;
use crate::trigger::{ScrollTrigger, ToggleAction, ToggleActions, TriggerEnd, TriggerPoint, TriggerStart};

new_key_type! {
    /// Identifies a reveal registered with a `MotionDriver`
    pub struct RevealId;
}

// ============================================================================
// Reveal Spec
// ============================================================================

/// How a group of elements animates into view
#[derive(Clone, Debug, PartialEq)]
pub struct RevealSpec {
    pub from: VisualPatch,
    pub to: VisualPatch,
    pub duration_ms: Millis,
    pub easing: Easing,
    pub stagger: StaggerConfig,
    pub start: TriggerStart,
    pub end: TriggerEnd,
    pub actions: ToggleActions,
}

impl Default for RevealSpec {
    fn default() -> Self {
        Self {
            from: VisualPatch::new(),
            to: VisualPatch::new(),
            duration_ms: 800.0,
            easing: Easing::power3_out(),
            stagger: StaggerConfig::default(),
            start: TriggerPoint::top_at(0.8),
            end: TriggerPoint::default_end(),
            actions: ToggleActions::PLAY_REVERSE,
        }
    }
}

impl RevealSpec {
    /// Animate from `from` to each element's resting state
    pub fn from(from: VisualPatch) -> Self {
        Self {
            from,
            ..Default::default()
        }
    }

    pub fn from_to(from: VisualPatch, to: VisualPatch) -> Self {
        Self {
            from,
            to,
            ..Default::default()
        }
    }

    pub fn duration(mut self, ms: Millis) -> Self {
        self.duration_ms = ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn stagger(mut self, each_ms: Millis) -> Self {
        self.stagger = StaggerConfig::new(each_ms);
        self
    }

    pub fn start(mut self, start: TriggerStart) -> Self {
        self.start = start;
        self
    }

    pub fn end(mut self, end: TriggerEnd) -> Self {
        self.end = end;
        self
    }

    pub fn actions(mut self, actions: ToggleActions) -> Self {
        self.actions = actions;
        self
    }

    fn tween(&self) -> Tween {
        Tween::from_to(self.from, self.to, self.duration_ms).easing(self.easing)
    }
}

// ============================================================================
// Reveal State Machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RevealState {
    /// Showing the `from` state
    #[default]
    Unrevealed,
    Revealing(PlayDirection),
    /// Showing the `to` state
    Revealed,
}

impl RevealState {
    pub fn is_animating(&self) -> bool {
        matches!(self, RevealState::Revealing(_))
    }
}

/// Events driving reveal states
pub mod reveal_events {
    pub const PLAY: u32 = 10200;
    pub const REVERSE: u32 = 10201;
    /// The timeline stopped at one of its ends
    pub const SETTLED: u32 = 10202;
    pub const RESET: u32 = 10203;
    pub const COMPLETE: u32 = 10204;
    pub const RESTART: u32 = 10205;
}

impl StateTransitions for RevealState {
    fn on_event(&self, event: u32) -> Option<Self> {
        use reveal_events::*;
        use PlayDirection::*;
        use RevealState::*;

        match (self, event) {
            (Unrevealed | Revealing(Reverse), PLAY) => Some(Revealing(Forward)),
            (_, RESTART) => Some(Revealing(Forward)),
            (Revealed | Revealing(Forward), REVERSE) => Some(Revealing(Reverse)),
            (Revealing(Forward), SETTLED) => Some(Revealed),
            (Revealing(Reverse), SETTLED) => Some(Unrevealed),
            (_, COMPLETE) => Some(Revealed),
            (_, RESET) => Some(Unrevealed),
            _ => None,
        }
    }
}

// ============================================================================
// Motion Driver
// ============================================================================

struct Reveal {
    targets: Vec<TargetId>,
    /// `None` when the scheduler was gone at registration
    timeline: Option<TimelineId>,
    trigger: ScrollTrigger,
    state: RevealState,
}

pub struct MotionDriver {
    scheduler: SchedulerHandle,
    reveals: SlotMap<RevealId, Reveal>,
    by_target: FxHashMap<TargetId, RevealId>,
    listener: Option<ScrollListenerId>,
    last_scroll: Option<f32>,
}

impl MotionDriver {
    pub fn new(scheduler: SchedulerHandle) -> Self {
        Self {
            scheduler,
            reveals: SlotMap::with_key(),
            by_target: FxHashMap::default(),
            listener: None,
            last_scroll: None,
        }
    }

    /// Register a reveal of `targets`, triggered by the element `anchor`
    pub fn add(&mut self, anchor: impl Into<String>, targets: Vec<TargetId>, spec: RevealSpec) -> RevealId {
        let mut timeline = Timeline::new();
        timeline.stagger(&targets, spec.tween(), spec.stagger, Position::Sequential);
        let timeline = self.scheduler.register_timeline(timeline);

        let trigger = ScrollTrigger::new(anchor, spec.start)
            .end(spec.end)
            .actions(spec.actions);
        tracing::debug!(
            anchor = trigger.anchor(),
            targets = targets.len(),
            start = %spec.start,
            "reveal added"
        );

        let id = self.reveals.insert(Reveal {
            targets: targets.clone(),
            timeline,
            trigger,
            state: RevealState::Unrevealed,
        });
        for target in targets {
            self.by_target.insert(target, id);
        }
        id
    }

    pub fn len(&self) -> usize {
        self.reveals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reveals.is_empty()
    }

    pub fn state(&self, id: RevealId) -> Option<RevealState> {
        self.reveals.get(id).map(|r| r.state)
    }

    pub fn targets(&self, id: RevealId) -> &[TargetId] {
        self.reveals
            .get(id)
            .map(|r| r.targets.as_slice())
            .unwrap_or_default()
    }

    pub fn trigger(&self, id: RevealId) -> Option<&ScrollTrigger> {
        self.reveals.get(id).map(|r| &r.trigger)
    }

    pub fn timeline(&self, id: RevealId) -> Option<TimelineId> {
        self.reveals.get(id).and_then(|r| r.timeline)
    }

    /// Scroll offset the triggers were last evaluated at
    pub fn last_scroll(&self) -> Option<f32> {
        self.last_scroll
    }

    /// Re-measure every trigger (layout or viewport changed)
    pub fn refresh<M: ViewportMetrics + ?Sized>(&mut self, metrics: &M) {
        let mut missing = 0;
        for reveal in self.reveals.values_mut() {
            if !reveal.trigger.refresh(metrics) {
                missing += 1;
            }
        }
        if missing > 0 {
            tracing::debug!(missing, "reveals without an element stay inert");
        }
        self.update(metrics.scroll_y());
    }

    /// Evaluate every trigger against a scroll offset and apply actions
    pub fn update(&mut self, scroll_y: f32) {
        self.last_scroll = Some(scroll_y);
        for (id, reveal) in self.reveals.iter_mut() {
            for event in reveal.trigger.update(scroll_y) {
                let action = reveal.trigger.action_for(event);
                tracing::debug!(
                    anchor = reveal.trigger.anchor(),
                    ?event,
                    action = action.as_str(),
                    scroll_y,
                    "trigger crossed"
                );
                apply_action(&self.scheduler, id, reveal, action);
            }
        }
    }

    /// Follow the smooth-scroll position
    pub fn on_scroll_tick(&mut self, tick: &ScrollTick) {
        self.update(tick.scroll);
    }

    /// Apply a toggle action to one reveal directly
    pub fn apply(&mut self, id: RevealId, action: ToggleAction) {
        if let Some(reveal) = self.reveals.get_mut(id) {
            apply_action(&self.scheduler, id, reveal, action);
        }
    }

    /// Subscribe a shared driver to smooth-scroll ticks
    ///
    /// The subscription holds the driver weakly.
    pub fn attach(driver: &Rc<RefCell<Self>>, scroll: &SmoothScrollHandle) -> ScrollListenerId {
        let weak: Weak<RefCell<Self>> = Rc::downgrade(driver);
        let id = scroll.on_scroll(move |tick| {
            let Some(driver) = weak.upgrade() else {
                return;
            };
            match driver.try_borrow_mut() {
                Ok(mut driver) => driver.on_scroll_tick(tick),
                // triggers are zone based, the next tick catches up
                Err(_) => tracing::trace!(scroll = tick.scroll, "motion driver busy, tick skipped"),
            };
        });
        driver.borrow_mut().listener = Some(id);
        id
    }

    pub fn listener(&self) -> Option<ScrollListenerId> {
        self.listener
    }

    /// Settle reveal states whose timelines stopped at an end
    ///
    /// Returns the number of reveals that changed state.
    pub fn sync_states(&mut self) -> usize {
        let mut changed = 0;
        for reveal in self.reveals.values_mut() {
            let Some(timeline) = reveal.timeline else {
                continue;
            };
            let Some((playing, at_start, at_end)) = self
                .scheduler
                .with_timeline(timeline, |t| (t.is_playing(), t.at_start(), t.at_end()))
            else {
                continue;
            };
            if playing {
                continue;
            }
            let settled = match reveal.state {
                RevealState::Revealing(PlayDirection::Forward) => at_end,
                RevealState::Revealing(PlayDirection::Reverse) => at_start,
                _ => false,
            };
            if settled && reveal.state.apply(reveal_events::SETTLED) {
                changed += 1;
            }
        }
        changed
    }

    /// Current visual state of an animated element
    pub fn visual_state(&self, target: &TargetId) -> Option<VisualState> {
        let id = self.by_target.get(target)?;
        let timeline = self.reveals.get(*id)?.timeline?;
        self.scheduler
            .with_timeline(timeline, |t| t.state_of(target))
            .flatten()
    }
}

fn apply_action(scheduler: &SchedulerHandle, id: RevealId, reveal: &mut Reveal, action: ToggleAction) {
    let Some(timeline) = reveal.timeline else {
        return;
    };

    let event = match action {
        ToggleAction::Play => {
            scheduler.play_timeline(timeline);
            Some(reveal_events::PLAY)
        }
        ToggleAction::Reverse => {
            scheduler.reverse_timeline(timeline);
            Some(reveal_events::REVERSE)
        }
        ToggleAction::Restart => {
            scheduler.with_timeline(timeline, |t| t.restart());
            Some(reveal_events::RESTART)
        }
        ToggleAction::Reset => {
            scheduler.with_timeline(timeline, |t| t.reset());
            Some(reveal_events::RESET)
        }
        ToggleAction::Complete => {
            scheduler.with_timeline(timeline, |t| t.complete());
            Some(reveal_events::COMPLETE)
        }
        ToggleAction::Pause => {
            scheduler.with_timeline(timeline, |t| t.pause());
            None
        }
        ToggleAction::Resume => {
            scheduler.with_timeline(timeline, |t| match t.direction() {
                PlayDirection::Forward => t.play(),
                PlayDirection::Reverse => t.reverse(),
            });
            None
        }
        ToggleAction::None => None,
    };

    if let Some(event) = event {
        let before = reveal.state;
        if reveal.state.apply(event) {
            tracing::trace!(?id, from = ?before, to = ?reveal.state, "reveal state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::DocumentLayout;
    use folio_animation::{AnimationScheduler, Interpolate};
    use folio_core::Size;

    fn doc() -> DocumentLayout {
        DocumentLayout::stacked(
            Size::new(1440.0, 1000.0),
            [("hero", 1000.0), ("projects", 1200.0), ("contact", 800.0)],
        )
    }

    fn cards(n: usize) -> Vec<TargetId> {
        (0..n).map(|i| TargetId::indexed("projects.card", i)).collect()
    }

    fn project_reveal() -> RevealSpec {
        RevealSpec::from_to(
            VisualPatch::new().opacity(0.0).y(60.0).rotation(5.0),
            VisualPatch::new().opacity(1.0).y(0.0).rotation(0.0),
        )
        .start(TriggerPoint::top_at(0.75))
        .stagger(200.0)
    }

    fn run(scheduler: &AnimationScheduler, driver: &mut MotionDriver, ms: Millis) {
        let mut left = ms;
        while left > 0.0 {
            scheduler.tick(16.0);
            left -= 16.0;
        }
        driver.sync_states();
    }

    #[test]
    fn test_from_state_renders_before_trigger() {
        let scheduler = AnimationScheduler::new();
        let mut driver = MotionDriver::new(scheduler.handle());
        let targets = cards(3);
        driver.add("projects", targets.clone(), project_reveal());
        driver.refresh(&doc());

        let state = driver.visual_state(&targets[2]).unwrap();
        assert_eq!(state.opacity, 0.0);
        assert_eq!(state.y, 60.0);
        assert_eq!(state.rotation, 5.0);
    }

    #[test]
    fn test_enter_plays_and_leave_back_reverses() {
        let scheduler = AnimationScheduler::new();
        let mut driver = MotionDriver::new(scheduler.handle());
        let targets = cards(3);
        let id = driver.add("projects", targets.clone(), project_reveal());
        driver.refresh(&doc());

        // projects top 1000 meets 75% of the viewport at scroll 250
        driver.update(200.0);
        assert_eq!(driver.state(id), Some(RevealState::Unrevealed));
        driver.update(300.0);
        assert_eq!(driver.state(id), Some(RevealState::Revealing(PlayDirection::Forward)));

        run(&scheduler, &mut driver, 2000.0);
        assert_eq!(driver.state(id), Some(RevealState::Revealed));
        let shown = driver.visual_state(&targets[2]).unwrap();
        assert!(shown.approx_eq(&VisualState::IDENTITY, 1e-4));

        driver.update(100.0);
        assert_eq!(driver.state(id), Some(RevealState::Revealing(PlayDirection::Reverse)));
        run(&scheduler, &mut driver, 2000.0);
        assert_eq!(driver.state(id), Some(RevealState::Unrevealed));
        assert_eq!(driver.visual_state(&targets[0]).unwrap().opacity, 0.0);
    }

    #[test]
    fn test_replaying_revealed_is_idempotent() {
        let scheduler = AnimationScheduler::new();
        let mut driver = MotionDriver::new(scheduler.handle());
        let targets = cards(2);
        let id = driver.add("projects", targets.clone(), project_reveal());
        driver.refresh(&doc());
        driver.update(400.0);
        run(&scheduler, &mut driver, 2000.0);

        let before = driver.visual_state(&targets[1]).unwrap();
        driver.apply(id, ToggleAction::Play);
        run(&scheduler, &mut driver, 500.0);
        driver.apply(id, ToggleAction::Play);
        assert_eq!(driver.state(id), Some(RevealState::Revealed));
        assert_eq!(driver.visual_state(&targets[1]).unwrap(), before);
        assert!(!scheduler.has_active_animations());
    }

    #[test]
    fn test_missing_anchor_is_inert() {
        let scheduler = AnimationScheduler::new();
        let mut driver = MotionDriver::new(scheduler.handle());
        let id = driver.add("testimonials", cards(1), project_reveal());
        driver.refresh(&doc());
        driver.update(5000.0);
        assert_eq!(driver.state(id), Some(RevealState::Unrevealed));
        assert_eq!(driver.trigger(id).and_then(|t| t.range()), None);
    }

    #[test]
    fn test_dropped_scheduler_is_inert() {
        let scheduler = AnimationScheduler::new();
        let mut driver = MotionDriver::new(scheduler.handle());
        drop(scheduler);
        let targets = cards(1);
        let id = driver.add("projects", targets.clone(), project_reveal());
        driver.refresh(&doc());
        driver.update(500.0);
        assert_eq!(driver.state(id), Some(RevealState::Unrevealed));
        assert!(driver.visual_state(&targets[0]).is_none());
    }

    #[test]
    fn test_follows_smooth_scroll() {
        let scheduler = AnimationScheduler::new();
        let scroll = SmoothScrollHandle::default();
        scroll.set_dimensions(1000.0, 3000.0);
        scroll.attach_to(&scheduler.handle());

        let driver = Rc::new(RefCell::new(MotionDriver::new(scheduler.handle())));
        let id = driver.borrow_mut().add("contact", cards(1), project_reveal());
        driver.borrow_mut().refresh(&doc());
        MotionDriver::attach(&driver, &scroll);

        scroll.on_wheel(1500.0);
        assert_eq!(driver.borrow().state(id), Some(RevealState::Unrevealed));
        for _ in 0..40 {
            scheduler.tick(16.0);
        }
        assert!(driver.borrow().last_scroll().unwrap() > 0.0);
        for _ in 0..120 {
            scheduler.tick(16.0);
        }
        driver.borrow_mut().sync_states();
        assert_eq!(driver.borrow().state(id), Some(RevealState::Revealed));
    }

    #[test]
    fn test_state_machine() {
        use reveal_events::*;
        let forward = RevealState::Revealing(PlayDirection::Forward);
        assert_eq!(RevealState::Unrevealed.on_event(PLAY), Some(forward));
        assert_eq!(RevealState::Revealed.on_event(PLAY), None);
        assert_eq!(RevealState::Unrevealed.on_event(REVERSE), None);
        assert_eq!(forward.on_event(SETTLED), Some(RevealState::Revealed));
        assert_eq!(RevealState::Revealed.on_event(RESTART), Some(forward));
    }
}
