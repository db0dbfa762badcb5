//! Smooth scrolling
//!
//! Wheel input and programmatic `scroll_to` calls move a target offset; the
//! visible offset then eases toward it over a fixed duration, one frame at a
//! time. Every frame that moves the visible offset emits a `ScrollTick` to
//! the registered listeners, which is what keeps scroll triggers in sync
//! with the eased position rather than the raw input.
//!
//! The page owns a single `SmoothScrollHandle` and passes it to whatever
//! needs to scroll programmatically, through the `ScrollController` trait.

use std::cell::RefCell;
use std::rc::Rc;

use folio_animation::{Easing, SchedulerHandle, TickCallbackId};
use folio_core::{event_types, Millis, StateTransitions};
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothScrollConfig {
    /// Length of one eased scroll (ms)
    pub duration_ms: Millis,
    pub easing: Easing,
    /// Ease wheel input; when false wheel input jumps immediately
    pub smooth_wheel: bool,
    pub wheel_multiplier: f32,
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            duration_ms: 1200.0,
            easing: Easing::SmoothScroll,
            smooth_wheel: true,
            wheel_multiplier: 1.0,
        }
    }
}

// ============================================================================
// Scroll Events
// ============================================================================

/// A frame's worth of scroll movement
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollTick {
    /// Visible scroll offset (px)
    pub scroll: f32,
    /// Movement since the previous emitted tick (px)
    pub velocity: f32,
    /// 1 scrolling down, -1 scrolling up, 0 at rest
    pub direction: i8,
    /// Scroll offset as a fraction of the limit
    pub progress: f32,
    /// Largest reachable offset
    pub limit: f32,
}

/// Destination of a programmatic scroll
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollTarget {
    Top,
    /// Document offset (px)
    Offset(f32),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollToOptions {
    /// Added to the resolved target (e.g. negative header height)
    pub offset: f32,
    /// Overrides the configured duration
    pub duration_ms: Option<Millis>,
    /// Overrides the configured easing
    pub easing: Option<Easing>,
    /// Jump without easing
    pub immediate: bool,
}

impl ScrollToOptions {
    pub fn offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn duration(mut self, ms: Millis) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn immediate(mut self) -> Self {
        self.immediate = true;
        self
    }
}

// ============================================================================
// State Machine
// ============================================================================

/// Smooth scroll states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollState {
    #[default]
    Idle,
    /// Easing toward a wheel-driven target
    Scrolling,
    /// Easing toward a programmatic target
    Animating,
}

impl ScrollState {
    pub fn is_active(&self) -> bool {
        !matches!(self, ScrollState::Idle)
    }
}

/// Internal events for smooth scroll animation
pub mod scroll_events {
    /// A programmatic scroll started
    pub const SCROLL_TO: u32 = 10100;
    /// The eased offset reached its target
    pub const SETTLED: u32 = 10101;
}

impl StateTransitions for ScrollState {
    fn on_event(&self, event: u32) -> Option<Self> {
        use event_types::*;
        use scroll_events::*;

        match (self, event) {
            (ScrollState::Idle, SCROLL) => Some(ScrollState::Scrolling),
            // Wheel input takes over a programmatic scroll
            (ScrollState::Animating, SCROLL) => Some(ScrollState::Scrolling),
            (_, SCROLL_TO) => Some(ScrollState::Animating),
            (ScrollState::Scrolling | ScrollState::Animating, SETTLED) => Some(ScrollState::Idle),
            _ => None,
        }
    }
}

// ============================================================================
// Smooth Scroll
// ============================================================================

#[derive(Clone, Copy, Debug)]
struct Animation {
    from: f32,
    to: f32,
    elapsed_ms: Millis,
    duration_ms: Millis,
    easing: Easing,
}

impl Animation {
    fn value(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0) as f32;
        self.from + (self.to - self.from) * self.easing.apply(t)
    }

    fn is_done(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}

/// The eased scroll source
#[derive(Clone, Debug)]
pub struct SmoothScroll {
    config: SmoothScrollConfig,
    /// Visible offset
    animated: f32,
    /// Where the eased offset is heading
    target: f32,
    /// Offset reported by the last emitted tick
    last_emitted: f32,
    viewport_height: f32,
    content_height: f32,
    animation: Option<Animation>,
    state: ScrollState,
    last_time: Option<Millis>,
}

impl SmoothScroll {
    pub fn new(config: SmoothScrollConfig) -> Self {
        Self {
            config,
            animated: 0.0,
            target: 0.0,
            last_emitted: 0.0,
            viewport_height: 0.0,
            content_height: 0.0,
            animation: None,
            state: ScrollState::Idle,
            last_time: None,
        }
    }

    pub fn config(&self) -> &SmoothScrollConfig {
        &self.config
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn is_scrolling(&self) -> bool {
        self.state.is_active()
    }

    /// Visible scroll offset
    pub fn scroll(&self) -> f32 {
        self.animated
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Largest reachable offset
    pub fn limit(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    pub fn progress(&self) -> f32 {
        let limit = self.limit();
        if limit > 0.0 {
            self.animated / limit
        } else {
            0.0
        }
    }

    /// Update the scrollable extent (resize or content change)
    ///
    /// Returns a tick when the visible offset had to be clamped.
    pub fn set_dimensions(
        &mut self,
        viewport_height: f32,
        content_height: f32,
    ) -> Option<ScrollTick> {
        self.viewport_height = viewport_height.max(0.0);
        self.content_height = content_height.max(0.0);
        let limit = self.limit();
        self.target = self.target.clamp(0.0, limit);
        if let Some(animation) = &mut self.animation {
            animation.to = animation.to.clamp(0.0, limit);
        }

        let clamped = self.animated.clamp(0.0, limit);
        if clamped == self.animated {
            return None;
        }
        tracing::debug!(from = self.animated, to = clamped, "scroll clamped to new extent");
        self.animated = clamped;
        self.emit()
    }

    fn start(&mut self, to: f32, duration_ms: Millis, easing: Easing) {
        self.target = to;
        self.animation = Some(Animation {
            from: self.animated,
            to,
            elapsed_ms: 0.0,
            duration_ms,
            easing,
        });
    }

    fn jump(&mut self, to: f32) -> Option<ScrollTick> {
        self.animation = None;
        self.target = to;
        self.animated = to;
        if self.state.is_active() {
            self.state = ScrollState::Idle;
        }
        self.emit()
    }

    /// Wheel or trackpad input
    ///
    /// Returns a tick only when the offset moved immediately (smooth wheel
    /// disabled); otherwise the movement is emitted by later frames.
    pub fn on_wheel(&mut self, delta_y: f32) -> Option<ScrollTick> {
        let delta = delta_y * self.config.wheel_multiplier;
        if !self.config.smooth_wheel {
            let to = (self.animated + delta).clamp(0.0, self.limit());
            return self.jump(to);
        }

        let to = (self.target + delta).clamp(0.0, self.limit());
        self.state.apply(event_types::SCROLL);
        self.start(to, self.config.duration_ms, self.config.easing);
        None
    }

    /// Programmatic scroll
    ///
    /// Returns a tick when the scroll completed immediately.
    pub fn scroll_to(&mut self, target: ScrollTarget, options: ScrollToOptions) -> Option<ScrollTick> {
        let base = match target {
            ScrollTarget::Top => 0.0,
            ScrollTarget::Offset(y) => y,
        };
        let to = (base + options.offset).clamp(0.0, self.limit());
        let duration_ms = options.duration_ms.unwrap_or(self.config.duration_ms);
        tracing::debug!(to, duration_ms, immediate = options.immediate, "scroll_to");

        if options.immediate || duration_ms <= 0.0 {
            return self.jump(to);
        }

        self.state.apply(scroll_events::SCROLL_TO);
        self.start(to, duration_ms, options.easing.unwrap_or(self.config.easing));
        None
    }

    /// The host scrolled natively (scrollbar, keyboard)
    ///
    /// Ignored while an eased scroll is in flight.
    pub fn sync_native(&mut self, y: f32) -> Option<ScrollTick> {
        if self.animation.is_some() {
            return None;
        }
        let y = y.clamp(0.0, self.limit());
        if y == self.animated {
            return None;
        }
        self.jump(y)
    }

    /// Advance by `dt_ms`, returning a tick if the visible offset moved
    pub fn advance(&mut self, dt_ms: Millis) -> Option<ScrollTick> {
        let mut animation = self.animation?;
        if dt_ms <= 0.0 {
            return None;
        }
        animation.elapsed_ms += dt_ms;
        self.animated = animation.value();

        if animation.is_done() {
            self.animated = animation.to;
            self.animation = None;
            self.state.apply(scroll_events::SETTLED);
            tracing::trace!(scroll = self.animated, "smooth scroll settled");
        } else {
            self.animation = Some(animation);
        }
        self.emit()
    }

    /// Advance to the absolute frame time `time_ms`
    ///
    /// The first call only records the time.
    pub fn raf(&mut self, time_ms: Millis) -> Option<ScrollTick> {
        let dt = match self.last_time {
            Some(last) => time_ms - last,
            None => 0.0,
        };
        self.last_time = Some(time_ms);
        self.advance(dt)
    }

    fn emit(&mut self) -> Option<ScrollTick> {
        let velocity = self.animated - self.last_emitted;
        if velocity == 0.0 && self.animation.is_some() {
            return None;
        }
        self.last_emitted = self.animated;
        Some(ScrollTick {
            scroll: self.animated,
            velocity,
            direction: if velocity > 0.0 {
                1
            } else if velocity < 0.0 {
                -1
            } else {
                0
            },
            progress: self.progress(),
            limit: self.limit(),
        })
    }
}

impl Default for SmoothScroll {
    fn default() -> Self {
        Self::new(SmoothScrollConfig::default())
    }
}

// ============================================================================
// Shared Handle
// ============================================================================

new_key_type! {
    /// Identifies a scroll listener
    pub struct ScrollListenerId;
}

type ScrollListener = Box<dyn FnMut(&ScrollTick)>;

/// Anything that can scroll the page programmatically
pub trait ScrollController {
    fn scroll_to(&self, target: ScrollTarget, options: ScrollToOptions);
}

/// Shared smooth-scroll instance with its listeners
///
/// Cloning the handle shares the same scroll source.
#[derive(Clone, Default)]
pub struct SmoothScrollHandle {
    scroll: Rc<RefCell<SmoothScroll>>,
    /// A slot is `None` while its listener is running
    listeners: Rc<RefCell<SlotMap<ScrollListenerId, Option<ScrollListener>>>>,
}

impl SmoothScrollHandle {
    pub fn new(config: SmoothScrollConfig) -> Self {
        Self {
            scroll: Rc::new(RefCell::new(SmoothScroll::new(config))),
            listeners: Rc::default(),
        }
    }

    /// Register a listener for emitted scroll ticks
    pub fn on_scroll<F>(&self, listener: F) -> ScrollListenerId
    where
        F: FnMut(&ScrollTick) + 'static,
    {
        self.listeners.borrow_mut().insert(Some(Box::new(listener)))
    }

    pub fn off(&self, id: ScrollListenerId) {
        self.listeners.borrow_mut().remove(id);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Read the scroll state
    pub fn with<R>(&self, f: impl FnOnce(&SmoothScroll) -> R) -> R {
        f(&self.scroll.borrow())
    }

    pub fn scroll(&self) -> f32 {
        self.scroll.borrow().scroll()
    }

    pub fn state(&self) -> ScrollState {
        self.scroll.borrow().state()
    }

    pub fn set_dimensions(&self, viewport_height: f32, content_height: f32) {
        let tick = self
            .scroll
            .borrow_mut()
            .set_dimensions(viewport_height, content_height);
        self.dispatch(tick);
    }

    pub fn on_wheel(&self, delta_y: f32) {
        let tick = self.scroll.borrow_mut().on_wheel(delta_y);
        self.dispatch(tick);
    }

    pub fn sync_native(&self, y: f32) {
        let tick = self.scroll.borrow_mut().sync_native(y);
        self.dispatch(tick);
    }

    pub fn advance(&self, dt_ms: Millis) {
        let tick = self.scroll.borrow_mut().advance(dt_ms);
        self.dispatch(tick);
    }

    pub fn raf(&self, time_ms: Millis) {
        let tick = self.scroll.borrow_mut().raf(time_ms);
        self.dispatch(tick);
    }

    /// Drive this scroll from the scheduler's frame ticks
    pub fn attach_to(&self, scheduler: &SchedulerHandle) -> Option<TickCallbackId> {
        let handle = self.clone();
        scheduler.add_tick_callback(move |_now, dt| handle.advance(dt))
    }

    fn dispatch(&self, tick: Option<ScrollTick>) {
        let Some(tick) = tick else {
            return;
        };

        let ids: Vec<ScrollListenerId> = self.listeners.borrow().keys().collect();
        for id in ids {
            let taken = self
                .listeners
                .borrow_mut()
                .get_mut(id)
                .and_then(|slot| slot.take());
            if let Some(mut listener) = taken {
                listener(&tick);
                if let Some(slot) = self.listeners.borrow_mut().get_mut(id) {
                    *slot = Some(listener);
                }
            }
        }
    }
}

impl ScrollController for SmoothScrollHandle {
    fn scroll_to(&self, target: ScrollTarget, options: ScrollToOptions) {
        let tick = self.scroll.borrow_mut().scroll_to(target, options);
        self.dispatch(tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_animation::AnimationScheduler;

    fn scroll() -> SmoothScroll {
        let mut scroll = SmoothScroll::default();
        scroll.set_dimensions(900.0, 5000.0);
        scroll
    }

    #[test]
    fn test_wheel_eases_to_target() {
        let mut scroll = scroll();
        assert!(scroll.on_wheel(400.0).is_none());
        assert_eq!(scroll.state(), ScrollState::Scrolling);
        assert_eq!(scroll.target(), 400.0);

        let tick = scroll.advance(100.0).unwrap();
        assert!(tick.scroll > 0.0 && tick.scroll < 400.0);
        assert_eq!(tick.direction, 1);

        let last = scroll.advance(2000.0).unwrap();
        assert_eq!(last.scroll, 400.0);
        assert_eq!(scroll.state(), ScrollState::Idle);
        assert!(scroll.advance(16.0).is_none());
    }

    #[test]
    fn test_shrinking_extent_emits_clamped_offset() {
        let mut scroll = scroll();
        scroll.scroll_to(ScrollTarget::Offset(3000.0), ScrollToOptions::default().immediate());
        assert!(scroll.set_dimensions(900.0, 6000.0).is_none());

        let tick = scroll.set_dimensions(900.0, 2900.0).unwrap();
        assert_eq!(tick.scroll, 2000.0);
        assert_eq!(tick.limit, 2000.0);
        assert_eq!(tick.direction, -1);
        assert_eq!(scroll.target(), 2000.0);
        assert!(scroll.set_dimensions(900.0, 2900.0).is_none());
    }

    #[test]
    fn test_handle_dispatches_clamp_on_resize() {
        let handle = SmoothScrollHandle::default();
        handle.set_dimensions(900.0, 5000.0);
        handle.scroll_to(ScrollTarget::Offset(4000.0), ScrollToOptions::default().immediate());

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        handle.on_scroll(move |tick| sink.borrow_mut().push(tick.scroll));

        handle.set_dimensions(900.0, 3000.0);
        assert_eq!(*seen.borrow(), [2100.0]);
        assert_eq!(handle.scroll(), 2100.0);
    }

    #[test]
    fn test_wheel_without_smoothing_jumps() {
        let mut scroll = SmoothScroll::new(SmoothScrollConfig {
            smooth_wheel: false,
            ..Default::default()
        });
        scroll.set_dimensions(900.0, 5000.0);
        let tick = scroll.on_wheel(120.0).unwrap();
        assert_eq!(tick.scroll, 120.0);
        assert_eq!(scroll.state(), ScrollState::Idle);
    }

    #[test]
    fn test_targets_are_clamped() {
        let mut scroll = scroll();
        scroll.on_wheel(-300.0);
        assert_eq!(scroll.target(), 0.0);
        scroll.scroll_to(ScrollTarget::Offset(99_999.0), ScrollToOptions::default());
        assert_eq!(scroll.target(), 4100.0);
        assert_eq!(scroll.state(), ScrollState::Animating);
    }

    #[test]
    fn test_scroll_to_with_offset_and_immediate() {
        let mut scroll = scroll();
        let tick = scroll
            .scroll_to(
                ScrollTarget::Offset(1024.0),
                ScrollToOptions::default().offset(-80.0).immediate(),
            )
            .unwrap();
        assert_eq!(tick.scroll, 944.0);
        assert!((tick.progress - 944.0 / 4100.0).abs() < 1e-6);

        let tick = scroll
            .scroll_to(ScrollTarget::Top, ScrollToOptions::default().duration(0.0))
            .unwrap();
        assert_eq!(tick.scroll, 0.0);
        assert_eq!(tick.direction, -1);
    }

    #[test]
    fn test_custom_duration_and_easing() {
        let mut scroll = scroll();
        scroll.scroll_to(
            ScrollTarget::Offset(1000.0),
            ScrollToOptions::default()
                .duration(100.0)
                .easing(Easing::Linear),
        );
        let tick = scroll.advance(50.0).unwrap();
        assert!((tick.scroll - 500.0).abs() < 1e-3);
        scroll.advance(50.0);
        assert_eq!(scroll.scroll(), 1000.0);
        assert_eq!(scroll.state(), ScrollState::Idle);
    }

    #[test]
    fn test_native_scroll_ignored_while_animating() {
        let mut scroll = scroll();
        assert_eq!(scroll.sync_native(300.0).map(|t| t.scroll), Some(300.0));
        scroll.on_wheel(100.0);
        assert!(scroll.sync_native(50.0).is_none());
    }

    #[test]
    fn test_raf_first_frame_records_time() {
        let mut scroll = scroll();
        scroll.on_wheel(400.0);
        assert!(scroll.raf(5000.0).is_none());
        assert!(scroll.raf(5100.0).is_some());
    }

    #[test]
    fn test_state_machine() {
        use scroll_events::*;
        assert_eq!(
            ScrollState::Idle.on_event(event_types::SCROLL),
            Some(ScrollState::Scrolling)
        );
        assert_eq!(ScrollState::Scrolling.on_event(SETTLED), Some(ScrollState::Idle));
        assert_eq!(ScrollState::Idle.on_event(SETTLED), None);
        assert_eq!(ScrollState::Scrolling.on_event(SCROLL_TO), Some(ScrollState::Animating));
    }

    #[test]
    fn test_handle_dispatches_to_listeners() {
        let handle = SmoothScrollHandle::new(SmoothScrollConfig::default());
        handle.set_dimensions(900.0, 5000.0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        let id = handle.on_scroll(move |tick| sink.borrow_mut().push(tick.scroll));
        handle.scroll_to(ScrollTarget::Offset(200.0), ScrollToOptions::default().immediate());
        assert_eq!(*seen.borrow(), vec![200.0]);

        handle.off(id);
        handle.scroll_to(ScrollTarget::Top, ScrollToOptions::default().immediate());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_listener_may_scroll_again() {
        let handle = SmoothScrollHandle::default();
        handle.set_dimensions(900.0, 5000.0);
        let inner = handle.clone();
        handle.on_scroll(move |tick| {
            if tick.scroll > 500.0 {
                inner.scroll_to(ScrollTarget::Offset(100.0), ScrollToOptions::default().immediate());
            }
        });
        handle.scroll_to(ScrollTarget::Offset(800.0), ScrollToOptions::default().immediate());
        assert_eq!(handle.scroll(), 100.0);
    }

    #[test]
    fn test_attached_to_scheduler() {
        let scheduler = AnimationScheduler::new();
        let handle = SmoothScrollHandle::default();
        handle.set_dimensions(900.0, 5000.0);
        handle.attach_to(&scheduler.handle()).unwrap();

        handle.on_wheel(600.0);
        for _ in 0..100 {
            scheduler.tick(16.0);
        }
        assert_eq!(handle.scroll(), 600.0);
        assert_eq!(handle.state(), ScrollState::Idle);
    }
}
