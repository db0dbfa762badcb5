//! Animation scheduler
//!
//! A single-threaded frame ticker. Each frame it first runs tick callbacks
//! (the smooth-scroll source is driven from one of these) and then advances
//! every registered timeline, collecting the cues they fire.
//!
//! Components keep a `SchedulerHandle`, which is weak: once the scheduler is
//! dropped every handle operation becomes a no-op.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use folio_core::Millis;
use slotmap::{new_key_type, SlotMap};

use crate::timeline::{Cue, Timeline};

new_key_type! {
    /// Unique identifier for a registered timeline
    pub struct TimelineId;
    /// Unique identifier for a tick callback
    pub struct TickCallbackId;
}

/// Called once per frame with `(now_ms, dt_ms)`
pub type TickCallback = Box<dyn FnMut(Millis, Millis)>;

/// Internal state of the animation scheduler
///
/// Timelines and callbacks live in separate cells so a callback may register
/// or drive timelines while it runs.
struct SchedulerInner {
    timelines: RefCell<SlotMap<TimelineId, Timeline>>,
    /// A slot is `None` while its callback is running
    callbacks: RefCell<SlotMap<TickCallbackId, Option<TickCallback>>>,
    clock: Cell<Millis>,
    last_frame: Cell<Option<Millis>>,
    lag_threshold_ms: Cell<Millis>,
    lag_adjusted_ms: Cell<Millis>,
    frames: Cell<u64>,
}

impl SchedulerInner {
    fn new() -> Self {
        Self {
            timelines: RefCell::new(SlotMap::with_key()),
            callbacks: RefCell::new(SlotMap::with_key()),
            clock: Cell::new(0.0),
            last_frame: Cell::new(None),
            lag_threshold_ms: Cell::new(0.0),
            lag_adjusted_ms: Cell::new(0.0),
            frames: Cell::new(0),
        }
    }

    fn tick(&self, dt_ms: Millis) -> Vec<(TimelineId, Cue)> {
        let mut dt = dt_ms.max(0.0);
        let threshold = self.lag_threshold_ms.get();
        if threshold > 0.0 && dt > threshold {
            tracing::debug!(dt, adjusted = self.lag_adjusted_ms.get(), "lag smoothing");
            dt = self.lag_adjusted_ms.get();
        }

        let now = self.clock.get() + dt;
        self.clock.set(now);
        self.frames.set(self.frames.get() + 1);

        // Tick callbacks
        let ids: Vec<TickCallbackId> = self.callbacks.borrow().keys().collect();
        for id in ids {
            let taken = self
                .callbacks
                .borrow_mut()
                .get_mut(id)
                .and_then(|slot| slot.take());
            if let Some(mut callback) = taken {
                callback(now, dt);
                if let Some(slot) = self.callbacks.borrow_mut().get_mut(id) {
                    *slot = Some(callback);
                }
            }
        }

        // Timelines
        let mut fired = Vec::new();
        for (id, timeline) in self.timelines.borrow_mut().iter_mut() {
            for cue in timeline.tick(dt) {
                fired.push((id, cue));
            }
        }
        if !fired.is_empty() {
            tracing::trace!(count = fired.len(), now, "cues fired");
        }
        fired
    }
}

/// The frame scheduler
///
/// Held by the page composition root and shared via `SchedulerHandle`.
pub struct AnimationScheduler {
    inner: Rc<SchedulerInner>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SchedulerInner::new()),
        }
    }

    /// Get a weak handle for components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Clamp long frames: any `dt` above `threshold_ms` is treated as
    /// `adjusted_ms`. A threshold of 0 disables smoothing.
    pub fn lag_smoothing(&self, threshold_ms: Millis, adjusted_ms: Millis) {
        self.inner.lag_threshold_ms.set(threshold_ms.max(0.0));
        self.inner.lag_adjusted_ms.set(adjusted_ms.max(0.0));
    }

    /// Advance by `dt_ms`; returns cues fired by timelines this frame
    pub fn tick(&self, dt_ms: Millis) -> Vec<(TimelineId, Cue)> {
        self.inner.tick(dt_ms)
    }

    /// Advance to the absolute frame time `now_ms`
    ///
    /// The first call only records the time.
    pub fn tick_at(&self, now_ms: Millis) -> Vec<(TimelineId, Cue)> {
        let dt = match self.inner.last_frame.get() {
            Some(last) => now_ms - last,
            None => 0.0,
        };
        self.inner.last_frame.set(Some(now_ms));
        self.inner.tick(dt)
    }

    /// Scheduler clock, the sum of all (smoothed) frame deltas
    pub fn now(&self) -> Millis {
        self.inner.clock.get()
    }

    pub fn frame_count(&self) -> u64 {
        self.inner.frames.get()
    }

    /// Check if any timeline is still playing
    pub fn has_active_animations(&self) -> bool {
        self.inner
            .timelines
            .borrow()
            .values()
            .any(|t| t.is_playing())
    }

    pub fn timeline_count(&self) -> usize {
        self.inner.timelines.borrow().len()
    }

    pub fn callback_count(&self) -> usize {
        self.inner.callbacks.borrow().len()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the animation scheduler
///
/// It won't prevent the scheduler from being dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<SchedulerInner>,
}

impl SchedulerHandle {
    // =========================================================================
    // Timeline Operations
    // =========================================================================

    /// Register a timeline and return its ID
    pub fn register_timeline(&self, timeline: Timeline) -> Option<TimelineId> {
        self.inner
            .upgrade()
            .map(|inner| inner.timelines.borrow_mut().insert(timeline))
    }

    /// Access a timeline mutably
    pub fn with_timeline<F, R>(&self, id: TimelineId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Timeline) -> R,
    {
        let inner = self.inner.upgrade()?;
        let mut timelines = inner.timelines.borrow_mut();
        timelines.get_mut(id).map(f)
    }

    pub fn play_timeline(&self, id: TimelineId) {
        self.with_timeline(id, |t| t.play());
    }

    pub fn reverse_timeline(&self, id: TimelineId) {
        self.with_timeline(id, |t| t.reverse());
    }

    pub fn is_timeline_playing(&self, id: TimelineId) -> bool {
        self.with_timeline(id, |t| t.is_playing()).unwrap_or(false)
    }

    pub fn remove_timeline(&self, id: TimelineId) -> Option<Timeline> {
        self.inner
            .upgrade()
            .and_then(|inner| inner.timelines.borrow_mut().remove(id))
    }

    // =========================================================================
    // Tick Callbacks
    // =========================================================================

    /// Register a per-frame callback
    pub fn add_tick_callback<F>(&self, callback: F) -> Option<TickCallbackId>
    where
        F: FnMut(Millis, Millis) + 'static,
    {
        self.inner.upgrade().map(|inner| {
            inner
                .callbacks
                .borrow_mut()
                .insert(Some(Box::new(callback)))
        })
    }

    pub fn remove_tick_callback(&self, id: TickCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.callbacks.borrow_mut().remove(id);
        }
    }

    /// Current scheduler clock, or 0 if the scheduler is gone
    pub fn now(&self) -> Millis {
        self.inner.upgrade().map(|i| i.clock.get()).unwrap_or(0.0)
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}
