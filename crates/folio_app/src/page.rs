//! The page composition root
//!
//! `Page` owns the scheduler, the smooth-scroll source, the reactive graph
//! and every controller. The host feeds it input events and asks for a
//! frame once per display refresh:
//!
//! ```ignore
//! let mut page = Page::new(PortfolioContent::builtin()?, PageConfig::default())?;
//! page.mount(&layout, now);
//!
//! // per input event
//! page.handle_event(&InputEvent::PointerMove { x, y }, now, &layout);
//!
//! // per display refresh
//! let frame = page.frame(now, &layout);
//! layout.scroll_to(frame.scroll_y);
//! ```
//!
//! Each frame derives page state (active section, scrolled flag) before
//! sampling animations, so a frame never renders values from two different
//! scroll positions.

use std::cell::RefCell;
use std::rc::Rc;

use folio_animation::{
    AnimationScheduler, Cue, TargetId, TickCallbackId, TimelineId, VisualState,
};
use folio_core::reactive::{Effect, ReactiveGraph};
use folio_core::{InputEvent, Millis, Point, Rect, Size};
use folio_layout::{
    DocumentLayout, MotionDriver, Pose, ScrollController, ScrollState, ScrollTarget,
    ScrollToOptions, SectionId, SmoothScrollHandle, SpritePosition, ViewportMetrics,
};
use rustc_hash::FxHashMap;

use crate::config::PageConfig;
use crate::content::PortfolioContent;
use crate::error::Result;
use crate::header::{Header, NavItem, HEADER_TARGET};
use crate::hero::Hero;
use crate::sections::{HoverRegistry, SectionReveals};

/// Everything a renderer needs for one frame
#[derive(Clone, Debug)]
pub struct Frame {
    pub now: Millis,
    /// Scroll offset the host should display
    pub scroll_y: f32,
    pub active_section: SectionId,
    pub is_scrolled: bool,
    pub pose: Pose,
    /// Viewport rect of the character sprite
    pub sprite: Rect,
    /// Visual state of every animated target
    pub states: FxHashMap<TargetId, VisualState>,
    /// Whether anything is still moving
    pub animating: bool,
}

impl Frame {
    pub fn state(&self, target: &str) -> Option<VisualState> {
        self.states.get(&TargetId::from(target)).copied()
    }
}

pub struct Page {
    content: PortfolioContent,
    config: PageConfig,
    scheduler: AnimationScheduler,
    graph: ReactiveGraph,
    scroll: SmoothScrollHandle,
    scroll_tick: Option<TickCallbackId>,
    motion: Rc<RefCell<MotionDriver>>,
    reveals: SectionReveals,
    hovers: HoverRegistry,
    header: Header,
    hero: Hero,
    last_frame: Option<Millis>,
    mounted: bool,
}

impl Page {
    /// Compose a page; fails only on inconsistent content or configuration
    pub fn new(content: PortfolioContent, config: PageConfig) -> Result<Self> {
        let sections = config.section_registry()?;
        content.validate(&sections)?;

        let scheduler = AnimationScheduler::new();
        scheduler.lag_smoothing(config.ticker.lag_threshold_ms, config.ticker.lag_adjusted_ms);
        let handle = scheduler.handle();
        let mut graph = ReactiveGraph::new();

        let scroll = SmoothScrollHandle::new(config.scroll);
        let scroll_tick = scroll.attach_to(&handle);

        let motion = Rc::new(RefCell::new(MotionDriver::new(handle.clone())));
        let reveals = SectionReveals::register(&mut motion.borrow_mut(), &content, &config);
        MotionDriver::attach(&motion, &scroll);

        let hovers = HoverRegistry::new(&handle, &content);
        let hero_anchor = sections.first().anchor().to_string();
        let header = Header::new(
            &mut graph,
            handle.clone(),
            sections,
            config.tracker,
            content.navigation.clone(),
            config.header.clone(),
        );
        let hero = Hero::new(&mut graph, handle, hero_anchor, &content.hero, &config);

        tracing::debug!(
            sections = config.sections.len(),
            reveals = reveals.all().len(),
            hovers = hovers.len(),
            "page composed"
        );

        Ok(Self {
            content,
            config,
            scheduler,
            graph,
            scroll,
            scroll_tick,
            motion,
            reveals,
            hovers,
            header,
            hero,
            last_frame: None,
            mounted: false,
        })
    }

    /// Page with the built-in content and default configuration
    pub fn builtin() -> Result<Self> {
        Self::new(PortfolioContent::builtin()?, PageConfig::default())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Measure the layout and start the entrance animations
    ///
    /// Reveals whose trigger is already passed play right away. Mounting
    /// twice is a no-op.
    pub fn mount<M: ViewportMetrics + ?Sized>(&mut self, metrics: &M, now: Millis) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        self.measure(metrics);
        self.scroll.sync_native(metrics.scroll_y());
        self.header.on_scroll(&mut self.graph, metrics);
        self.hero.on_scroll(metrics);
        self.motion.borrow_mut().refresh(metrics);

        self.header.play_intro();
        self.hero.play_entrance();

        // cues placed at offset 0 fire on this first tick
        let cues = self.scheduler.tick_at(now);
        self.route_cues(cues, now);
        self.last_frame = Some(now);
        tracing::debug!(now, scroll_y = metrics.scroll_y(), "page mounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn route_cues(&mut self, cues: Vec<(TimelineId, Cue)>, now: Millis) {
        for (timeline, cue) in cues {
            if !self.hero.on_cue(timeline, &cue, now) {
                tracing::trace!(label = %cue.label, "unhandled cue");
            }
        }
    }

    fn measure<M: ViewportMetrics + ?Sized>(&mut self, metrics: &M) {
        let viewport = metrics.viewport();
        self.hero.resize(viewport);
        self.scroll
            .set_dimensions(viewport.height, metrics.document_height());
    }

    /// Apply one host event
    pub fn handle_event<M: ViewportMetrics + ?Sized>(
        &mut self,
        event: &InputEvent,
        now: Millis,
        metrics: &M,
    ) {
        tracing::trace!(?event, now, "event");
        match event {
            InputEvent::Scroll { y } => {
                self.scroll.sync_native(*y);
                self.header.on_scroll(&mut self.graph, metrics);
                self.hero.on_scroll(metrics);
            }
            InputEvent::Wheel { delta_y } => self.scroll.on_wheel(*delta_y),
            InputEvent::PointerMove { x, .. } => {
                self.hero.on_pointer_move(&mut self.graph, *x, now);
            }
            InputEvent::Resize { width, height } => {
                tracing::debug!(width, height, "resize");
                self.measure(metrics);
                self.motion.borrow_mut().refresh(metrics);
                self.header.on_scroll(&mut self.graph, metrics);
                self.hero.on_scroll(metrics);
            }
            InputEvent::Intersection { target, ratio } => {
                if target == self.hero.anchor() {
                    self.hero.on_intersection(*ratio);
                }
            }
        }
    }

    /// Advance animations to `now` and collect the frame
    pub fn frame<M: ViewportMetrics + ?Sized>(&mut self, now: Millis, metrics: &M) -> Frame {
        self.header.on_scroll(&mut self.graph, metrics);

        let dt = self.last_frame.map_or(0.0, |last| (now - last).max(0.0));
        self.last_frame = Some(now);
        let cues = self.scheduler.tick_at(now);
        self.route_cues(cues, now);
        self.hero.tick(&mut self.graph, now, dt);
        self.motion.borrow_mut().sync_states();

        let states = self
            .targets()
            .into_iter()
            .filter_map(|target| self.visual_state(&target).map(|state| (target, state)))
            .collect();

        Frame {
            now,
            scroll_y: self.scroll.scroll(),
            active_section: self.header.active().clone(),
            is_scrolled: self.header.is_scrolled(),
            pose: self.hero.pose(),
            sprite: self.hero.sprite_rect(now),
            states,
            animating: self.scheduler.has_active_animations() || self.scroll.state().is_active(),
        }
    }

    /// Run a frame against a headless document, writing the smooth-scroll
    /// position back into it
    pub fn step(&mut self, now: Millis, document: &mut DocumentLayout) -> Frame {
        let frame = self.frame(now, document);
        if frame.scroll_y != document.scroll_y() {
            document.set_scroll_y(frame.scroll_y);
            let y = document.scroll_y();
            self.handle_event(&InputEvent::Scroll { y }, now, document);
        }
        frame
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Smooth-scroll to a section below the header
    pub fn navigate<M: ViewportMetrics + ?Sized>(&mut self, section: &str, metrics: &M) -> bool {
        self.header.navigate(section, metrics, &self.scroll)
    }

    /// Click on the hero stage; scrolls to the section linked to the object
    /// under the pointer
    pub fn click<M: ViewportMetrics + ?Sized>(
        &mut self,
        point: Point,
        metrics: &M,
    ) -> Option<SectionId> {
        let object = self.hero.object_at(point)?;
        let Some(section) = object.target.clone() else {
            tracing::trace!(object = %object.name, "object has no link");
            return None;
        };
        let top = metrics.document_top(section.as_str())?;
        tracing::debug!(object = %object.name, %section, "stage object clicked");
        self.scroll
            .scroll_to(ScrollTarget::Offset(top), ScrollToOptions::default());
        Some(section)
    }

    /// The hero's scroll indicator was clicked
    pub fn scroll_hint(&self, viewport: Size) {
        self.hero.scroll_hint(&self.scroll, viewport);
    }

    pub fn hover_enter(&mut self, element: &str) -> bool {
        self.hovers.enter(element)
    }

    pub fn hover_leave(&mut self, element: &str) -> bool {
        self.hovers.leave(element)
    }

    /// Run `f` whenever the signals it reads change
    pub fn create_effect<F>(&mut self, f: F) -> Effect
    where
        F: FnMut(&ReactiveGraph) + 'static,
    {
        self.graph.create_effect(f)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn content(&self) -> &PortfolioContent {
        &self.content
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn graph(&self) -> &ReactiveGraph {
        &self.graph
    }

    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    /// The shared scroll source, usable as a `ScrollController`
    pub fn scroll(&self) -> &SmoothScrollHandle {
        &self.scroll
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll.state()
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn hero(&self) -> &Hero {
        &self.hero
    }

    pub fn reveals(&self) -> &SectionReveals {
        &self.reveals
    }

    pub fn motion(&self) -> std::cell::Ref<'_, MotionDriver> {
        self.motion.borrow()
    }

    pub fn active_section(&self) -> &SectionId {
        self.header.active()
    }

    pub fn is_scrolled(&self) -> bool {
        self.header.is_scrolled()
    }

    pub fn nav_items(&self) -> Vec<NavItem> {
        self.header.nav_items()
    }

    pub fn pose(&self) -> Pose {
        self.hero.pose()
    }

    pub fn sprite_position(&self, now: Millis) -> SpritePosition {
        self.hero.sprite_position(now)
    }

    /// Current visual state of any animated target
    pub fn visual_state(&self, target: &TargetId) -> Option<VisualState> {
        if target.as_str() == HEADER_TARGET {
            return Some(self.header.visual_state());
        }
        self.hovers
            .visual_state(target)
            .or_else(|| self.hero.visual_state(target))
            .or_else(|| self.motion.borrow().visual_state(target))
    }

    /// Every target the page animates
    pub fn targets(&self) -> Vec<TargetId> {
        let mut out = vec![TargetId::from(HEADER_TARGET)];
        out.extend(self.hero.targets());
        let motion = self.motion.borrow();
        for id in self.reveals.all() {
            out.extend(motion.targets(id).iter().cloned());
        }
        out.extend(self.hovers.targets().cloned());
        out
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        if let Some(id) = self.motion.borrow().listener() {
            self.scroll.off(id);
        }
        if let Some(id) = self.scroll_tick.take() {
            self.scheduler.handle().remove_tick_callback(id);
        }
    }
}
