//! Header: navigation, active section and scrolled state

use folio_animation::{
    Easing, SchedulerHandle, TargetId, Timeline, TimelineId, Tween, VisualState,
};
use folio_core::reactive::{ReactiveGraph, Signal};
use folio_layout::{
    ActiveSectionTracker, ScrollController, ScrollTarget, ScrollToOptions, SectionId,
    SectionRegistry, TrackerConfig, TrackerUpdate, ViewportMetrics,
};

use crate::config::HeaderConfig;
use crate::content::NavLink;

/// Animation target of the header bar
pub const HEADER_TARGET: &str = "header";

/// A navigation entry as rendered
#[derive(Clone, Debug, PartialEq)]
pub struct NavItem {
    pub label: String,
    pub section: SectionId,
    pub is_active: bool,
}

pub struct Header {
    scheduler: SchedulerHandle,
    config: HeaderConfig,
    tracker: ActiveSectionTracker,
    nav: Vec<NavLink>,
    active: Signal<SectionId>,
    scrolled: Signal<bool>,
    intro: Option<TimelineId>,
}

impl Header {
    pub fn new(
        graph: &mut ReactiveGraph,
        scheduler: SchedulerHandle,
        sections: SectionRegistry,
        tracker: TrackerConfig,
        nav: Vec<NavLink>,
        config: HeaderConfig,
    ) -> Self {
        let tracker = ActiveSectionTracker::new(sections, tracker);
        let active = graph.create_signal(tracker.active().clone());
        let scrolled = graph.create_signal(false);
        Self {
            scheduler,
            config,
            tracker,
            nav,
            active,
            scrolled,
            intro: None,
        }
    }

    pub fn active(&self) -> &SectionId {
        self.tracker.active()
    }

    pub fn is_scrolled(&self) -> bool {
        self.tracker.is_scrolled()
    }

    /// Signal carrying the active section
    pub fn active_signal(&self) -> Signal<SectionId> {
        self.active
    }

    /// Signal carrying whether the page is scrolled past the threshold
    pub fn scrolled_signal(&self) -> Signal<bool> {
        self.scrolled
    }

    pub fn tracker(&self) -> &ActiveSectionTracker {
        &self.tracker
    }

    pub fn nav_items(&self) -> Vec<NavItem> {
        let active = self.tracker.active();
        self.nav
            .iter()
            .map(|link| NavItem {
                label: link.label.clone(),
                section: link.section.clone(),
                is_active: &link.section == active,
            })
            .collect()
    }

    /// Start the slide-in
    pub fn play_intro(&mut self) {
        if self.intro.is_some() {
            return;
        }
        let step = &self.config.intro;
        let mut timeline = Timeline::new();
        timeline.add(
            HEADER_TARGET,
            Tween::from(step.from, step.duration_ms).easing(step.easing),
            step.position(),
        );
        timeline.play();
        self.intro = self.scheduler.register_timeline(timeline);
    }

    /// Re-derive the active section and scrolled flag, publishing changes
    pub fn on_scroll<M: ViewportMetrics + ?Sized>(
        &mut self,
        graph: &mut ReactiveGraph,
        metrics: &M,
    ) -> TrackerUpdate {
        let update = self.tracker.on_scroll(metrics);
        if update.changed() {
            let (active, scrolled) = (self.active, self.scrolled);
            graph.batch(|g| {
                g.set(active, update.active.clone());
                g.set(scrolled, update.is_scrolled);
            });
        }
        update
    }

    /// Scroll to a section, leaving room for the header
    ///
    /// Returns false when the section is unknown or its element is missing.
    pub fn navigate<M: ViewportMetrics + ?Sized>(
        &self,
        section: &str,
        metrics: &M,
        controller: &dyn ScrollController,
    ) -> bool {
        let Some(section) = self.tracker.sections().get(section) else {
            tracing::warn!(section, "navigation to unknown section");
            return false;
        };
        let Some(top) = metrics.document_top(section.anchor()) else {
            tracing::warn!(section = %section.id, "navigation target has no element");
            return false;
        };

        tracing::debug!(section = %section.id, top, "navigate");
        controller.scroll_to(
            ScrollTarget::Offset(top),
            ScrollToOptions::default()
                .offset(-self.config.nav_offset)
                .duration(self.config.nav_duration_ms)
                .easing(self.config.nav_easing),
        );
        true
    }

    pub fn nav_easing(&self) -> Easing {
        self.config.nav_easing
    }

    /// Current visual state of the header bar
    pub fn visual_state(&self) -> VisualState {
        let target = TargetId::from(HEADER_TARGET);
        self.intro
            .and_then(|id| self.scheduler.with_timeline(id, |t| t.state_of(&target)))
            .flatten()
            .unwrap_or_default()
    }
}

impl Drop for Header {
    fn drop(&mut self) {
        if let Some(id) = self.intro.take() {
            self.scheduler.remove_timeline(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_animation::{AnimationScheduler, Interpolate};
    use folio_core::Size;
    use folio_layout::DocumentLayout;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingController {
        calls: RefCell<Vec<(ScrollTarget, ScrollToOptions)>>,
    }

    impl ScrollController for RecordingController {
        fn scroll_to(&self, target: ScrollTarget, options: ScrollToOptions) {
            self.calls.borrow_mut().push((target, options));
        }
    }

    fn nav() -> Vec<NavLink> {
        ["about", "skills", "projects", "experience", "contact"]
            .into_iter()
            .map(|id| NavLink {
                label: id.to_uppercase(),
                section: id.into(),
            })
            .collect()
    }

    fn header(graph: &mut ReactiveGraph, scheduler: &AnimationScheduler) -> Header {
        let sections =
            SectionRegistry::new(["about", "experience", "skills", "projects", "contact"]).unwrap();
        Header::new(
            graph,
            scheduler.handle(),
            sections,
            TrackerConfig::default(),
            nav(),
            HeaderConfig::default(),
        )
    }

    fn page() -> DocumentLayout {
        DocumentLayout::stacked(
            Size::new(1440.0, 900.0),
            [
                ("about", 900.0),
                ("experience", 1200.0),
                ("skills", 800.0),
                ("projects", 1400.0),
                ("contact", 700.0),
            ],
        )
    }

    #[test]
    fn test_scroll_publishes_signals() {
        let scheduler = AnimationScheduler::new();
        let mut graph = ReactiveGraph::new();
        let mut header = header(&mut graph, &scheduler);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let active = header.active_signal();
        graph.create_effect(move |g| {
            if let Some(id) = g.get(active) {
                sink.borrow_mut().push(id.to_string());
            }
        });

        let mut doc = page();
        doc.set_scroll_y(1000.0);
        let update = header.on_scroll(&mut graph, &doc);
        assert!(update.active_changed);
        assert_eq!(header.active(), "experience");
        assert_eq!(graph.get(header.scrolled_signal()), Some(true));
        assert_eq!(*seen.borrow(), ["about", "experience"]);

        // same geometry, nothing republished
        header.on_scroll(&mut graph, &doc);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_nav_items_flag_active() {
        let scheduler = AnimationScheduler::new();
        let mut graph = ReactiveGraph::new();
        let mut header = header(&mut graph, &scheduler);
        let mut doc = page();
        doc.set_scroll_y(2100.0);
        header.on_scroll(&mut graph, &doc);

        let active: Vec<_> = header
            .nav_items()
            .into_iter()
            .filter(|item| item.is_active)
            .map(|item| item.section)
            .collect();
        assert_eq!(active, [SectionId::from("skills")]);
    }

    #[test]
    fn test_navigate_offsets_for_header() {
        let scheduler = AnimationScheduler::new();
        let mut graph = ReactiveGraph::new();
        let header = header(&mut graph, &scheduler);
        let controller = RecordingController::default();
        let mut doc = page();
        doc.set_scroll_y(500.0);

        assert!(header.navigate("projects", &doc, &controller));
        let calls = controller.calls.borrow();
        let (target, options) = calls[0];
        assert_eq!(target, ScrollTarget::Offset(2900.0));
        assert_eq!(options.offset, -80.0);
        assert_eq!(options.duration_ms, Some(100.0));
        assert_eq!(options.easing, Some(header.nav_easing()));
    }

    #[test]
    fn test_navigate_unknown_or_missing_is_noop() {
        let scheduler = AnimationScheduler::new();
        let mut graph = ReactiveGraph::new();
        let header = header(&mut graph, &scheduler);
        let controller = RecordingController::default();
        let mut doc = page();
        doc.remove_element("contact");

        assert!(!header.navigate("blog", &doc, &controller));
        assert!(!header.navigate("contact", &doc, &controller));
        assert!(controller.calls.borrow().is_empty());
    }

    #[test]
    fn test_intro_slides_in() {
        let scheduler = AnimationScheduler::new();
        let mut graph = ReactiveGraph::new();
        let mut header = header(&mut graph, &scheduler);
        assert_eq!(header.visual_state(), VisualState::IDENTITY);

        header.play_intro();
        scheduler.tick(0.0);
        let start = header.visual_state();
        assert_eq!(start.opacity, 0.0);
        assert_eq!(start.y, -20.0);

        scheduler.tick(800.0);
        assert!(header.visual_state().approx_eq(&VisualState::IDENTITY, 1e-4));
    }
}
