//! Scroll triggers
//!
//! A trigger watches one element against the scroll offset. Its start and
//! end are written as `"<element edge> <viewport edge>"`, e.g. `"top 80%"`
//! means "when the element's top meets the line 80% down the viewport".
//! Crossing either boundary produces an event, and each of the four events
//! maps to a toggle action, written as e.g. `"play none none reverse"`.
//!
//! ```
//! use folio_layout::trigger::{ToggleAction, ToggleActions, TriggerPoint};
//!
//! let start: TriggerPoint = "top 80%".parse().unwrap();
//! assert_eq!(start.to_string(), "top 80%");
//!
//! let actions: ToggleActions = "play none none reverse".parse().unwrap();
//! assert_eq!(actions.on_leave_back, ToggleAction::Reverse);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use thiserror::Error;

use crate::section::ViewportMetrics;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TriggerParseError {
    #[error("trigger position is empty")]
    Empty,

    #[error("invalid trigger edge `{0}`")]
    Edge(String),

    #[error("trigger position `{0}` must have two parts")]
    Arity(String),

    #[error("unknown toggle action `{0}`")]
    Action(String),

    #[error("expected 4 toggle actions, found {0}")]
    ActionCount(usize),
}

// ============================================================================
// Trigger Points
// ============================================================================

/// A line across an element or the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    /// Fraction of the extent from its top (`top` = 0, `center` = 0.5)
    Fraction(f32),
    /// Pixels from the top
    Pixels(f32),
}

impl Edge {
    pub const TOP: Edge = Edge::Fraction(0.0);
    pub const CENTER: Edge = Edge::Fraction(0.5);
    pub const BOTTOM: Edge = Edge::Fraction(1.0);

    /// Offset from the top of an extent of the given height
    pub fn resolve(&self, extent: f32) -> f32 {
        match *self {
            Edge::Fraction(f) => f * extent,
            Edge::Pixels(px) => px,
        }
    }
}

impl FromStr for Edge {
    type Err = TriggerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TriggerParseError::Edge(s.to_string());
        match s {
            "top" => Ok(Edge::TOP),
            "center" => Ok(Edge::CENTER),
            "bottom" => Ok(Edge::BOTTOM),
            _ => {
                if let Some(pct) = s.strip_suffix('%') {
                    let pct: f32 = pct.parse().map_err(|_| invalid())?;
                    Ok(Edge::Fraction(pct / 100.0))
                } else {
                    let px = s.strip_suffix("px").unwrap_or(s);
                    px.parse().map(Edge::Pixels).map_err(|_| invalid())
                }
            }
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Edge::Fraction(v) if v == 0.0 => f.write_str("top"),
            Edge::Fraction(v) if v == 0.5 => f.write_str("center"),
            Edge::Fraction(v) if v == 1.0 => f.write_str("bottom"),
            Edge::Fraction(v) => write!(f, "{}%", v * 100.0),
            Edge::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

/// Where a trigger starts or ends: an element edge meeting a viewport edge
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TriggerPoint {
    pub element: Edge,
    pub viewport: Edge,
}

pub type TriggerStart = TriggerPoint;
pub type TriggerEnd = TriggerPoint;

impl TriggerPoint {
    pub const fn new(element: Edge, viewport: Edge) -> Self {
        Self { element, viewport }
    }

    /// Element top meets the viewport line `fraction` down the screen
    pub const fn top_at(fraction: f32) -> Self {
        Self::new(Edge::TOP, Edge::Fraction(fraction))
    }

    /// `"top bottom"`, the default start
    pub const fn default_start() -> Self {
        Self::new(Edge::TOP, Edge::BOTTOM)
    }

    /// `"bottom top"`, the default end
    pub const fn default_end() -> Self {
        Self::new(Edge::BOTTOM, Edge::TOP)
    }

    /// Scroll offset at which this point is reached
    pub fn scroll_offset(&self, element_top: f32, element_height: f32, viewport_height: f32) -> f32 {
        element_top + self.element.resolve(element_height) - self.viewport.resolve(viewport_height)
    }
}

impl FromStr for TriggerPoint {
    type Err = TriggerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: SmallVec<[&str; 2]> = s.split_whitespace().collect();
        match parts.as_slice() {
            [] => Err(TriggerParseError::Empty),
            [element, viewport] => Ok(Self::new(element.parse()?, viewport.parse()?)),
            _ => Err(TriggerParseError::Arity(s.to_string())),
        }
    }
}

impl fmt::Display for TriggerPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

impl TryFrom<String> for TriggerPoint {
    type Error = TriggerParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TriggerPoint> for String {
    fn from(point: TriggerPoint) -> Self {
        point.to_string()
    }
}

// ============================================================================
// Toggle Actions
// ============================================================================

/// What a trigger does to its animation when crossed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ToggleAction {
    Play,
    Pause,
    Resume,
    Reverse,
    Restart,
    Reset,
    Complete,
    #[default]
    None,
}

impl ToggleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleAction::Play => "play",
            ToggleAction::Pause => "pause",
            ToggleAction::Resume => "resume",
            ToggleAction::Reverse => "reverse",
            ToggleAction::Restart => "restart",
            ToggleAction::Reset => "reset",
            ToggleAction::Complete => "complete",
            ToggleAction::None => "none",
        }
    }
}

impl FromStr for ToggleAction {
    type Err = TriggerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "play" => ToggleAction::Play,
            "pause" => ToggleAction::Pause,
            "resume" => ToggleAction::Resume,
            "reverse" => ToggleAction::Reverse,
            "restart" => ToggleAction::Restart,
            "reset" => ToggleAction::Reset,
            "complete" => ToggleAction::Complete,
            "none" => ToggleAction::None,
            other => return Err(TriggerParseError::Action(other.to_string())),
        })
    }
}

/// Actions for onEnter, onLeave, onEnterBack and onLeaveBack
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToggleActions {
    pub on_enter: ToggleAction,
    pub on_leave: ToggleAction,
    pub on_enter_back: ToggleAction,
    pub on_leave_back: ToggleAction,
}

impl ToggleActions {
    /// `"play none none reverse"`: reveal on the way down, undo on the way back up
    pub const PLAY_REVERSE: ToggleActions = ToggleActions {
        on_enter: ToggleAction::Play,
        on_leave: ToggleAction::None,
        on_enter_back: ToggleAction::None,
        on_leave_back: ToggleAction::Reverse,
    };

    pub fn action_for(&self, event: TriggerEvent) -> ToggleAction {
        match event {
            TriggerEvent::Enter => self.on_enter,
            TriggerEvent::Leave => self.on_leave,
            TriggerEvent::EnterBack => self.on_enter_back,
            TriggerEvent::LeaveBack => self.on_leave_back,
        }
    }
}

impl Default for ToggleActions {
    /// `"play none none none"`
    fn default() -> Self {
        Self {
            on_enter: ToggleAction::Play,
            on_leave: ToggleAction::None,
            on_enter_back: ToggleAction::None,
            on_leave_back: ToggleAction::None,
        }
    }
}

impl FromStr for ToggleActions {
    type Err = TriggerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: SmallVec<[&str; 4]> = s.split_whitespace().collect();
        if words.len() != 4 {
            return Err(TriggerParseError::ActionCount(words.len()));
        }
        Ok(Self {
            on_enter: words[0].parse()?,
            on_leave: words[1].parse()?,
            on_enter_back: words[2].parse()?,
            on_leave_back: words[3].parse()?,
        })
    }
}

impl fmt::Display for ToggleActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.on_enter.as_str(),
            self.on_leave.as_str(),
            self.on_enter_back.as_str(),
            self.on_leave_back.as_str()
        )
    }
}

impl TryFrom<String> for ToggleActions {
    type Error = TriggerParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ToggleActions> for String {
    fn from(actions: ToggleActions) -> Self {
        actions.to_string()
    }
}

// ============================================================================
// Scroll Trigger
// ============================================================================

/// A boundary crossing, named by direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    /// Crossed the start scrolling down
    Enter,
    /// Crossed the end scrolling down
    Leave,
    /// Crossed the end scrolling up
    EnterBack,
    /// Crossed the start scrolling up
    LeaveBack,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Zone {
    #[default]
    Before,
    Active,
    After,
}

#[derive(Clone, Debug)]
pub struct ScrollTrigger {
    anchor: String,
    start: TriggerStart,
    end: TriggerEnd,
    actions: ToggleActions,
    /// Start and end scroll offsets, `None` until measured or when the
    /// element is missing
    range: Option<(f32, f32)>,
    zone: Zone,
}

impl ScrollTrigger {
    pub fn new(anchor: impl Into<String>, start: TriggerStart) -> Self {
        Self {
            anchor: anchor.into(),
            start,
            end: TriggerPoint::default_end(),
            actions: ToggleActions::default(),
            range: None,
            zone: Zone::Before,
        }
    }

    pub fn end(mut self, end: TriggerEnd) -> Self {
        self.end = end;
        self
    }

    pub fn actions(mut self, actions: ToggleActions) -> Self {
        self.actions = actions;
        self
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn toggle_actions(&self) -> &ToggleActions {
        &self.actions
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn is_active(&self) -> bool {
        self.zone == Zone::Active
    }

    /// Measured `(start, end)` scroll offsets
    pub fn range(&self) -> Option<(f32, f32)> {
        self.range
    }

    pub fn action_for(&self, event: TriggerEvent) -> ToggleAction {
        self.actions.action_for(event)
    }

    /// Measure the element; returns false when it is missing
    ///
    /// A trigger without a measured element never fires.
    pub fn refresh<M: ViewportMetrics + ?Sized>(&mut self, metrics: &M) -> bool {
        let Some(rect) = metrics.bounding_rect(&self.anchor) else {
            tracing::warn!(anchor = %self.anchor, "trigger element missing");
            self.range = None;
            return false;
        };

        let top = rect.top() + metrics.scroll_y();
        let height = rect.height();
        let viewport = metrics.viewport().height;
        let start = self.start.scroll_offset(top, height, viewport);
        let end = self.end.scroll_offset(top, height, viewport).max(start);
        tracing::trace!(anchor = %self.anchor, start, end, "trigger refreshed");
        self.range = Some((start, end));
        true
    }

    /// Re-evaluate against a scroll offset, returning the crossings in order
    pub fn update(&mut self, scroll_y: f32) -> SmallVec<[TriggerEvent; 2]> {
        let Some((start, end)) = self.range else {
            return SmallVec::new();
        };

        let zone = if scroll_y < start {
            Zone::Before
        } else if scroll_y > end {
            Zone::After
        } else {
            Zone::Active
        };

        let events = match (self.zone, zone) {
            (Zone::Before, Zone::Active) => smallvec![TriggerEvent::Enter],
            (Zone::Before, Zone::After) => smallvec![TriggerEvent::Enter, TriggerEvent::Leave],
            (Zone::Active, Zone::After) => smallvec![TriggerEvent::Leave],
            (Zone::After, Zone::Active) => smallvec![TriggerEvent::EnterBack],
            (Zone::After, Zone::Before) => {
                smallvec![TriggerEvent::EnterBack, TriggerEvent::LeaveBack]
            }
            (Zone::Active, Zone::Before) => smallvec![TriggerEvent::LeaveBack],
            _ => SmallVec::new(),
        };
        self.zone = zone;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::DocumentLayout;
    use folio_core::Size;

    fn doc() -> DocumentLayout {
        DocumentLayout::stacked(
            Size::new(1440.0, 1000.0),
            [("hero", 1000.0), ("skills", 800.0), ("footer", 400.0)],
        )
    }

    #[test]
    fn test_parse_points() {
        let point: TriggerPoint = "top 80%".parse().unwrap();
        assert_eq!(point, TriggerPoint::top_at(0.8));

        let point: TriggerPoint = "center 100px".parse().unwrap();
        assert_eq!(point.element, Edge::CENTER);
        assert_eq!(point.viewport, Edge::Pixels(100.0));
        assert_eq!(point.to_string(), "center 100px");

        assert_eq!("".parse::<TriggerPoint>(), Err(TriggerParseError::Empty));
        assert!(matches!("top".parse::<TriggerPoint>(), Err(TriggerParseError::Arity(_))));
        assert!(matches!("middle 50%".parse::<TriggerPoint>(), Err(TriggerParseError::Edge(_))));
    }

    #[test]
    fn test_parse_actions() {
        let actions: ToggleActions = "play none none reverse".parse().unwrap();
        assert_eq!(actions, ToggleActions::PLAY_REVERSE);
        assert_eq!(actions.to_string(), "play none none reverse");
        assert_eq!(
            "play none".parse::<ToggleActions>(),
            Err(TriggerParseError::ActionCount(2))
        );
        assert_eq!(
            "play none none rewind".parse::<ToggleActions>(),
            Err(TriggerParseError::Action("rewind".into()))
        );
    }

    #[test]
    fn test_refresh_measures_range() {
        let mut trigger = ScrollTrigger::new("skills", TriggerPoint::top_at(0.8));
        assert!(trigger.refresh(&doc()));
        // top 1000 meets 800px down the viewport at scroll 200
        let (start, end) = trigger.range().unwrap();
        assert!((start - 200.0).abs() < 1e-3);
        assert!((end - 1800.0).abs() < 1e-3);
    }

    #[test]
    fn test_missing_element_is_inert() {
        let mut trigger = ScrollTrigger::new("projects", TriggerPoint::top_at(0.75));
        assert!(!trigger.refresh(&doc()));
        assert!(trigger.update(500.0).is_empty());
    }

    #[test]
    fn test_crossings_in_both_directions() {
        let mut trigger = ScrollTrigger::new("skills", TriggerPoint::top_at(0.8))
            .actions(ToggleActions::PLAY_REVERSE);
        trigger.refresh(&doc());

        assert!(trigger.update(0.0).is_empty());
        assert_eq!(trigger.update(250.0).as_slice(), &[TriggerEvent::Enter]);
        assert!(trigger.is_active());
        assert!(trigger.update(300.0).is_empty());
        assert_eq!(trigger.update(2000.0).as_slice(), &[TriggerEvent::Leave]);
        assert_eq!(trigger.update(1000.0).as_slice(), &[TriggerEvent::EnterBack]);
        assert_eq!(trigger.update(100.0).as_slice(), &[TriggerEvent::LeaveBack]);

        assert_eq!(trigger.action_for(TriggerEvent::Enter), ToggleAction::Play);
        assert_eq!(trigger.action_for(TriggerEvent::LeaveBack), ToggleAction::Reverse);
    }

    #[test]
    fn test_jump_over_range_fires_both() {
        let mut trigger = ScrollTrigger::new("skills", TriggerPoint::top_at(0.8));
        trigger.refresh(&doc());
        assert_eq!(
            trigger.update(5000.0).as_slice(),
            &[TriggerEvent::Enter, TriggerEvent::Leave]
        );
        assert_eq!(
            trigger.update(0.0).as_slice(),
            &[TriggerEvent::EnterBack, TriggerEvent::LeaveBack]
        );
    }
}
