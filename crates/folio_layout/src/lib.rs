//! Folio Layout
//!
//! The page-level derivations that sit between raw host input and the
//! animation system:
//!
//! - **Sections**: the ordered section registry and the `ViewportMetrics` seam
//! - **Tracker**: which section is active, and whether the page is scrolled
//! - **Stage**: a fixed-aspect canvas fitted to the viewport with "cover"
//! - **Pointer**: pointer movement to sprite pose and position
//! - **Fragment**: rich text to ordered per-character tokens
//! - **Scroll**: smooth scrolling and the `ScrollController` handle
//! - **Trigger**: scroll-position triggers with toggle actions
//! - **Motion**: scroll-synchronized reveals over staggered timelines
//! - **Parallax / Hover**: scroll-linked offsets and hover timelines

pub mod error;
pub mod fragment;
pub mod hover;
pub mod motion;
pub mod parallax;
pub mod pointer;
pub mod scroll;
pub mod section;
pub mod stage;
pub mod tracker;
pub mod trigger;

pub use error::{LayoutError, Result};
pub use fragment::{
    fragment, CharToken, FragmentOptions, Fragmentation, MountedText, RichNode, RichTree,
    Wrapper,
};
pub use hover::{HoverEffect, HoverStep};
pub use motion::{MotionDriver, RevealId, RevealSpec, RevealState};
pub use parallax::Parallax;
pub use pointer::{PointerPoseMapper, Pose, PoseConfig, SpritePosition};
pub use scroll::{
    ScrollController, ScrollListenerId, ScrollState, ScrollTarget, ScrollTick, ScrollToOptions,
    SmoothScroll, SmoothScrollConfig, SmoothScrollHandle,
};
pub use section::{DocumentLayout, Section, SectionId, SectionRegistry, ViewportMetrics};
pub use stage::{Stage, StageObject};
pub use tracker::{ActiveSectionTracker, TrackerConfig, TrackerUpdate};
pub use trigger::{
    Edge, ScrollTrigger, ToggleAction, ToggleActions, TriggerEnd, TriggerEvent, TriggerParseError,
    TriggerPoint, TriggerStart,
};
