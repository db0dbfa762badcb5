//! Folio Portfolio Page
//!
//! Content, configuration and the composition root of the portfolio page.
//!
//! # Example (Headless)
//!
//! ```ignore
//! use folio_app::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut page = Page::builtin()?;
//!     let mut layout = DocumentLayout::stacked(
//!         Size::new(1440.0, 900.0),
//!         [("about", 900.0), ("experience", 1600.0), ("skills", 900.0)],
//!     );
//!
//!     page.mount(&layout, 0.0);
//!     page.handle_event(&InputEvent::Wheel { delta_y: 600.0 }, 16.0, &layout);
//!
//!     let frame = page.step(16.0, &mut layout);
//!     println!("{} at {}", frame.active_section, frame.scroll_y);
//!     Ok(())
//! }
//! ```

mod config;
mod content;
mod error;
mod header;
mod hero;
mod page;
mod sections;

#[cfg(test)]
mod tests;

pub use config::{
    ColorScheme, EntranceStep, ExperienceConfig, HeaderConfig, HeroConfig, PageConfig,
    ParallaxConfig, RevealConfig, SectionConfig, SectionLayout, SectionStyle, StageConfig,
    TickerConfig,
};
pub use content::{
    ContactContent, ContactLink, ExperienceContent, ExperienceEntry, FooterContent, FooterLink,
    HeroContent, NavLink, Owner, PortfolioContent, Project, ProjectsContent, SkillGroup,
    SkillsContent, DEFAULT_CONTENT,
};
pub use error::{FolioError, Result};
pub use header::{Header, NavItem, HEADER_TARGET};
pub use hero::{targets as hero_targets, Hero, CHARACTER_CUE, PROFILE_FADE_CUE};
pub use page::{Frame, Page};
pub use sections::{targets as section_targets, HoverRegistry, SectionReveals};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::config::PageConfig;
    pub use crate::content::PortfolioContent;
    pub use crate::error::{FolioError, Result};
    pub use crate::page::{Frame, Page};

    pub use folio_animation::{TargetId, VisualState};
    pub use folio_core::{InputEvent, Millis, Point, Rect, Size};
    pub use folio_layout::{DocumentLayout, Pose, SectionId, ViewportMetrics};
}
