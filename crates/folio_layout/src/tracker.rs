//! Active section tracking
//!
//! On every scroll the tracker walks the sections in their fixed order and
//! picks the first one crossing a horizontal probe line near the top of the
//! viewport. When no section crosses it the previous answer stands, so the
//! active section is always exactly one id from the registry.

use serde::{Deserialize, Serialize};

use crate::section::{SectionId, SectionRegistry, ViewportMetrics};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Viewport y of the probe line (px)
    pub probe_line: f32,
    /// Scroll offset past which the page counts as scrolled (px)
    pub scrolled_threshold: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            probe_line: 100.0,
            scrolled_threshold: 20.0,
        }
    }
}

/// Result of one tracker pass
#[derive(Clone, Debug, PartialEq)]
pub struct TrackerUpdate {
    pub active: SectionId,
    pub is_scrolled: bool,
    pub active_changed: bool,
    pub scrolled_changed: bool,
}

impl TrackerUpdate {
    pub fn changed(&self) -> bool {
        self.active_changed || self.scrolled_changed
    }
}

pub struct ActiveSectionTracker {
    sections: SectionRegistry,
    config: TrackerConfig,
    active: SectionId,
    is_scrolled: bool,
}

impl ActiveSectionTracker {
    pub fn new(sections: SectionRegistry, config: TrackerConfig) -> Self {
        let active = sections.first().id.clone();
        Self {
            sections,
            config,
            active,
            is_scrolled: false,
        }
    }

    pub fn active(&self) -> &SectionId {
        &self.active
    }

    pub fn is_scrolled(&self) -> bool {
        self.is_scrolled
    }

    pub fn sections(&self) -> &SectionRegistry {
        &self.sections
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// First section crossing the probe line, without mutating anything
    ///
    /// Sections whose element is missing are skipped.
    pub fn derive_active<M: ViewportMetrics + ?Sized>(&self, metrics: &M) -> Option<SectionId> {
        let probe = self.config.probe_line;
        self.sections.iter().find_map(|section| {
            let rect = match metrics.bounding_rect(section.anchor()) {
                Some(rect) => rect,
                None => {
                    tracing::trace!(section = %section.id, "section anchor missing");
                    return None;
                }
            };
            rect.contains_y(probe).then(|| section.id.clone())
        })
    }

    /// Whether `scroll_y` is past the scrolled threshold
    pub fn derive_scrolled(&self, scroll_y: f32) -> bool {
        scroll_y > self.config.scrolled_threshold
    }

    /// Handle a scroll (or resize) and update the derived state
    pub fn on_scroll<M: ViewportMetrics + ?Sized>(&mut self, metrics: &M) -> TrackerUpdate {
        let mut active_changed = false;
        if let Some(active) = self.derive_active(metrics) {
            if active != self.active {
                tracing::debug!(from = %self.active, to = %active, "active section changed");
                self.active = active;
                active_changed = true;
            }
        }

        let is_scrolled = self.derive_scrolled(metrics.scroll_y());
        let scrolled_changed = is_scrolled != self.is_scrolled;
        self.is_scrolled = is_scrolled;

        TrackerUpdate {
            active: self.active.clone(),
            is_scrolled,
            active_changed,
            scrolled_changed,
        }
    }
}
