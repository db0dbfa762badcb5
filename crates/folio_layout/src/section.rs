//! Sections and viewport metrics
//!
//! A page is an ordered list of named sections fixed at composition time.
//! Geometry comes from the host through `ViewportMetrics`, which answers the
//! same questions a browser would: scroll offset, viewport size and the
//! viewport-relative bounding box of a named element.

use std::borrow::Borrow;
use std::fmt;

use folio_core::{Rect, Size};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Identifier of a page section (its anchor name, e.g. `"skills"`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Borrow<str> for SectionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for SectionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SectionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A named region of the page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub id: SectionId,
    /// Position in the fixed section order
    pub ordinal: usize,
}

impl Section {
    /// Name of the element the section is anchored to
    pub fn anchor(&self) -> &str {
        self.id.as_str()
    }
}

/// The ordered, immutable list of sections
#[derive(Clone, Debug)]
pub struct SectionRegistry {
    sections: IndexMap<SectionId, Section>,
}

impl SectionRegistry {
    /// Build a registry; fails on an empty list or a repeated id
    pub fn new<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SectionId>,
    {
        let mut sections = IndexMap::new();
        for id in ids {
            let id = id.into();
            if sections.contains_key(&id) {
                return Err(LayoutError::DuplicateSection(id.0));
            }
            let ordinal = sections.len();
            sections.insert(id.clone(), Section { id, ordinal });
        }
        if sections.is_empty() {
            return Err(LayoutError::EmptySectionList);
        }
        Ok(Self { sections })
    }

    /// The first section in order (the initial active section)
    pub fn first(&self) -> &Section {
        // A registry is never empty
        &self.sections[0]
    }

    pub fn get(&self, id: &str) -> Option<&Section> {
        self.sections.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sections.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &SectionId> {
        self.sections.keys()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Read-only queries against the host's layout
pub trait ViewportMetrics {
    /// Current vertical scroll offset of the document
    fn scroll_y(&self) -> f32;

    /// Size of the viewport
    fn viewport(&self) -> Size;

    /// Viewport-relative bounding box of a named element, `None` if missing
    fn bounding_rect(&self, anchor: &str) -> Option<Rect>;

    /// Total scrollable document height
    fn document_height(&self) -> f32;

    /// Document-space top edge of a named element
    fn document_top(&self, anchor: &str) -> Option<f32> {
        self.bounding_rect(anchor).map(|r| r.top() + self.scroll_y())
    }
}

/// A static document: element boxes in document space plus a scroll offset
///
/// Stands in for the browser in headless sessions and tests.
#[derive(Clone, Debug, Default)]
pub struct DocumentLayout {
    viewport: Size,
    scroll_y: f32,
    elements: FxHashMap<String, Rect>,
}

impl DocumentLayout {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    /// Stack full-width blocks top to bottom in the given order
    pub fn stacked<'a>(viewport: Size, blocks: impl IntoIterator<Item = (&'a str, f32)>) -> Self {
        let mut layout = Self::new(viewport);
        let mut top = 0.0;
        for (name, height) in blocks {
            layout.set_element(name, Rect::new(0.0, top, viewport.width, height));
            top += height;
        }
        layout
    }

    pub fn with_element(mut self, name: impl Into<String>, rect: Rect) -> Self {
        self.set_element(name, rect);
        self
    }

    pub fn set_element(&mut self, name: impl Into<String>, rect: Rect) {
        self.elements.insert(name.into(), rect);
    }

    pub fn remove_element(&mut self, name: &str) -> Option<Rect> {
        self.elements.remove(name)
    }

    /// Document-space rect of an element
    pub fn element(&self, name: &str) -> Option<Rect> {
        self.elements.get(name).copied()
    }

    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll());
    }

    pub fn max_scroll(&self) -> f32 {
        (self.document_height() - self.viewport.height).max(0.0)
    }

    /// Set the scroll offset, clamped to the scrollable range
    pub fn set_scroll_y(&mut self, y: f32) {
        self.scroll_y = y.clamp(0.0, self.max_scroll());
    }
}

impl ViewportMetrics for DocumentLayout {
    fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn bounding_rect(&self, anchor: &str) -> Option<Rect> {
        self.elements
            .get(anchor)
            .map(|rect| rect.translate(0.0, -self.scroll_y))
    }

    fn document_height(&self) -> f32 {
        self.elements
            .values()
            .map(|r| r.bottom())
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order() {
        let registry = SectionRegistry::new(["about", "experience", "skills"]).unwrap();
        assert_eq!(registry.first().id, "about");
        assert_eq!(registry.get("skills").map(|s| s.ordinal), Some(2));
        let ids: Vec<&str> = registry.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["about", "experience", "skills"]);
    }

    #[test]
    fn test_registry_rejects_bad_input() {
        assert_eq!(
            SectionRegistry::new(Vec::<&str>::new()).unwrap_err(),
            LayoutError::EmptySectionList
        );
        assert_eq!(
            SectionRegistry::new(["about", "about"]).unwrap_err(),
            LayoutError::DuplicateSection("about".into())
        );
    }

    #[test]
    fn test_document_layout_is_viewport_relative() {
        let mut doc = DocumentLayout::stacked(
            Size::new(1440.0, 900.0),
            [("about", 900.0), ("experience", 1200.0)],
        );
        assert_eq!(doc.document_height(), 2100.0);

        doc.set_scroll_y(850.0);
        let rect = doc.bounding_rect("experience").unwrap();
        assert_eq!(rect.top(), 50.0);
        assert_eq!(doc.document_top("experience"), Some(900.0));
        assert!(doc.bounding_rect("missing").is_none());
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut doc = DocumentLayout::stacked(Size::new(800.0, 600.0), [("about", 1000.0)]);
        doc.set_scroll_y(5000.0);
        assert_eq!(doc.scroll_y(), 400.0);
        doc.set_scroll_y(-10.0);
        assert_eq!(doc.scroll_y(), 0.0);
    }
}
